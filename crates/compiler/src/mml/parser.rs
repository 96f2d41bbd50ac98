//! MML parser

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use super::header::parse_header;
use super::tokenizer::{Token, TokenKind, Tokenizer};

use crate::errors::{MmlParserError, MmlParserErrorWithPos, ValueError};
use crate::songs::{Instrument, Song, Tablature, TablatureItem};

/// Parses a complete MML file (header plus body) into a [`Song`].
///
/// `program := constant_def* statement* ('loop:' statement*)?`
pub fn parse_mml(input: &str) -> Result<Song, MmlParserErrorWithPos> {
    let header = parse_header(input);

    let mut song = Song::new();
    song.properties = header.properties;

    let mut parser = Parser {
        t: Tokenizer::new(&input[header.byte_offset..], header.line_count),
    };
    parser.parse_body(&mut song)?;

    Ok(song)
}

fn syntax_error(token: &Token) -> MmlParserErrorWithPos {
    MmlParserErrorWithPos(
        token.pos(),
        MmlParserError::SyntaxError(token.content().to_owned()),
    )
}

fn value_error(token: &Token, e: ValueError) -> MmlParserErrorWithPos {
    MmlParserErrorWithPos(token.pos(), e.into())
}

struct Parser<'a> {
    t: Tokenizer<'a>,
}

impl Parser<'_> {
    fn eof_error(&self) -> MmlParserErrorWithPos {
        MmlParserErrorWithPos(self.t.pos(), MmlParserError::UnexpectedEof)
    }

    fn parse_body(&mut self, song: &mut Song) -> Result<(), MmlParserErrorWithPos> {
        song.add_synced_block();

        while let Some(token) = self.t.get().cloned() {
            match token.kind() {
                TokenKind::ConstDef => self.constant_def(song, &token)?,
                TokenKind::LoopTag => self.loop_mark(song, &token)?,
                TokenKind::ChannelSync => {
                    song.add_synced_block();
                    self.t.next();
                }
                TokenKind::ChannelId => self.channel_fill(song, &token)?,
                _ => return Err(syntax_error(&token)),
            }
        }
        Ok(())
    }

    /// `constant_def := '$'ID ':=' (instrument_def | tablature)`
    fn constant_def(
        &mut self,
        song: &mut Song,
        token: &Token,
    ) -> Result<(), MmlParserErrorWithPos> {
        let id = token.const_def_id().to_owned();
        if song.constants.contains_key(&id) {
            return Err(MmlParserErrorWithPos(
                token.pos(),
                MmlParserError::ConstantRedefined(id),
            ));
        }

        if !self.t.next() {
            return Err(self.eof_error());
        }
        // next() returned true so a token is available
        let tok = match self.t.get().cloned() {
            Some(t) => t,
            None => return Err(self.eof_error()),
        };

        let items = match tok.kind() {
            TokenKind::OpenInstrument => {
                vec![TablatureItem::Instrument(self.instrument_def(&tok)?)]
            }
            _ => self.tablature(song, false)?,
        };
        song.constants.insert(id, items);

        // the tokenizer already points at the next statement
        Ok(())
    }

    fn loop_mark(&mut self, song: &mut Song, token: &Token) -> Result<(), MmlParserErrorWithPos> {
        if song.loop_index.is_some() {
            return Err(MmlParserErrorWithPos(
                token.pos(),
                MmlParserError::LoopAlreadySet,
            ));
        }
        song.loop_index = Some(song.blocks.len());
        song.add_synced_block();
        self.t.next();
        Ok(())
    }

    /// `instrument_def := class '{' map_entry* '}'`
    fn instrument_def(&mut self, token: &Token) -> Result<Instrument, MmlParserErrorWithPos> {
        let mut instrument = Instrument {
            class: token.instrument_class().to_owned(),
            properties: HashMap::new(),
        };

        if !self.t.next() {
            return Err(self.eof_error());
        }
        while let Some(tok) = self.t.get().cloned() {
            match tok.kind() {
                TokenKind::MapEntry => {
                    let (k, v) = tok.map_key_value();
                    instrument.properties.insert(k.to_owned(), v.to_owned());
                }
                TokenKind::CloseInstrument => {
                    self.t.next();
                    return Ok(instrument);
                }
                _ => return Err(syntax_error(&tok)),
            }
            self.t.next();
        }
        Err(self.eof_error())
    }

    /// `tablature := (const_ref | NOTE | VOLUME | SILENCE | OCTAVE
    ///                | OCTAVE_STEP | tuplet | '|')*`
    ///
    /// Stops at the first token that does not belong to a tablature,
    /// leaving it unconsumed.
    fn tablature(
        &mut self,
        song: &Song,
        allow_constants: bool,
    ) -> Result<Tablature, MmlParserErrorWithPos> {
        let mut items = Tablature::new();

        while let Some(tok) = self.t.get().cloned() {
            match tok.kind() {
                TokenKind::ConstRef => {
                    let id = tok.const_ref_id();
                    if !allow_constants {
                        return Err(MmlParserErrorWithPos(
                            tok.pos(),
                            MmlParserError::NestedConstant(id.to_owned()),
                        ));
                    }
                    match song.constants.get(id) {
                        Some(c) => items.extend_from_slice(c),
                        None => {
                            return Err(MmlParserErrorWithPos(
                                tok.pos(),
                                MmlParserError::UndefinedConstant(id.to_owned()),
                            ))
                        }
                    }
                }
                TokenKind::Note => {
                    let n = tok.note().map_err(|e| value_error(&tok, e))?;
                    items.push(TablatureItem::Note(n));
                }
                TokenKind::Volume => {
                    let v = tok.volume().map_err(|e| value_error(&tok, e))?;
                    items.push(TablatureItem::Volume(v));
                }
                TokenKind::Silence => {
                    let s = tok.silence().map_err(|e| value_error(&tok, e))?;
                    items.push(TablatureItem::Silence(s));
                }
                TokenKind::Octave => {
                    let o = tok.octave().map_err(|e| value_error(&tok, e))?;
                    items.push(TablatureItem::SetOctave(o));
                }
                TokenKind::OctaveStep => {
                    items.push(TablatureItem::OctaveStep(tok.octave_step()));
                }
                TokenKind::OpenTuple => {
                    items.extend(self.tuplet(song)?);
                    // tuplet() consumed the closing token
                    continue;
                }
                TokenKind::Separator => {}
                _ => return Ok(items),
            }
            self.t.next();
        }
        Ok(items)
    }

    /// `tuplet := '(' tablature ')'NUM`
    ///
    /// The closing number tags every note in the group.  Constant
    /// references are not allowed inside a tuplet.
    fn tuplet(&mut self, song: &Song) -> Result<Tablature, MmlParserErrorWithPos> {
        if !self.t.next() {
            return Err(self.eof_error());
        }
        let mut items = self.tablature(song, false)?;

        let tok = match self.t.get().cloned() {
            Some(t) => t,
            None => return Err(self.eof_error()),
        };
        if tok.kind() != TokenKind::CloseTuple {
            return Err(syntax_error(&tok));
        }

        let n = tok.tuplet_number().map_err(|e| value_error(&tok, e))?;
        if n < 3 {
            return Err(MmlParserErrorWithPos(
                tok.pos(),
                MmlParserError::TupletTooSmall(n),
            ));
        }
        for item in &mut items {
            if let TablatureItem::Note(note) = item {
                note.tuplet = n;
            }
        }
        self.t.next();
        Ok(items)
    }

    /// `channel_fill := '@'ID '<-' tablature`
    fn channel_fill(&mut self, song: &mut Song, token: &Token) -> Result<(), MmlParserErrorWithPos> {
        let channel_id = token.channel_id().to_owned();

        if !self.t.next() {
            return Err(self.eof_error());
        }
        let tok = match self.t.get().cloned() {
            Some(t) => t,
            None => return Err(self.eof_error()),
        };
        if tok.kind() != TokenKind::SendArrow {
            return Err(syntax_error(&tok));
        }
        if !self.t.next() {
            return Err(self.eof_error());
        }

        let items = self.tablature(song, true)?;
        song.add_items(&channel_id, &items);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_pos::FilePos;
    use crate::notes::{Halftone, Pitch};

    fn notes_of(items: &Tablature) -> Vec<Pitch> {
        items
            .iter()
            .filter_map(|i| match i {
                TablatureItem::Note(n) => Some(n.pitch),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn single_channel() {
        let song = parse_mml("@ch1 <- a b c\n").unwrap();
        assert_eq!(song.blocks.len(), 1);
        let items = &song.blocks[0].channels["ch1"].items;
        assert_eq!(notes_of(items), vec![Pitch::A, Pitch::B, Pitch::C]);
    }

    #[test]
    fn channel_sync_starts_a_new_block() {
        let song = parse_mml("@a <- c\n@b <- e\n---\n@a <- d\n").unwrap();
        assert_eq!(song.blocks.len(), 2);
        assert_eq!(song.blocks[0].channels.len(), 2);
        assert_eq!(song.blocks[1].channels.len(), 1);
        assert_eq!(song.loop_index, None);
    }

    #[test]
    fn channel_send_appends() {
        let song = parse_mml("@a <- c d\n@a <- e\n").unwrap();
        let items = &song.blocks[0].channels["a"].items;
        assert_eq!(notes_of(items), vec![Pitch::C, Pitch::D, Pitch::E]);
    }

    #[test]
    fn loop_tag_adds_a_block() {
        let song = parse_mml("@a <- c\nloop:\n@a <- d\n").unwrap();
        assert_eq!(song.loop_index, Some(1));
        assert_eq!(song.blocks.len(), 2);
    }

    #[test]
    fn duplicate_loop_tag() {
        let e = parse_mml("@a <- c\nloop:\n@a <- d\nloop:\n").unwrap_err();
        assert_eq!(e.1, MmlParserError::LoopAlreadySet);
        assert_eq!(e.0, FilePos::new(4, 1));
    }

    #[test]
    fn constant_expansion() {
        let song = parse_mml("$c := a b\n@ch <- $c $c e\n").unwrap();
        let items = &song.blocks[0].channels["ch"].items;
        assert_eq!(
            notes_of(items),
            vec![Pitch::A, Pitch::B, Pitch::A, Pitch::B, Pitch::E]
        );
    }

    #[test]
    fn constant_redefined() {
        let e = parse_mml("$c := a\n$c := b\n@x <- $c\n").unwrap_err();
        assert_eq!(e.1, MmlParserError::ConstantRedefined("c".to_owned()));
        assert_eq!(e.0, FilePos::new(2, 1));
    }

    #[test]
    fn undefined_constant() {
        let e = parse_mml("@x <- $nope\n").unwrap_err();
        assert_eq!(e.1, MmlParserError::UndefinedConstant("nope".to_owned()));
    }

    #[test]
    fn constants_cannot_nest() {
        let e = parse_mml("$a := c\n$b := $a d\n@x <- $b\n").unwrap_err();
        assert_eq!(e.1, MmlParserError::NestedConstant("a".to_owned()));
    }

    #[test]
    fn instrument_constant() {
        let song = parse_mml("$lead := sawtooth {\n  adsr: 50->100, 100, 80, 120->0\n}\n@x <- $lead c\n").unwrap();
        let items = &song.blocks[0].channels["x"].items;
        match &items[0] {
            TablatureItem::Instrument(i) => {
                assert_eq!(i.class, "sawtooth");
                assert_eq!(
                    i.properties.get("adsr").map(String::as_str),
                    Some("50->100, 100, 80, 120->0")
                );
            }
            other => panic!("expected an instrument, got {other:?}"),
        }
        assert_eq!(notes_of(items), vec![Pitch::C]);
    }

    #[test]
    fn unclosed_instrument() {
        let e = parse_mml("$i := piano {\n  wave: sine\n").unwrap_err();
        assert_eq!(e.1, MmlParserError::UnexpectedEof);
    }

    #[test]
    fn tuplet_tags_notes() {
        let song = parse_mml("@x <- ( a b c )3 d\n").unwrap();
        let items = &song.blocks[0].channels["x"].items;
        assert_eq!(items.len(), 4);
        for item in &items[..3] {
            match item {
                TablatureItem::Note(n) => assert_eq!(n.tuplet, 3),
                other => panic!("expected a note, got {other:?}"),
            }
        }
        match &items[3] {
            TablatureItem::Note(n) => assert_eq!(n.tuplet, 0),
            other => panic!("expected a note, got {other:?}"),
        }
    }

    #[test]
    fn tuplet_too_small() {
        let e = parse_mml("@x <- ( a b )2\n").unwrap_err();
        assert_eq!(e.1, MmlParserError::TupletTooSmall(2));
    }

    #[test]
    fn unclosed_tuplet() {
        let e = parse_mml("@x <- ( a b c\n").unwrap_err();
        assert_eq!(e.1, MmlParserError::UnexpectedEof);
    }

    #[test]
    fn syntax_error_reports_position_after_header() {
        let input = "\
; my song
tempo 120

@ch1 <- a b c
@ch1 <- tracatraca
";
        let e = parse_mml(input).unwrap_err();
        assert_eq!(
            e.1,
            MmlParserError::SyntaxError("tracatraca".to_owned())
        );
        assert_eq!(e.0, FilePos::new(5, 9));
    }

    #[test]
    fn octave_and_volume_items() {
        let song = parse_mml("@x <- o5 v12 c > d < e\n").unwrap();
        let items = &song.blocks[0].channels["x"].items;
        assert!(matches!(items[0], TablatureItem::SetOctave(o) if o.as_u8() == 5));
        assert!(matches!(items[1], TablatureItem::Volume(v) if v.as_u8() == 12));
        assert!(matches!(items[3], TablatureItem::OctaveStep(1)));
        assert!(matches!(items[5], TablatureItem::OctaveStep(-1)));
    }

    #[test]
    fn out_of_range_values() {
        let e = parse_mml("@x <- v16\n").unwrap_err();
        assert_eq!(e.1, MmlParserError::ValueError(ValueError::VolumeOutOfRange(16)));

        let e = parse_mml("@x <- o0\n").unwrap_err();
        assert_eq!(e.1, MmlParserError::ValueError(ValueError::OctaveOutOfRange(0)));

        let e = parse_mml("@x <- c65\n").unwrap_err();
        assert_eq!(
            e.1,
            MmlParserError::ValueError(ValueError::NoteLengthOutOfRange(65))
        );
    }

    #[test]
    fn sharps_and_flats() {
        let song = parse_mml("@x <- c# e- f+\n").unwrap();
        let items = &song.blocks[0].channels["x"].items;
        let halftones: Vec<Halftone> = items
            .iter()
            .map(|i| match i {
                TablatureItem::Note(n) => n.halftone,
                other => panic!("expected a note, got {other:?}"),
            })
            .collect();
        assert_eq!(
            halftones,
            vec![Halftone::Sharp, Halftone::Flat, Halftone::Sharp]
        );
    }
}

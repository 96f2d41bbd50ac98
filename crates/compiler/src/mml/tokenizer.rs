//! MML tokenizer

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use regex::Regex;

use std::sync::OnceLock;

use crate::errors::ValueError;
use crate::file_pos::FilePos;
use crate::notes::{Halftone, Note, NoteLength, Octave, Pitch, Silence, Volume, MAX_DOTS};

/// Token kinds, ordered by tokenization precedence.
///
/// Tablature tokens go at the bottom so they do not shadow the
/// structural grammar items.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TokenKind {
    Comment,
    OpenInstrument,
    SendArrow,
    LoopTag,
    OpenTuple,
    CloseTuple,
    CloseInstrument,
    MapEntry,
    Separator,
    ConstDef,
    ConstRef,
    Assign,
    ChannelId,
    ChannelSync,
    Note,
    Volume,
    Silence,
    Octave,
    OctaveStep,
    Number,
    Unmatched,
}

const TOKEN_DEFS: &[(TokenKind, &str)] = &[
    (TokenKind::Comment, r";[^\n]*"),
    (TokenKind::OpenInstrument, r"(\w+)\s*\{"),
    (TokenKind::SendArrow, r"<-"),
    (TokenKind::LoopTag, r"[Ll][Oo][Oo][Pp]\s*:"),
    (TokenKind::OpenTuple, r"\("),
    (TokenKind::CloseTuple, r"\)(\d+)"),
    (TokenKind::CloseInstrument, r"\}"),
    (TokenKind::MapEntry, r"(\w+)\s*:\s*([^};\n]+)"),
    (TokenKind::Separator, r"\|+"),
    (TokenKind::ConstDef, r"\$(\w+)\s*:="),
    (TokenKind::ConstRef, r"\$(\w+)"),
    (TokenKind::Assign, r":="),
    (TokenKind::ChannelId, r"@(\w+)"),
    (TokenKind::ChannelSync, r"-{2,}"),
    (TokenKind::Note, r"([a-gA-G])([#+\-]?)(\d*)(\.*)"),
    (TokenKind::Volume, r"[vV](\d*)"),
    (TokenKind::Silence, r"[rR](\d*)"),
    (TokenKind::Octave, r"[oO](\d)"),
    (TokenKind::OctaveStep, r"<|>"),
    (TokenKind::Number, r"\d+"),
];

/// All token patterns merged into a single alternation.
///
/// The `regex` crate uses leftmost-first alternation, which makes the
/// `TOKEN_DEFS` order the precedence order.  A final `\S+` branch
/// catches anything unrecognised.
fn master_regex() -> &'static Regex {
    static MASTER: OnceLock<Regex> = OnceLock::new();
    MASTER.get_or_init(|| {
        let mut pattern = String::from("^(?:");
        for (_, p) in TOKEN_DEFS {
            pattern.push_str("(?:");
            pattern.push_str(p);
            pattern.push_str(")|");
        }
        pattern.push_str(r"\S+)");
        Regex::new(&pattern).unwrap()
    })
}

fn token_regexes() -> &'static Vec<(TokenKind, Regex)> {
    static DEFS: OnceLock<Vec<(TokenKind, Regex)>> = OnceLock::new();
    DEFS.get_or_init(|| {
        TOKEN_DEFS
            .iter()
            .map(|(k, p)| (*k, Regex::new(&format!("^(?:{p})$")).unwrap()))
            .collect()
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    content: String,
    captures: Vec<String>,
    pos: FilePos,
}

impl Token {
    fn classify(content: &str, pos: FilePos) -> Token {
        for (kind, r) in token_regexes() {
            if let Some(c) = r.captures(content) {
                let captures = c
                    .iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str().to_owned()).unwrap_or_default())
                    .collect();
                return Token {
                    kind: *kind,
                    content: content.to_owned(),
                    captures,
                    pos,
                };
            }
        }
        Token {
            kind: TokenKind::Unmatched,
            content: content.to_owned(),
            captures: Vec::new(),
            pos,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn pos(&self) -> FilePos {
        self.pos
    }

    fn assert_kind(&self, expected: TokenKind) {
        if self.kind != expected {
            panic!("invalid token kind: expected {expected:?}, got {:?}", self.kind);
        }
    }

    fn capture(&self, i: usize) -> &str {
        match self.captures.get(i) {
            Some(s) => s,
            None => panic!("missing capture {i} in {:?} token", self.kind),
        }
    }

    pub fn const_def_id(&self) -> &str {
        self.assert_kind(TokenKind::ConstDef);
        self.capture(0)
    }

    pub fn const_ref_id(&self) -> &str {
        self.assert_kind(TokenKind::ConstRef);
        self.capture(0)
    }

    pub fn channel_id(&self) -> &str {
        self.assert_kind(TokenKind::ChannelId);
        self.capture(0)
    }

    pub fn instrument_class(&self) -> &str {
        self.assert_kind(TokenKind::OpenInstrument);
        self.capture(0)
    }

    pub fn map_key_value(&self) -> (&str, &str) {
        self.assert_kind(TokenKind::MapEntry);
        (self.capture(0), self.capture(1).trim_end())
    }

    pub fn tuplet_number(&self) -> Result<u32, ValueError> {
        self.assert_kind(TokenKind::CloseTuple);
        parse_u32(self.capture(0))
    }

    pub fn octave_step(&self) -> i8 {
        self.assert_kind(TokenKind::OctaveStep);
        match self.content.as_str() {
            "<" => -1,
            ">" => 1,
            c => panic!("invalid octave step {c:?}"),
        }
    }

    pub fn octave(&self) -> Result<Octave, ValueError> {
        self.assert_kind(TokenKind::Octave);
        Octave::try_from(parse_u32(self.capture(0))?)
    }

    pub fn volume(&self) -> Result<Volume, ValueError> {
        self.assert_kind(TokenKind::Volume);
        let v = self.capture(0);
        if v.is_empty() {
            return Err(ValueError::NoVolume);
        }
        Volume::try_from(parse_u32(v)?)
    }

    pub fn note(&self) -> Result<Note, ValueError> {
        self.assert_kind(TokenKind::Note);

        let pitch = match self.capture(0).chars().next().and_then(Pitch::from_char) {
            Some(p) => p,
            None => panic!("invalid pitch in {:?}", self.content),
        };

        let halftone = match self.capture(1) {
            "" => Halftone::None,
            "#" | "+" => Halftone::Sharp,
            "-" => Halftone::Flat,
            h => panic!("invalid halftone {h:?}"),
        };

        let length = match self.capture(2) {
            "" => NoteLength::DEFAULT,
            l => NoteLength::try_from(parse_u32(l)?)?,
        };

        let dots = self.capture(3).len();
        if dots > usize::from(MAX_DOTS) {
            return Err(ValueError::TooManyDots);
        }

        Ok(Note {
            pitch,
            halftone,
            length,
            dots: u8::try_from(dots).unwrap_or(MAX_DOTS),
            tuplet: 0,
        })
    }

    pub fn silence(&self) -> Result<Silence, ValueError> {
        self.assert_kind(TokenKind::Silence);
        let length = match self.capture(0) {
            "" => NoteLength::DEFAULT,
            l => NoteLength::try_from(parse_u32(l)?)?,
        };
        Ok(Silence { length })
    }
}

fn parse_u32(s: &str) -> Result<u32, ValueError> {
    s.parse()
        .map_err(|_| ValueError::CannotParseUnsigned(s.to_owned()))
}

/// Splits MML source into [`Token`]s, tracking line and column
/// positions for error reporting.
///
/// Comments (`;` to end of line) are skipped and never surface.
pub struct Tokenizer<'a> {
    remaining: &'a str,
    line_rest: &'a str,
    last_match_len: u32,
    row: u32,
    col: u32,
    current: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    /// `start_row` is the number of lines already consumed before
    /// `input` (the song header).
    pub fn new(input: &'a str, start_row: u32) -> Tokenizer<'a> {
        let mut t = Tokenizer {
            remaining: input,
            line_rest: "",
            last_match_len: 0,
            row: start_row,
            col: 1,
            current: None,
        };
        t.next();
        t
    }

    /// Advances to the next token.  Returns false at end of input.
    pub fn next(&mut self) -> bool {
        self.col += self.last_match_len;
        self.last_match_len = 0;

        loop {
            let trimmed = self.line_rest.trim_start_matches([' ', '\t']);
            self.col += u32::try_from(self.line_rest.len() - trimmed.len()).unwrap_or(0);
            self.line_rest = trimmed;

            if let Some(m) = master_regex().find(self.line_rest) {
                let pos = FilePos::new(self.row, self.col);
                let token = Token::classify(m.as_str(), pos);
                self.last_match_len = u32::try_from(m.len()).unwrap_or(0);
                self.line_rest = &self.line_rest[m.end()..];

                if token.kind == TokenKind::Comment {
                    continue;
                }
                self.current = Some(token);
                return true;
            }

            if !self.read_next_line() {
                self.current = None;
                return false;
            }
        }
    }

    fn read_next_line(&mut self) -> bool {
        if self.remaining.is_empty() {
            self.line_rest = "";
            return false;
        }
        let (line, rest) = match self.remaining.find('\n') {
            Some(i) => self.remaining.split_at(i + 1),
            None => (self.remaining, ""),
        };
        self.remaining = rest;
        self.line_rest = line;
        self.row += 1;
        self.col = 1;
        true
    }

    pub fn at_end(&self) -> bool {
        self.current.is_none()
    }

    pub fn get(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    pub fn pos(&self) -> FilePos {
        match &self.current {
            Some(t) => t.pos,
            None => FilePos::new(self.row, self.col),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut out = Vec::new();
        let mut t = Tokenizer::new(input, 0);
        while let Some(tok) = t.get() {
            out.push(tok.clone());
            t.next();
        }
        out
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).iter().map(|t| t.kind()).collect()
    }

    #[test]
    fn tablature_tokens() {
        assert_eq!(
            kinds("o4 a#2. > c v12 r8 <"),
            vec![
                TokenKind::Octave,
                TokenKind::Note,
                TokenKind::OctaveStep,
                TokenKind::Note,
                TokenKind::Volume,
                TokenKind::Silence,
                TokenKind::OctaveStep,
            ]
        );
    }

    #[test]
    fn structural_tokens() {
        assert_eq!(
            kinds("@voice <- $arp := ( a b c )3 loop: ---"),
            vec![
                TokenKind::ChannelId,
                TokenKind::SendArrow,
                TokenKind::ConstDef,
                TokenKind::OpenTuple,
                TokenKind::Note,
                TokenKind::Note,
                TokenKind::Note,
                TokenKind::CloseTuple,
                TokenKind::LoopTag,
                TokenKind::ChannelSync,
            ]
        );
    }

    #[test]
    fn instrument_tokens() {
        let tokens = tokenize("piano {\n  wave: sine\n}");
        assert_eq!(
            tokens.iter().map(Token::kind).collect::<Vec<_>>(),
            vec![
                TokenKind::OpenInstrument,
                TokenKind::MapEntry,
                TokenKind::CloseInstrument,
            ]
        );
        assert_eq!(tokens[0].instrument_class(), "piano");
        assert_eq!(tokens[1].map_key_value(), ("wave", "sine"));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a ; a comment\nb"),
            vec![TokenKind::Note, TokenKind::Note]
        );
    }

    #[test]
    fn note_values() {
        let tokens = tokenize("c#8.. e-");
        let n = tokens[0].note().unwrap();
        assert_eq!(n.pitch, Pitch::C);
        assert_eq!(n.halftone, Halftone::Sharp);
        assert_eq!(n.length.as_u8(), 8);
        assert_eq!(n.dots, 2);

        let n = tokens[1].note().unwrap();
        assert_eq!(n.pitch, Pitch::E);
        assert_eq!(n.halftone, Halftone::Flat);
        assert_eq!(n.length, NoteLength::DEFAULT);
        assert_eq!(n.dots, 0);
    }

    #[test]
    fn volume_requires_a_value() {
        let tokens = tokenize("v");
        assert_eq!(tokens[0].volume(), Err(ValueError::NoVolume));
    }

    #[test]
    fn token_positions() {
        let tokens = tokenize("@ch1 <- abc\n   o4");
        assert_eq!(tokens[0].pos(), FilePos::new(1, 1));
        assert_eq!(tokens[1].pos(), FilePos::new(1, 6));
        assert_eq!(tokens[2].pos(), FilePos::new(1, 9));
        // "abc" tokenizes as three notes
        assert_eq!(tokens[3].pos(), FilePos::new(1, 10));
        assert_eq!(tokens[5].pos(), FilePos::new(2, 4));
    }

    #[test]
    fn start_row_offsets_positions() {
        let tokens = {
            let mut out = Vec::new();
            let mut t = Tokenizer::new("@ch1 <- tracatraca", 6);
            while let Some(tok) = t.get() {
                out.push(tok.clone());
                t.next();
            }
            out
        };
        assert_eq!(tokens[2].kind(), TokenKind::Unmatched);
        assert_eq!(tokens[2].pos(), FilePos::new(7, 9));
    }

    #[test]
    fn unmatched_input() {
        let tokens = tokenize("a =123= b");
        assert_eq!(tokens[1].kind(), TokenKind::Unmatched);
        assert_eq!(tokens[1].content(), "=123=");
    }
}

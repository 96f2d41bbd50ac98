//! Song to note event list exporter
//!
//! Renders the song as absolute-time note events for a software
//! sequencer, one list per channel.

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use serde::Serialize;

use std::collections::BTreeMap;

use crate::notes::{Halftone, Note, Octave};
use crate::songs::{Song, TablatureItem};
use crate::time::length_ratio;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteEvent {
    /// Note name with accidental and octave, e.g. `c#4`.
    pub note: String,
    /// Nominal duration, e.g. `4n` for a quarter or `4n.` when dotted.
    pub duration: String,
    /// Start time in whole note units from the song start.
    pub time: f64,
    pub velocity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelEvents {
    pub channel: String,
    pub notes: Vec<NoteEvent>,
}

struct ChannelState {
    time: f64,
    octave: i32,
    events: Vec<NoteEvent>,
}

impl Default for ChannelState {
    fn default() -> Self {
        ChannelState {
            time: 0.0,
            octave: i32::from(Octave::DEFAULT.as_u8()),
            events: Vec::new(),
        }
    }
}

/// Time taken by a note, in whole note units.
fn note_duration(note: &Note) -> f64 {
    let (dividend, divisor) = length_ratio(note.dots, 0);
    let mut d = 1.0 / f64::from(note.length.as_u8()) * dividend as f64 / divisor as f64;
    if note.tuplet >= 3 {
        d *= f64::from(note.tuplet - 1) / f64::from(note.tuplet);
    }
    d
}

fn note_name(note: &Note, octave: i32) -> String {
    let accidental = match note.halftone {
        Halftone::None => "",
        Halftone::Sharp => "#",
        Halftone::Flat => "b",
    };
    format!("{}{}{}", note.pitch, accidental, octave)
}

fn duration_name(note: &Note) -> String {
    let mut s = format!("{}n", note.length.as_u8());
    for _ in 0..note.dots {
        s.push('.');
    }
    s
}

/// Flattens a song into per-channel event lists, in ascending channel
/// name order.  Rests advance time without emitting an event, synced
/// block boundaries align every channel to the latest time reached.
pub fn song_events(song: &Song) -> Vec<ChannelEvents> {
    let mut states: BTreeMap<String, ChannelState> = BTreeMap::new();
    for name in song.channel_names() {
        states.insert(name.to_owned(), ChannelState::default());
    }

    for block in &song.blocks {
        for (name, channel) in &block.channels {
            let state = states.entry(name.clone()).or_default();
            for item in &channel.items {
                match item {
                    TablatureItem::Note(n) => {
                        state.events.push(NoteEvent {
                            note: note_name(n, state.octave),
                            duration: duration_name(n),
                            time: state.time,
                            velocity: 1,
                        });
                        state.time += note_duration(n);
                    }
                    TablatureItem::Silence(s) => {
                        state.time += 1.0 / f64::from(s.length.as_u8());
                    }
                    TablatureItem::SetOctave(o) => {
                        state.octave = i32::from(o.as_u8());
                    }
                    TablatureItem::OctaveStep(step) => {
                        state.octave += i32::from(*step);
                    }
                    TablatureItem::Volume(_) | TablatureItem::Instrument(_) => {}
                }
            }
        }

        // block barrier: every channel resumes at the latest time
        let barrier = states
            .values()
            .map(|s| s.time)
            .fold(0.0, f64::max);
        for state in states.values_mut() {
            state.time = barrier;
        }
    }

    states
        .into_iter()
        .map(|(channel, state)| ChannelEvents {
            channel,
            notes: state.events,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mml::parse_mml;

    fn events(mml: &str) -> Vec<ChannelEvents> {
        song_events(&parse_mml(mml).unwrap())
    }

    #[test]
    fn notes_and_rests() {
        let out = events("@a <- c4 r4 e2\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].channel, "a");
        assert_eq!(
            out[0].notes,
            vec![
                NoteEvent {
                    note: "c4".to_owned(),
                    duration: "4n".to_owned(),
                    time: 0.0,
                    velocity: 1,
                },
                NoteEvent {
                    note: "e4".to_owned(),
                    duration: "2n".to_owned(),
                    time: 0.5,
                    velocity: 1,
                },
            ]
        );
    }

    #[test]
    fn octave_changes_and_accidentals() {
        let out = events("@a <- o5 c# > d-\n");
        assert_eq!(out[0].notes[0].note, "c#5");
        assert_eq!(out[0].notes[1].note, "db6");
    }

    #[test]
    fn dotted_durations() {
        let out = events("@a <- c4. e4\n");
        assert_eq!(out[0].notes[0].duration, "4n.");
        assert_eq!(out[0].notes[1].time, 0.375);
    }

    #[test]
    fn triplets_advance_two_thirds() {
        let out = events("@a <- ( c c c )3 e\n");
        let times: Vec<f64> = out[0].notes.iter().map(|n| n.time).collect();
        assert_eq!(times, vec![0.0, 1.0 / 6.0, 2.0 / 6.0, 0.5]);
    }

    #[test]
    fn block_boundaries_align_channels() {
        let out = events("@a <- c1\n@b <- e4\n---\n@b <- f4\n");
        let b = &out[1];
        assert_eq!(b.channel, "b");
        assert_eq!(b.notes[0].time, 0.0);
        // the barrier pushes b past a's whole note
        assert_eq!(b.notes[1].time, 1.0);
    }

    #[test]
    fn serializes_to_json() {
        let out = events("@a <- c4\n");
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(
            json,
            r#"[{"channel":"a","notes":[{"note":"c4","duration":"4n","time":0.0,"velocity":1}]}]"#
        );
    }
}

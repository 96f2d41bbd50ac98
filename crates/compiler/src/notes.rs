//! Notes, octaves and volumes

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::value_newtypes::u8_value_newtype;

use std::fmt::Display;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pitch {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Pitch {
    pub fn from_char(c: char) -> Option<Pitch> {
        match c.to_ascii_lowercase() {
            'a' => Some(Pitch::A),
            'b' => Some(Pitch::B),
            'c' => Some(Pitch::C),
            'd' => Some(Pitch::D),
            'e' => Some(Pitch::E),
            'f' => Some(Pitch::F),
            'g' => Some(Pitch::G),
            _ => None,
        }
    }
}

impl Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let c = match self {
            Pitch::A => 'a',
            Pitch::B => 'b',
            Pitch::C => 'c',
            Pitch::D => 'd',
            Pitch::E => 'e',
            Pitch::F => 'f',
            Pitch::G => 'g',
        };
        write!(f, "{c}")
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Halftone {
    None,
    Sharp,
    Flat,
}

impl Display for Halftone {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Halftone::None => Ok(()),
            Halftone::Sharp => write!(f, "#"),
            Halftone::Flat => write!(f, "-"),
        }
    }
}

u8_value_newtype!(Octave, OctaveOutOfRange, 1, 8);
u8_value_newtype!(Volume, VolumeOutOfRange, 0, 15);
u8_value_newtype!(NoteLength, NoteLengthOutOfRange, 1, 64);

impl Octave {
    pub const DEFAULT: Self = Self(4);
}

impl NoteLength {
    pub const DEFAULT: Self = Self(4);
}

pub const MAX_DOTS: u8 = 7;

/// A note as written in the tablature.
///
/// `tuplet` is 0 for a regular note, otherwise the number of notes
/// in the tuplet group the note belongs to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Note {
    pub pitch: Pitch,
    pub halftone: Halftone,
    pub length: NoteLength,
    pub dots: u8,
    pub tuplet: u32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Silence {
    pub length: NoteLength,
}

//! Error types

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::file_pos::FilePos;
use crate::notes::{Halftone, Pitch};

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    CannotParseUnsigned(String),
    NoteLengthOutOfRange(u32),
    OctaveOutOfRange(u32),
    VolumeOutOfRange(u32),
    NoVolume,
    TooManyDots,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MmlParserError {
    ValueError(ValueError),

    SyntaxError(String),
    UnexpectedEof,

    ConstantRedefined(String),
    UndefinedConstant(String),
    NestedConstant(String),

    LoopAlreadySet,
    TupletTooSmall(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MmlParserErrorWithPos(pub FilePos, pub MmlParserError);

#[derive(Debug, Clone, PartialEq)]
pub enum ExportError {
    InvalidProperty(String, String),
    TooManyChannels(String),
    UnsupportedNote(Pitch, Halftone, i32),
    SongTooLarge(usize),
}

impl From<ValueError> for MmlParserError {
    fn from(e: ValueError) -> Self {
        Self::ValueError(e)
    }
}

impl Display for ValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::CannotParseUnsigned(s) => write!(f, "cannot parse unsigned number: {s}"),
            Self::NoteLengthOutOfRange(v) => write!(f, "note length out of range: {v}"),
            Self::OctaveOutOfRange(v) => write!(f, "octave out of range: {v}"),
            Self::VolumeOutOfRange(v) => write!(f, "volume out of range: {v}"),
            Self::NoVolume => write!(f, "no volume value"),
            Self::TooManyDots => write!(f, "too many dots in note length"),
        }
    }
}

impl Display for MmlParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::ValueError(e) => e.fmt(f),

            Self::SyntaxError(s) => write!(f, "unexpected input: {s}"),
            Self::UnexpectedEof => write!(f, "unexpected end of file"),

            Self::ConstantRedefined(id) => write!(f, "constant ${id} already defined"),
            Self::UndefinedConstant(id) => write!(f, "undefined constant ${id}"),
            Self::NestedConstant(id) => {
                write!(f, "cannot use constant ${id} inside a constant definition")
            }

            Self::LoopAlreadySet => write!(f, "loop tag already set"),
            Self::TupletTooSmall(n) => write!(f, "tuplet must contain at least 3 notes: {n}"),
        }
    }
}

impl Display for MmlParserErrorWithPos {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.0, self.1)
    }
}

impl Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidProperty(k, v) => write!(f, "invalid value for property {k}: {v}"),
            Self::TooManyChannels(name) => {
                write!(f, "no PSG channel available for channel @{name}")
            }
            Self::UnsupportedNote(p, h, o) => {
                write!(f, "note {p}{h} (octave {o}) cannot be played by the PSG")
            }
            Self::SongTooLarge(len) => write!(f, "song too large: {len} bytes"),
        }
    }
}

impl std::error::Error for ValueError {}
impl std::error::Error for MmlParserError {}
impl std::error::Error for MmlParserErrorWithPos {}
impl std::error::Error for ExportError {}

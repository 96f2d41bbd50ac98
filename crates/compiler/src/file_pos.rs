//! FilePos

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::fmt::Display;

/// A 1-based position in the MML source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FilePos {
    pub(crate) line_number: u32,
    pub(crate) line_char: u32,
}

impl FilePos {
    pub(crate) fn new(line_number: u32, line_char: u32) -> Self {
        Self {
            line_number,
            line_char,
        }
    }

    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    pub fn line_char(&self) -> u32 {
        self.line_char
    }
}

impl Display for FilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line_number, self.line_char)
    }
}

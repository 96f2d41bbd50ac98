//! Timing and note duration calculations

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::notes::NoteLength;

pub const DEFAULT_BPM: u32 = 120;
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Number of PSG frames elapsed since the start of the song.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FrameCounter(u64);

#[allow(dead_code)]
impl FrameCounter {
    pub const fn new(frames: u64) -> Self {
        Self(frames)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::Add<u32> for FrameCounter {
    type Output = Self;

    fn add(self, rhs: u32) -> Self {
        Self(self.0 + u64::from(rhs))
    }
}

impl std::ops::AddAssign<u32> for FrameCounter {
    fn add_assign(&mut self, rhs: u32) {
        self.0 += u64::from(rhs);
    }
}

/// Ratio a note duration is scaled by after applying dots and tuplets.
///
/// Each dot extends the note by half of the previous extension.
/// A triplet fits 3 notes in the time of 2.
pub fn length_ratio(dots: u8, tuplet: u32) -> (u64, u64) {
    let mut dividend: u64 = 1;
    let mut divisor: u64 = 1;

    for d in 1..=u32::from(dots) {
        let down = 1u64 << d;
        dividend = dividend * down + divisor;
        divisor *= down;
    }

    if tuplet == 3 {
        dividend *= 2;
        divisor *= 3;
    }

    (dividend, divisor)
}

/// Duration in frames of a note of the given length at `bpm` beats
/// per minute on a PSG clocked at `hz` frames per second.
pub fn note_frames(length: NoteLength, dots: u8, tuplet: u32, bpm: u32, hz: u32) -> u32 {
    let (dividend, divisor) = length_ratio(dots, tuplet);

    let n = 4 * 60 * u64::from(hz) * dividend;
    let d = u64::from(length.as_u8()) * u64::from(bpm) * divisor;

    u32::try_from(n / d).unwrap_or(u32::MAX)
}

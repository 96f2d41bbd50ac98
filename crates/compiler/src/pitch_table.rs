//! Tone period lookup

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::notes::{Halftone, Pitch};

pub const FIRST_OCTAVE: i32 = 1;
pub const LAST_OCTAVE: i32 = 8;

const SEMITONES_PER_OCTAVE: usize = 12;
const N_OCTAVES: usize = (LAST_OCTAVE - FIRST_OCTAVE + 1) as usize;

// 12 bit tone generator periods, per the MSX2 technical handbook.
// Semitone order is c, c#, d, d#, e, f, f#, g, g#, a, a#, b.
const TONE_PERIODS: [[u16; SEMITONES_PER_OCTAVE]; N_OCTAVES] = [
    [
        0xD5D, 0xC9C, 0xBE7, 0xB3C, 0xA9B, 0xA02, 0x973, 0x8EB, 0x88B, 0x7F2, 0x780, 0x714,
    ],
    [
        0x6AF, 0x64E, 0x5F4, 0x59E, 0x54E, 0x501, 0x4BA, 0x476, 0x436, 0x3F9, 0x3C0, 0x38A,
    ],
    [
        0x357, 0x327, 0x2FA, 0x2CF, 0x2A7, 0x281, 0x25D, 0x23B, 0x21B, 0x1FD, 0x1E0, 0x1C5,
    ],
    [
        0x1AC, 0x194, 0x17D, 0x168, 0x153, 0x140, 0x12E, 0x11D, 0x10D, 0x0FE, 0x0F0, 0x0E3,
    ],
    [
        0x0D6, 0x0CA, 0x0BE, 0x084, 0x0AA, 0x0A0, 0x097, 0x08F, 0x087, 0x07F, 0x078, 0x071,
    ],
    [
        0x06B, 0x065, 0x05F, 0x05A, 0x055, 0x050, 0x04C, 0x047, 0x043, 0x040, 0x03C, 0x039,
    ],
    [
        0x035, 0x032, 0x030, 0x02D, 0x02A, 0x028, 0x026, 0x024, 0x022, 0x020, 0x01E, 0x01C,
    ],
    [
        0x01B, 0x019, 0x018, 0x016, 0x015, 0x014, 0x013, 0x012, 0x011, 0x010, 0x00F, 0x00E,
    ],
];

fn semitone_index(pitch: Pitch, halftone: Halftone) -> Option<usize> {
    let index = match (pitch, halftone) {
        (Pitch::C, Halftone::None) => 0,
        (Pitch::C, Halftone::Sharp) | (Pitch::D, Halftone::Flat) => 1,
        (Pitch::D, Halftone::None) => 2,
        (Pitch::D, Halftone::Sharp) | (Pitch::E, Halftone::Flat) => 3,
        (Pitch::E, Halftone::None) => 4,
        (Pitch::F, Halftone::None) => 5,
        (Pitch::F, Halftone::Sharp) | (Pitch::G, Halftone::Flat) => 6,
        (Pitch::G, Halftone::None) => 7,
        (Pitch::G, Halftone::Sharp) | (Pitch::A, Halftone::Flat) => 8,
        (Pitch::A, Halftone::None) => 9,
        (Pitch::A, Halftone::Sharp) | (Pitch::B, Halftone::Flat) => 10,
        (Pitch::B, Halftone::None) => 11,

        // e#, b#, c- and f- have no table entry
        (Pitch::E | Pitch::B, Halftone::Sharp) => return None,
        (Pitch::C | Pitch::F, Halftone::Flat) => return None,
    };
    Some(index)
}

/// The 12 bit period for a note, or None when the PSG cannot play it.
pub fn tone_period(pitch: Pitch, halftone: Halftone, octave: i32) -> Option<u16> {
    if !(FIRST_OCTAVE..=LAST_OCTAVE).contains(&octave) {
        return None;
    }
    let row = usize::try_from(octave - FIRST_OCTAVE).ok()?;
    Some(TONE_PERIODS[row][semitone_index(pitch, halftone)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_lookup() {
        assert_eq!(tone_period(Pitch::C, Halftone::None, 1), Some(0xD5D));
        assert_eq!(tone_period(Pitch::A, Halftone::None, 4), Some(0x0FE));
        assert_eq!(tone_period(Pitch::C, Halftone::None, 5), Some(0x0D6));
        assert_eq!(tone_period(Pitch::B, Halftone::None, 8), Some(0x00E));
    }

    #[test]
    fn enharmonic_halftones() {
        assert_eq!(
            tone_period(Pitch::C, Halftone::Sharp, 3),
            tone_period(Pitch::D, Halftone::Flat, 3)
        );
        assert_eq!(tone_period(Pitch::A, Halftone::Sharp, 2), Some(0x3C0));
    }

    #[test]
    fn unplayable_notes() {
        assert_eq!(tone_period(Pitch::E, Halftone::Sharp, 4), None);
        assert_eq!(tone_period(Pitch::B, Halftone::Sharp, 4), None);
        assert_eq!(tone_period(Pitch::C, Halftone::Flat, 4), None);
        assert_eq!(tone_period(Pitch::F, Halftone::Flat, 4), None);
    }

    #[test]
    fn out_of_range_octaves() {
        assert_eq!(tone_period(Pitch::C, Halftone::None, 0), None);
        assert_eq!(tone_period(Pitch::C, Halftone::None, 9), None);
        assert_eq!(tone_period(Pitch::C, Halftone::None, -1), None);
    }
}

//! PSG instructions and their binary encoding

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

pub mod opcodes {
    // opcode 0x00 (with a 16 bit argument) is envelope-cycle,
    // the other 0b000xxxxx values are wait instructions

    pub const ENVELOPE_CYCLE: u8 = 0b0000_0000;

    pub const TONE_A: u8 = 0b0010_0000;
    pub const TONE_B: u8 = 0b0011_0000;
    pub const TONE_C: u8 = 0b0111_0000;

    pub const NOISE_RATE: u8 = 0b0100_0000;
    pub const ENVELOPE_SHAPE: u8 = 0b0110_0000;

    pub const CHANNELS: u8 = 0b1000_0000;

    pub const VOLUME_A: u8 = 0b1100_0000;
    pub const VOLUME_B: u8 = 0b1101_0000;
    pub const VOLUME_C: u8 = 0b1110_0000;

    pub const TRIGGER_ENVELOPE_A: u8 = 0b1111_0000;
    pub const TRIGGER_ENVELOPE_B: u8 = 0b1111_0001;
    pub const TRIGGER_ENVELOPE_C: u8 = 0b1111_0010;

    pub const END: u8 = 0b1111_1000;
}

/// Longest pause a single wait instruction can encode (5 bit payload).
pub const MAX_WAIT_FRAMES: u32 = 31;

/// The three tone generators of the PSG.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PsgChannel {
    A,
    B,
    C,
}

impl PsgChannel {
    pub const ALL: [PsgChannel; 3] = [PsgChannel::A, PsgChannel::B, PsgChannel::C];

    pub const fn index(&self) -> u8 {
        match self {
            PsgChannel::A => 0,
            PsgChannel::B => 1,
            PsgChannel::C => 2,
        }
    }
}

/// The PSG mixer register.
///
/// Bits 0-2 disable the tone generator of channels A-C, bits 3-5
/// disable their noise generator.  A set bit means disabled, which is
/// the hardware convention.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelRegister(u8);

impl ChannelRegister {
    pub const ALL_DISABLED: Self = Self(0b111_111);

    pub fn enable_tone(&mut self, channel: PsgChannel) {
        self.0 &= !(1 << channel.index());
    }

    pub fn disable_tone(&mut self, channel: PsgChannel) {
        self.0 |= 1 << channel.index();
    }

    pub fn enable_noise(&mut self, channel: PsgChannel) {
        self.0 &= !(0b1000 << channel.index());
    }

    pub fn disable_noise(&mut self, channel: PsgChannel) {
        self.0 |= 0b1000 << channel.index();
    }

    pub fn tone_enabled(&self, channel: PsgChannel) -> bool {
        self.0 & (1 << channel.index()) == 0
    }

    pub fn noise_enabled(&self, channel: PsgChannel) -> bool {
        self.0 & (0b1000 << channel.index()) == 0
    }

    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

/// A single PSG instruction.
///
/// Encoding is a pure function of the variant and its payload, all
/// sequencing state lives in the encoder.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Instruction {
    EnvelopeCycle(u16),
    Wait(u8),
    Tone(PsgChannel, u16),
    EnvelopeShape(u8),
    NoiseRate(u8),
    Channels(ChannelRegister),
    Volume(PsgChannel, u8),
    TriggerEnvelope(PsgChannel),
    End,
}

impl Instruction {
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Instruction::EnvelopeCycle(cycle) => {
                out.push(opcodes::ENVELOPE_CYCLE);
                out.push((cycle >> 8) as u8);
                out.push(*cycle as u8);
            }
            Instruction::Wait(frames) => {
                out.push(frames & 0b11111);
            }
            Instruction::Tone(channel, period) => {
                let opcode = match channel {
                    PsgChannel::A => opcodes::TONE_A,
                    PsgChannel::B => opcodes::TONE_B,
                    PsgChannel::C => opcodes::TONE_C,
                };
                out.push(opcode | ((period >> 8) as u8 & 0b1111));
                out.push(*period as u8);
            }
            Instruction::EnvelopeShape(shape) => {
                out.push(opcodes::ENVELOPE_SHAPE | (shape & 0b1111));
            }
            Instruction::NoiseRate(rate) => {
                out.push(opcodes::NOISE_RATE | (rate & 0b11111));
            }
            Instruction::Channels(register) => {
                out.push(opcodes::CHANNELS | (register.as_u8() & 0b111111));
            }
            Instruction::Volume(channel, volume) => {
                let opcode = match channel {
                    PsgChannel::A => opcodes::VOLUME_A,
                    PsgChannel::B => opcodes::VOLUME_B,
                    PsgChannel::C => opcodes::VOLUME_C,
                };
                out.push(opcode | (volume & 0b1111));
            }
            Instruction::TriggerEnvelope(channel) => {
                out.push(match channel {
                    PsgChannel::A => opcodes::TRIGGER_ENVELOPE_A,
                    PsgChannel::B => opcodes::TRIGGER_ENVELOPE_B,
                    PsgChannel::C => opcodes::TRIGGER_ENVELOPE_C,
                });
            }
            Instruction::End => {
                out.push(opcodes::END);
            }
        }
    }
}

pub fn encode_instructions(instructions: &[Instruction]) -> Vec<u8> {
    let mut out = Vec::new();
    for i in instructions {
        i.encode(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_encoding() {
        let encoded = encode_instructions(&[
            Instruction::EnvelopeCycle(0xABCD),
            Instruction::Wait(0b10101),
            Instruction::Tone(PsgChannel::A, 0xDCA),
            Instruction::Tone(PsgChannel::B, 0xADC),
            Instruction::Tone(PsgChannel::C, 0x123),
            Instruction::EnvelopeShape(0b1010),
            Instruction::NoiseRate(0b11000),
            Instruction::Channels(ChannelRegister(0b010101)),
            Instruction::Volume(PsgChannel::A, 0b1111),
            Instruction::Volume(PsgChannel::B, 0b1001),
            Instruction::Volume(PsgChannel::C, 0b1110),
            Instruction::TriggerEnvelope(PsgChannel::A),
            Instruction::TriggerEnvelope(PsgChannel::B),
            Instruction::TriggerEnvelope(PsgChannel::C),
            Instruction::End,
        ]);
        assert_eq!(
            encoded,
            vec![
                0x00, 0xAB, 0xCD,
                0b10101,
                0x2D, 0xCA,
                0x3A, 0xDC,
                0x71, 0x23,
                0b0110_1010,
                0b0101_1000,
                0b1001_0101,
                0b1100_1111,
                0b1101_1001,
                0b1110_1110,
                0b1111_0000,
                0b1111_0001,
                0b1111_0010,
                0b1111_1000,
            ]
        );
    }

    #[test]
    fn register_tone_bits() {
        let mut r = ChannelRegister::ALL_DISABLED;
        assert_eq!(r.as_u8(), 0b111_111);

        for ch in PsgChannel::ALL {
            assert!(!r.tone_enabled(ch));
            r.enable_tone(ch);
            assert!(r.tone_enabled(ch));
        }
        assert_eq!(r.as_u8(), 0b111_000);

        r.disable_tone(PsgChannel::B);
        assert_eq!(r.as_u8(), 0b111_010);
    }

    #[test]
    fn register_noise_bits() {
        let mut r = ChannelRegister::ALL_DISABLED;
        r.enable_noise(PsgChannel::A);
        assert_eq!(r.as_u8(), 0b110_111);
        assert!(r.noise_enabled(PsgChannel::A));
        assert!(!r.noise_enabled(PsgChannel::B));

        r.disable_noise(PsgChannel::A);
        assert_eq!(r.as_u8(), 0b111_111);
    }

    #[test]
    fn tone_period_is_clamped_to_12_bits() {
        let mut out = Vec::new();
        Instruction::Tone(PsgChannel::A, 0xFFFF).encode(&mut out);
        assert_eq!(out, vec![0x2F, 0xFF]);
    }
}

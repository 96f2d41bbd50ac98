//! Song to PSG bytecode exporter

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};

use crate::bytecode::{ChannelRegister, Instruction, PsgChannel, MAX_WAIT_FRAMES};
use crate::errors::ExportError;
use crate::notes::{Note, Octave, Silence};
use crate::pitch_table::tone_period;
use crate::scheduler::SyncedBlockIter;
use crate::songs::{Song, TablatureItem};
use crate::time::{note_frames, FrameCounter, DEFAULT_BPM, DEFAULT_FRAME_RATE};

const TEMPO_KEY: &str = "tempo";
const FRAME_RATE_KEY: &str = "psg.hz";

/// Compiles a song into a PSG instruction stream.
///
/// The first two bytes are the little-endian offset of the `loop:`
/// point (0 when the song does not loop), followed by the encoded
/// instructions and a final end marker.
pub fn export_song(song: &Song) -> Result<Vec<u8>, ExportError> {
    let mut encoder = PsgEncoder::new(song)?;

    let mut data = vec![0, 0];
    for (block_index, block) in song.blocks.iter().enumerate() {
        if Some(block_index) == song.loop_index {
            let offset = match u16::try_from(data.len()) {
                Ok(o) => o,
                Err(_) => return Err(ExportError::SongTooLarge(data.len())),
            };
            data[0] = offset.to_le_bytes()[0];
            data[1] = offset.to_le_bytes()[1];
        }

        for (item, channel) in SyncedBlockIter::new(block) {
            encoder.encode_item(item, channel, &mut data)?;
            encoder.encode_wait(encoder.nearest_frame(), &mut data);
        }

        // all channels wait out the longest one before the next block
        encoder.encode_wait(encoder.farthest_frame(), &mut data);
        encoder.sync_channels();
    }

    Instruction::End.encode(&mut data);
    Ok(data)
}

struct PsgEncoder {
    bpm: u32,
    hz: u32,
    register: ChannelRegister,
    frames: FrameCounter,
    channel_frames: BTreeMap<String, FrameCounter>,
    channel_order: Vec<String>,
    octaves: BTreeMap<String, i32>,
}

impl PsgEncoder {
    fn new(song: &Song) -> Result<PsgEncoder, ExportError> {
        let bpm = parse_property(&song.properties, TEMPO_KEY, DEFAULT_BPM)?;
        let hz = parse_property(&song.properties, FRAME_RATE_KEY, DEFAULT_FRAME_RATE)?;

        // frame counters and octaves are preloaded for every channel
        let mut channel_frames = BTreeMap::new();
        let mut octaves = BTreeMap::new();
        for name in song.channel_names() {
            channel_frames.insert(name.to_owned(), FrameCounter::default());
            octaves.insert(name.to_owned(), i32::from(Octave::DEFAULT.as_u8()));
        }

        Ok(PsgEncoder {
            bpm,
            hz,
            register: ChannelRegister::ALL_DISABLED,
            frames: FrameCounter::default(),
            channel_frames,
            channel_order: Vec::new(),
            octaves,
        })
    }

    fn encode_item(
        &mut self,
        item: &TablatureItem,
        channel: &str,
        out: &mut Vec<u8>,
    ) -> Result<(), ExportError> {
        match item {
            TablatureItem::Note(n) => self.encode_note(n, channel, out),
            TablatureItem::Silence(s) => self.encode_silence(s, channel, out),
            TablatureItem::SetOctave(o) => {
                self.octaves
                    .insert(channel.to_owned(), i32::from(o.as_u8()));
                Ok(())
            }
            TablatureItem::OctaveStep(step) => {
                *self
                    .octaves
                    .entry(channel.to_owned())
                    .or_insert_with(|| i32::from(Octave::DEFAULT.as_u8())) += i32::from(*step);
                Ok(())
            }
            // no hardware instruction yet, reserved
            TablatureItem::Volume(_) => Ok(()),
            TablatureItem::Instrument(_) => Ok(()),
        }
    }

    fn encode_note(
        &mut self,
        note: &Note,
        channel: &str,
        out: &mut Vec<u8>,
    ) -> Result<(), ExportError> {
        let psg_channel = self.order_for(channel)?;

        if !self.register.tone_enabled(psg_channel) {
            self.register.enable_tone(psg_channel);
            Instruction::Channels(self.register).encode(out);
        }

        let frames = note_frames(note.length, note.dots, note.tuplet, self.bpm, self.hz);
        self.add_frames(channel, frames);

        let octave = self.octave_of(channel);
        let period = match tone_period(note.pitch, note.halftone, octave) {
            Some(p) => p,
            None => {
                return Err(ExportError::UnsupportedNote(
                    note.pitch,
                    note.halftone,
                    octave,
                ))
            }
        };
        Instruction::Tone(psg_channel, period).encode(out);

        Ok(())
    }

    fn encode_silence(
        &mut self,
        silence: &Silence,
        channel: &str,
        out: &mut Vec<u8>,
    ) -> Result<(), ExportError> {
        let psg_channel = self.order_for(channel)?;

        if self.register.tone_enabled(psg_channel) {
            self.register.disable_tone(psg_channel);
            Instruction::Channels(self.register).encode(out);
        }

        let frames = note_frames(silence.length, 0, 0, self.bpm, self.hz);
        self.add_frames(channel, frames);

        Ok(())
    }

    /// Emits wait instructions for `frames` and advances the global
    /// frame counter.  Waits longer than a 5 bit payload are split.
    fn encode_wait(&mut self, frames: u32, out: &mut Vec<u8>) {
        if frames == 0 {
            return;
        }
        self.frames += frames;

        let mut left = frames;
        while left > MAX_WAIT_FRAMES {
            Instruction::Wait(MAX_WAIT_FRAMES as u8).encode(out);
            left -= MAX_WAIT_FRAMES;
        }
        Instruction::Wait(left as u8).encode(out);
    }

    /// Frames until the next channel needs attention.
    fn nearest_frame(&self) -> u32 {
        self.channel_frames
            .values()
            .filter_map(|t| t.value().checked_sub(self.frames.value()))
            .min()
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(0)
    }

    /// Frames until the last channel of the block finishes.
    fn farthest_frame(&self) -> u32 {
        self.channel_frames
            .values()
            .filter_map(|t| t.value().checked_sub(self.frames.value()))
            .max()
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(0)
    }

    fn sync_channels(&mut self) {
        for t in self.channel_frames.values_mut() {
            *t = self.frames;
        }
    }

    fn add_frames(&mut self, channel: &str, frames: u32) {
        *self
            .channel_frames
            .entry(channel.to_owned())
            .or_default() += frames;
    }

    fn octave_of(&self, channel: &str) -> i32 {
        self.octaves
            .get(channel)
            .copied()
            .unwrap_or_else(|| i32::from(Octave::DEFAULT.as_u8()))
    }

    /// Hardware channels are assigned in order of first use.
    fn order_for(&mut self, channel: &str) -> Result<PsgChannel, ExportError> {
        if let Some(i) = self.channel_order.iter().position(|c| c == channel) {
            return Ok(PsgChannel::ALL[i]);
        }
        let i = self.channel_order.len();
        if i >= PsgChannel::ALL.len() {
            return Err(ExportError::TooManyChannels(channel.to_owned()));
        }
        self.channel_order.push(channel.to_owned());
        Ok(PsgChannel::ALL[i])
    }
}

fn parse_property(
    properties: &HashMap<String, String>,
    key: &str,
    default: u32,
) -> Result<u32, ExportError> {
    match properties.get(key) {
        None => Ok(default),
        Some(v) => match v.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ExportError::InvalidProperty(key.to_owned(), v.clone())),
        },
    }
}

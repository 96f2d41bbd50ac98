//! Song data structures

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::notes::{Note, Octave, Silence, Volume};

use std::collections::{BTreeMap, HashMap};

pub type Tablature = Vec<TablatureItem>;

#[derive(Debug, Clone, PartialEq)]
pub enum TablatureItem {
    Instrument(Instrument),
    Note(Note),
    Silence(Silence),
    SetOctave(Octave),
    OctaveStep(i8),
    Volume(Volume),
}

/// An inline instrument definition (`name { key: value ... }`).
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub class: String,
    pub properties: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channel {
    pub items: Tablature,
}

/// Tablature for a group of channels that must end at the same time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncedBlock {
    pub channels: BTreeMap<String, Channel>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Song {
    pub properties: HashMap<String, String>,
    pub constants: HashMap<String, Tablature>,
    pub blocks: Vec<SyncedBlock>,
    pub loop_index: Option<usize>,
}

impl Song {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new synced block. Items added afterwards land in it.
    pub fn add_synced_block(&mut self) {
        self.blocks.push(SyncedBlock::default());
    }

    /// Appends items to `channel_id` in the current synced block.
    pub fn add_items(&mut self, channel_id: &str, items: &[TablatureItem]) {
        if self.blocks.is_empty() {
            self.add_synced_block();
        }
        // add_synced_block above guarantees a last block exists
        if let Some(block) = self.blocks.last_mut() {
            block
                .channels
                .entry(channel_id.to_owned())
                .or_default()
                .items
                .extend_from_slice(items);
        }
    }

    /// All channel names used throughout the song, in ascending order.
    pub fn channel_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for b in &self.blocks {
            for n in b.channels.keys() {
                if !names.contains(&n.as_str()) {
                    names.push(n);
                }
            }
        }
        names.sort_unstable();
        names
    }
}

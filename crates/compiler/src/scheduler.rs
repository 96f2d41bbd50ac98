//! Synced block scheduling

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::songs::{SyncedBlock, TablatureItem};

/// Duration of a tablature item in beats (a quarter note is 1 beat).
///
/// Only the nominal length counts here.  Dots and tuplet scaling
/// affect the frame counts the encoder keeps, not the merge order.
fn item_beats(item: &TablatureItem) -> f64 {
    match item {
        TablatureItem::Note(n) => 4.0 / f64::from(n.length.as_u8()),
        TablatureItem::Silence(s) => 4.0 / f64::from(s.length.as_u8()),
        _ => 0.0,
    }
}

struct ChannelCursor<'a> {
    name: &'a str,
    items: &'a [TablatureItem],
    index: usize,
    time: f64,
}

/// Merges the channels of a synced block into a single item stream,
/// ordered by the musical time each item starts at.
///
/// Channels are scanned in ascending name order and an item is only
/// preferred when it starts strictly earlier, so simultaneous items
/// come out grouped by channel name.  This keeps the output stable
/// across runs.
pub struct SyncedBlockIter<'a> {
    channels: Vec<ChannelCursor<'a>>,
}

impl<'a> SyncedBlockIter<'a> {
    pub fn new(block: &'a SyncedBlock) -> SyncedBlockIter<'a> {
        SyncedBlockIter {
            channels: block
                .channels
                .iter()
                .map(|(name, c)| ChannelCursor {
                    name,
                    items: &c.items,
                    index: 0,
                    time: 0.0,
                })
                .collect(),
        }
    }
}

impl<'a> Iterator for SyncedBlockIter<'a> {
    type Item = (&'a TablatureItem, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let mut best: Option<usize> = None;
        for (i, c) in self.channels.iter().enumerate() {
            if c.index >= c.items.len() {
                continue;
            }
            best = match best {
                None => Some(i),
                Some(b) if c.time < self.channels[b].time => Some(i),
                Some(b) => Some(b),
            };
        }

        let cursor = &mut self.channels[best?];
        let item = &cursor.items[cursor.index];
        cursor.index += 1;
        cursor.time += item_beats(item);
        Some((item, cursor.name))
    }
}

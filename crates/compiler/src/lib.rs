//! PSG song compiler

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

mod file_pos;
mod value_newtypes;

pub mod bytecode;
pub mod errors;
pub mod event_export;
pub mod export;
pub mod mml;
pub mod notes;
pub mod pitch_table;
pub mod scheduler;
pub mod songs;
pub mod time;

pub use file_pos::FilePos;

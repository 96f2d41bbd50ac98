//! MML compiler

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

pub mod header;
mod parser;
pub mod tokenizer;

pub use parser::parse_mml;

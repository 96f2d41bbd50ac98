//! Song header reader

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use regex::Regex;

use std::collections::HashMap;
use std::sync::OnceLock;

fn ignore_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(;.*)?$").unwrap())
}

fn property_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([\w.]+)\s+([\w.]+)\s*(;.*)?$").unwrap())
}

/// Properties read from the song header, plus the number of lines and
/// bytes consumed.  `byte_offset` points at the first non-header line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub properties: HashMap<String, String>,
    pub line_count: u32,
    pub byte_offset: usize,
}

/// Reads `key value` property lines from the top of the input.
///
/// Blank lines and comment lines are skipped.  The header ends at the
/// first line that is neither, which is left unconsumed.
pub fn parse_header(input: &str) -> Header {
    let mut header = Header::default();

    let mut offset = 0;
    for line in input.split_inclusive('\n') {
        let trimmed = line.strip_suffix('\n').unwrap_or(line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);

        if !ignore_line_regex().is_match(trimmed) {
            match property_regex().captures(trimmed) {
                Some(c) => {
                    header
                        .properties
                        .insert(c[1].to_owned(), c[2].to_owned());
                }
                None => break,
            }
        }

        offset += line.len();
        header.line_count += 1;
        header.byte_offset = offset;
    }

    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_properties() {
        let h = parse_header("tempo 180\npsg.hz 50\n\n@ch1 <- abc\n");
        assert_eq!(h.properties.get("tempo").map(String::as_str), Some("180"));
        assert_eq!(h.properties.get("psg.hz").map(String::as_str), Some("50"));
        assert_eq!(h.line_count, 3);
        assert_eq!(h.byte_offset, "tempo 180\npsg.hz 50\n\n".len());
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let h = parse_header("; a song\n\n  ; more\ntempo 90\n@a <- c\n");
        assert_eq!(h.properties.get("tempo").map(String::as_str), Some("90"));
        assert_eq!(h.line_count, 4);
    }

    #[test]
    fn empty_header() {
        let h = parse_header("@ch1 <- abc\n");
        assert!(h.properties.is_empty());
        assert_eq!(h.line_count, 0);
        assert_eq!(h.byte_offset, 0);
    }

    #[test]
    fn header_only_input() {
        let h = parse_header("tempo 120\n");
        assert_eq!(h.line_count, 1);
        assert_eq!(h.byte_offset, 10);
    }

    #[test]
    fn dotted_keys() {
        let h = parse_header("psg.hz 60  ; fifty for PAL\n@a <- c\n");
        assert_eq!(h.properties.get("psg.hz").map(String::as_str), Some("60"));
        assert_eq!(h.line_count, 1);
    }
}

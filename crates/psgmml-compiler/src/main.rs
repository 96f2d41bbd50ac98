//! compiler binary

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use clap::{Args, Parser, Subcommand};

use std::fs;
use std::path::PathBuf;

macro_rules! error {
    ($($arg:tt)*) => {{
        eprintln!($($arg)*);
        std::process::exit(1);
    }};
}

#[derive(Parser)]
#[command(author, version)]
#[command(about = "MML to PSG song compiler")]
#[command(arg_required_else_help = true)]
struct ArgParser {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile an MML file into a PSG instruction stream
    Song(CompileSongArgs),
    /// Export an MML file as a JSON note event list
    Events(ExportEventsArgs),
}

// Compile Song
// ============

#[derive(Args)]
struct CompileSongArgs {
    #[arg(short = 'o', long, value_name = "FILE", help = "output file")]
    output: PathBuf,

    #[arg(value_name = "MML_FILE", help = "MML song file")]
    mml_file: PathBuf,
}

fn compile_song(args: CompileSongArgs) {
    let song = parse_song(&args.mml_file);

    let data = match compiler::export::export_song(&song) {
        Ok(data) => data,
        Err(e) => error!("Cannot compile {}: {}", args.mml_file.display(), e),
    };

    write_data(args.output, data);
}

// Export Events
// =============

#[derive(Args)]
struct ExportEventsArgs {
    #[arg(short = 'o', long, value_name = "FILE", help = "output file (stdout when omitted)")]
    output: Option<PathBuf>,

    #[arg(value_name = "MML_FILE", help = "MML song file")]
    mml_file: PathBuf,
}

fn export_events(args: ExportEventsArgs) {
    let song = parse_song(&args.mml_file);

    let events = compiler::event_export::song_events(&song);
    let json = match serde_json::to_string_pretty(&events) {
        Ok(j) => j,
        Err(e) => error!("Cannot serialize events: {}", e),
    };

    match args.output {
        Some(path) => write_data(path, json.into_bytes()),
        None => println!("{}", json),
    }
}

fn main() {
    let args = ArgParser::parse();

    match args.command {
        Command::Song(c) => compile_song(c),
        Command::Events(c) => export_events(c),
    }
}

fn parse_song(path: &PathBuf) -> compiler::songs::Song {
    let contents = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => error!("Cannot load MML file: {}", e),
    };

    match compiler::mml::parse_mml(&contents) {
        Ok(song) => song,
        Err(e) => error!("{}: {}", path.display(), e),
    }
}

fn write_data(path: PathBuf, data: Vec<u8>) {
    match fs::write(&path, data) {
        Ok(()) => (),
        Err(why) => error!("Error writing {}: {}", path.display(), why),
    }
}

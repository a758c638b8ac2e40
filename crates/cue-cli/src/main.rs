mod app;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cue_core::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cue", version, about = "Voice-controlled music assistant")]
struct Cli {
    /// Print diagnostic output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for the hotkey and run record → transcribe → play cycles
    Listen,
    /// Skip the microphone: match and play a typed query
    Play {
        /// Free-text query, e.g. "yesterday by the beatles"
        query: Vec<String>,
    },
    /// List microphone inputs and playback devices
    Devices,
    /// Transcribe an audio file and print the text
    Transcribe {
        /// Audio file (anything FFmpeg can decode)
        file: PathBuf,
    },
    /// Show or update persisted settings
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    cue_core::set_verbose(cli.verbose);

    let settings = Settings::load();

    match cli.command.unwrap_or(Commands::Listen) {
        Commands::Listen => commands::listen::run(&settings),
        Commands::Play { query } => commands::play::run(&settings, &query.join(" ")),
        Commands::Devices => commands::devices::run(&settings),
        Commands::Transcribe { file } => commands::transcribe::run(&settings, &file),
        Commands::Config(args) => commands::config::run(args),
    }
}

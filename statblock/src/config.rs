//! Command-line configuration.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the converted character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Homebrewery markdown.
    #[default]
    Text,
    /// The derived character model (and spells) as JSON.
    Json,
}

/// Convert a Fight Club 5 character sheet into a Homebrewery stat block.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about)]
pub struct CliConfig {
    /// Character sheet, as JSON converted from the Fight Club XML export.
    #[arg(short, long, value_name = "FILE")]
    pub infile: PathBuf,

    /// Compendium, as JSON converted from the Fight Club XML compendium.
    #[arg(short, long, value_name = "FILE", env = "STATBLOCK_COMPENDIUM")]
    pub compendium: PathBuf,

    /// Output all spells as well as the character block.
    #[arg(long)]
    pub spells: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub outfile: Option<PathBuf>,
}

impl CliConfig {
    /// Parse the process arguments, after loading `.env` so its variables
    /// can stand in for flags.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}

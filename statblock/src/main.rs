//! Fight Club 5 to Homebrewery stat block converter.
//!
//! ```bash
//! cargo run -p statblock -- -i thorin.json -c compendium.json --spells
//! ```
//!
//! Progress is logged to stderr (filtered by `RUST_LOG`); stdout carries only
//! the rendered output.

mod config;

use anyhow::Context;
use config::{CliConfig, OutputFormat};
use statblock_core::persist::save_text;
use statblock_core::{convert, CompendiumIndex, ConvertOptions, RawRecord};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::load();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statblock=info,statblock_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(path = %config.compendium.display(), "Parsing compendium");
    let compendium = CompendiumIndex::load_json(&config.compendium)
        .await
        .with_context(|| format!("reading compendium {}", config.compendium.display()))?;

    tracing::info!(path = %config.infile.display(), "Parsing character sheet");
    let record = RawRecord::load_json(&config.infile)
        .await
        .with_context(|| format!("reading character sheet {}", config.infile.display()))?;

    let options = ConvertOptions::new().with_spells(config.spells);
    let conversion = convert(&record, &compendium, options)
        .with_context(|| format!("converting {}", config.infile.display()))?;

    let output = match config.format {
        OutputFormat::Text => conversion.to_text(),
        OutputFormat::Json => serde_json::to_string_pretty(&conversion)?,
    };

    match &config.outfile {
        Some(path) => {
            save_text(path, &output)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote stat block");
        }
        None => print!("{output}"),
    }

    Ok(())
}

use anyhow::{Context, Result};

use icsync_core::load_records;

use crate::config::Settings;
use crate::render::render_dropped;

/// Resolve the calendar offline and print the records as JSON.
pub fn run(settings: &Settings) -> Result<()> {
    let source = settings.read_calendar()?;
    let loaded = load_records(&source, &settings.context())?;

    if let Some(dropped) = render_dropped(&loaded) {
        eprintln!("{dropped}");
    }

    let json = serde_json::to_string_pretty(&loaded.records)
        .context("Failed to serialize resolved records")?;
    println!("{json}");

    Ok(())
}

//! Merge the per-pitcher season exports into `pitcher_data.csv`.
//!
//! Usage: `clean_pitches <source_dir> [output_path] [roster.json]`

use std::path::PathBuf;

use anyhow::{Context, Result};

use pitch_explorer::data::clean::{consolidate, discover_sources};
use pitch_explorer::data::loader::write_file;
use pitch_explorer::data::roster::TeamRoster;

const DEFAULT_OUTPUT: &str = "pitcher_data.csv";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let source_dir = args
        .next()
        .map(PathBuf::from)
        .context("usage: clean_pitches <source_dir> [output_path] [roster.json]")?;
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let roster = match args.next() {
        Some(path) => TeamRoster::from_json_file(&PathBuf::from(path))?,
        None => TeamRoster::default(),
    };

    log::info!("Team roster: {:?}", roster.team_names());

    let sources = discover_sources(&source_dir)?;
    log::info!(
        "Found {} source files in {}",
        sources.len(),
        source_dir.display()
    );

    let consolidation = consolidate(&sources, &roster)?;
    write_file(&output, &consolidation.events)
        .with_context(|| format!("writing {}", output.display()))?;

    let summary = &consolidation.summary;
    println!(
        "Wrote {} pitches from {}/{} source files to {}",
        summary.rows_kept,
        summary.sources_loaded,
        summary.sources_total,
        output.display()
    );
    for skipped in &summary.skipped {
        println!("  skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    if summary.rows_missing_hand > 0 {
        println!(
            "  dropped {} rows with unusable handedness",
            summary.rows_missing_hand
        );
    }
    println!(
        "  still generic: {} strikeouts, {} field outs",
        summary.unrefined_strikeouts, summary.unrefined_field_outs
    );
    for (team, count) in &summary.team_counts {
        println!("  {team}: {count}");
    }

    Ok(())
}

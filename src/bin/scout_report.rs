use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use proscout_terminal::catalog::global_catalog;
use proscout_terminal::export::export_ranking_xlsx;
use proscout_terminal::ingest::load_dataset;
use proscout_terminal::query::{ScoutParams, run_scout_query};

/// Headless ranking run for scripting:
///   scout_report <dataset.csv> <position> <archetype[,archetype...]> [out.xlsx]
/// Filter bounds default to the dataset's observed ranges; override with
/// SCOUT_AGE_MIN/MAX and SCOUT_MINUTES_MIN/MAX.
fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 3 {
        bail!("usage: scout_report <dataset.csv> <position> <archetype[,archetype...]> [out.xlsx]");
    }

    let path = PathBuf::from(&args[0]);
    let position = args[1].clone();
    let archetypes: Vec<String> = args[2]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let dataset = load_dataset(&path)?;
    let mut filter = dataset
        .default_filter()
        .context("dataset has no usable age/minutes columns")?;
    if let Some(v) = env_u32("SCOUT_AGE_MIN") {
        filter.age_min = v;
    }
    if let Some(v) = env_u32("SCOUT_AGE_MAX") {
        filter.age_max = v;
    }
    if let Some(v) = env_u32("SCOUT_MINUTES_MIN") {
        filter.minutes_min = v;
    }
    if let Some(v) = env_u32("SCOUT_MINUTES_MAX") {
        filter.minutes_max = v;
    }

    let catalog = global_catalog();
    let params = ScoutParams {
        position: position.clone(),
        archetypes: archetypes.clone(),
        filter,
    };
    let report = match run_scout_query(&dataset, catalog, &params) {
        Ok(report) => report,
        Err(warning) => {
            eprintln!("warning: {warning}");
            return Ok(());
        }
    };

    println!(
        "{position} — {} · {} players ranked over {} metrics",
        archetypes.join(", "),
        report.rows.len(),
        report.metrics.len()
    );
    println!("{:<4} {:<24} {:<16} {:>4} {:>6}", "#", "Player", "Team", "Age", "Score");
    for (idx, row) in report.rows.iter().enumerate() {
        let age = row.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:<4} {:<24} {:<16} {:>4} {:>6.1}",
            idx + 1,
            row.key.player,
            row.key.team,
            age,
            row.score
        );
    }

    if let Some(out) = args.get(3) {
        let done = export_ranking_xlsx(Path::new(out), &position, &archetypes, &report)?;
        println!("wrote {} rows x {} metrics to {out}", done.rows, done.metrics);
    }
    Ok(())
}

fn env_u32(name: &str) -> Option<u32> {
    env::var(name).ok().and_then(|val| val.parse::<u32>().ok())
}

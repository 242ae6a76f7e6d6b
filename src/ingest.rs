use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::dataset::{
    COL_AGE, COL_MINUTES, COL_PLAYER, COL_POSITION, COL_TEAM, Dataset, IdentityColumns,
    PlayerRecord,
};

/// Load a scouting export. Duplicate column names are dropped (first
/// occurrence wins) and decimal commas are converted, so downstream code
/// only ever sees `.`-separated numbers.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file =
        File::open(path).with_context(|| format!("open dataset {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader
        .headers()
        .with_context(|| format!("read headers of {}", path.display()))?
        .clone();
    if headers.is_empty() {
        bail!("dataset {} has no header row", path.display());
    }

    // Keep the first occurrence of each column; later duplicates are
    // ignored entirely.
    let mut seen = HashSet::new();
    let mut columns: Vec<(usize, String)> = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        let name = name.trim();
        if name.is_empty() || !seen.insert(name.to_string()) {
            continue;
        }
        columns.push((idx, name.to_string()));
    }

    let identity = IdentityColumns {
        player: columns.iter().any(|(_, n)| n == COL_PLAYER),
        team: columns.iter().any(|(_, n)| n == COL_TEAM),
        position: columns.iter().any(|(_, n)| n == COL_POSITION),
    };

    let mut records = Vec::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("read row {} of {}", row_idx + 2, path.display()))?;
        let cell = |idx: usize| row.get(idx).map(str::trim).unwrap_or_default();

        let mut player = String::new();
        let mut team = String::new();
        let mut age = None;
        let mut position = None;
        let mut minutes = None;
        let mut metrics = HashMap::new();

        for (idx, name) in &columns {
            let raw = cell(*idx);
            match name.as_str() {
                COL_PLAYER => player = raw.to_string(),
                COL_TEAM => team = raw.to_string(),
                COL_POSITION => {
                    if !raw.is_empty() {
                        position = Some(raw.to_string());
                    }
                }
                COL_AGE => age = parse_locale_number(raw).map(|v| v as u32),
                COL_MINUTES => minutes = parse_locale_number(raw).map(|v| v as u32),
                _ => {
                    if let Some(v) = parse_locale_number(raw) {
                        metrics.insert(name.clone(), v);
                    }
                }
            }
        }

        if player.is_empty() {
            // Exports without a name column still get addressable rows.
            player = format!("Jogador #{}", row_idx + 1);
        }
        records.push(PlayerRecord {
            player,
            team,
            age,
            position,
            minutes,
            metrics,
        });
    }

    Ok(Dataset::new(records, identity))
}

/// Numeric cell parser. Scouting exports use `,` as the decimal separator;
/// empty cells and `-` mean "no value".
pub fn parse_locale_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let normalized = s.replace(',', ".");
    normalized.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_commas() {
        assert_eq!(parse_locale_number("7,5"), Some(7.5));
        assert_eq!(parse_locale_number("7.5"), Some(7.5));
        assert_eq!(parse_locale_number(" 12 "), Some(12.0));
    }

    #[test]
    fn empty_and_dash_cells_have_no_value() {
        assert_eq!(parse_locale_number(""), None);
        assert_eq!(parse_locale_number("-"), None);
        assert_eq!(parse_locale_number("abc"), None);
    }
}

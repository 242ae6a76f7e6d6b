use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::query::ScoutReport;

pub struct ExportReport {
    pub rows: usize,
    pub metrics: usize,
}

/// Write the ranked table to an .xlsx workbook: identity fields, composite
/// score, then the raw signature-metric values.
pub fn export_ranking_xlsx(
    path: &Path,
    position: &str,
    archetypes: &[String],
    report: &ScoutReport,
) -> Result<ExportReport> {
    let mut header = vec![
        "Jogador".to_string(),
        "Equipa".to_string(),
        "Idade".to_string(),
        "Minutos".to_string(),
        "Score".to_string(),
    ];
    header.extend(report.metrics.iter().cloned());

    let mut rows = vec![
        vec![
            format!("{position} — {}", archetypes.join(", ")),
            format!("generated {}", Local::now().format("%Y-%m-%d %H:%M")),
        ],
        header,
    ];

    for row in &report.rows {
        let mut cells = vec![
            row.key.player.clone(),
            row.key.team.clone(),
            opt_to_string(row.age),
            opt_to_string(row.minutes),
            format!("{:.1}", row.score),
        ];
        for value in &row.raw_metrics {
            cells.push(value.map(|v| format!("{v}")).unwrap_or_default());
        }
        rows.push(cells);
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Ranking")?;
    write_rows(sheet, &rows)?;

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: report.rows.len(),
        metrics: report.metrics.len(),
    })
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

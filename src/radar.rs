use crate::catalog::{MetricCatalog, group_color};
use crate::dataset::PlayerKey;
use crate::scoring::PercentileColumns;

/// Parallel ordered sequences for a radar chart: metric names, one value
/// vector per requested player, and a slice color per metric.
#[derive(Debug, Clone)]
pub struct RadarPayload {
    pub metrics: Vec<String>,
    pub groups: Vec<String>,
    pub colors: Vec<&'static str>,
    /// One vector per requested player, aligned to `metrics`.
    pub values: Vec<Vec<f64>>,
}

impl RadarPayload {
    pub fn empty() -> Self {
        Self {
            metrics: Vec::new(),
            groups: Vec::new(),
            colors: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Project percentile columns onto a position's KPI groups for one or more
/// players. Metrics without a percentile in the current population are
/// silently skipped, never padded with a default; for multi-player
/// payloads a metric is emitted only when every requested player has a
/// value, so the parallel sequences stay aligned.
pub fn radar_payload(
    catalog: &MetricCatalog,
    position: &str,
    columns: &PercentileColumns,
    players: &[&PlayerKey],
) -> RadarPayload {
    let mut payload = RadarPayload::empty();
    payload.values = vec![Vec::new(); players.len()];

    for group in catalog.kpi_groups_for(position) {
        for metric in &group.metrics {
            let Some(column) = columns.get(metric) else {
                continue;
            };
            let slot: Option<Vec<f64>> = players
                .iter()
                .map(|key| column.get(*key).copied())
                .collect();
            let Some(slot) = slot else {
                continue;
            };
            payload.metrics.push(metric.clone());
            payload.groups.push(group.name.clone());
            payload.colors.push(group_color(&group.name));
            for (values, v) in payload.values.iter_mut().zip(slot) {
                values.push(v);
            }
        }
    }
    payload
}

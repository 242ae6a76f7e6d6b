use std::collections::{HashMap, HashSet};

use crate::catalog::MetricCatalog;
use crate::dataset::{PlayerKey, PlayerRecord};

/// Percentile columns for a query, keyed by metric name.
pub type PercentileColumns = HashMap<String, HashMap<PlayerKey, f64>>;

#[derive(Debug, Clone)]
pub struct ScoredPlayer {
    pub key: PlayerKey,
    pub score: f64,
}

/// Union of the selected archetypes' signature metrics, in catalog order,
/// deduplicated.
pub fn signature_metrics(catalog: &MetricCatalog, archetypes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for archetype in archetypes {
        for metric in catalog.metrics_for(archetype) {
            if seen.insert(metric.clone()) {
                out.push(metric.clone());
            }
        }
    }
    out
}

/// Resolve one weight per metric across the selected archetypes. When two
/// archetypes weight the same metric differently the maximum wins. Only
/// metrics in `available` (the signature metrics present in the dataset)
/// count; an empty result means scoring falls back to the unweighted mean.
pub fn resolve_weights(
    catalog: &MetricCatalog,
    archetypes: &[String],
    available: &[String],
) -> HashMap<String, f64> {
    let available: HashSet<&str> = available.iter().map(String::as_str).collect();
    let mut resolved: HashMap<String, f64> = HashMap::new();
    for archetype in archetypes {
        for (metric, weight) in catalog.weights_for(archetype) {
            if !available.contains(metric.as_str()) {
                continue;
            }
            resolved
                .entry(metric.clone())
                .and_modify(|w| *w = w.max(*weight))
                .or_insert(*weight);
        }
    }
    resolved
}

/// Composite score per player, ranked descending.
///
/// With resolved weights: `score = Σ(pct_i * w_i) / Σ(w_i)` over the
/// weighted metrics the player actually has a percentile for. Without any:
/// the unweighted mean over the player's available signature percentiles.
/// Players contributing to neither sum get no score and are absent from
/// the output (not zero-ranked). Equal scores keep the snapshot order.
pub fn compute_scores(
    population: &[&PlayerRecord],
    metrics: &[String],
    columns: &PercentileColumns,
    weights: &HashMap<String, f64>,
) -> Vec<ScoredPlayer> {
    let mut scored = Vec::new();
    for record in population {
        let key = record.key();
        let score = if weights.is_empty() {
            unweighted_mean(&key, metrics, columns)
        } else {
            weighted_mean(&key, columns, weights)
        };
        if let Some(score) = score {
            scored.push(ScoredPlayer { key, score });
        }
    }
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

fn weighted_mean(
    key: &PlayerKey,
    columns: &PercentileColumns,
    weights: &HashMap<String, f64>,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut weight_sum = 0.0;
    for (metric, weight) in weights {
        let Some(pct) = columns.get(metric).and_then(|col| col.get(key)) else {
            continue;
        };
        sum += pct * weight;
        weight_sum += weight;
    }
    if weight_sum > 0.0 {
        Some(sum / weight_sum)
    } else {
        None
    }
}

fn unweighted_mean(
    key: &PlayerKey,
    metrics: &[String],
    columns: &PercentileColumns,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for metric in metrics {
        let Some(pct) = columns.get(metric).and_then(|col| col.get(key)) else {
            continue;
        };
        sum += pct;
        n += 1;
    }
    if n > 0 { Some(sum / n as f64) } else { None }
}

use std::env;
use std::fmt;

use rayon::prelude::*;

use crate::catalog::{MetricCatalog, POSITION_GOALKEEPER};
use crate::dataset::{Dataset, PlayerKey, PlayerRecord, PopulationFilter};
use crate::percentile::percentile_column;
use crate::radar::{RadarPayload, radar_payload};
use crate::scoring::{PercentileColumns, compute_scores, resolve_weights, signature_metrics};
use crate::similarity::{DEFAULT_TOP_K, SimilarityOutcome, SimilarityRow, nearest_neighbors};

/// One scouting query: a position, the archetypes chosen for it, and the
/// population filter bounds. Each run is a full recomputation over an
/// immutable snapshot; nothing is cached between queries.
#[derive(Debug, Clone)]
pub struct ScoutParams {
    pub position: String,
    pub archetypes: Vec<String>,
    pub filter: PopulationFilter,
}

#[derive(Debug, Clone)]
pub struct SimilarityParams {
    pub reference: PlayerKey,
    pub position: String,
    pub filter: PopulationFilter,
    pub top_k: usize,
}

/// Recoverable query-level diagnostics. A failed query leaves prior state
/// untouched; none of these abort the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryWarning {
    EmptyPopulation,
    NoArchetypes,
    NoValidMetrics,
    NoComparisonMetrics,
    MissingIdentityColumns,
    UnknownReference(PlayerKey),
}

impl fmt::Display for QueryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryWarning::EmptyPopulation => {
                write!(f, "No players match the current age/minutes filters")
            }
            QueryWarning::NoArchetypes => write!(f, "Select at least one archetype"),
            QueryWarning::NoValidMetrics => {
                write!(f, "None of the selected archetypes' metrics exist in this dataset")
            }
            QueryWarning::NoComparisonMetrics => write!(f, "No valid comparison metrics"),
            QueryWarning::MissingIdentityColumns => write!(
                f,
                "Similarity needs the {}, {} and {} columns",
                crate::dataset::COL_PLAYER,
                crate::dataset::COL_TEAM,
                crate::dataset::COL_POSITION
            ),
            QueryWarning::UnknownReference(key) => {
                write!(f, "Reference player {} is not in the dataset", key.label())
            }
        }
    }
}

/// One row of the ranked output table: identity fields, composite score,
/// and the raw signature-metric values aligned to `ScoutReport::metrics`.
#[derive(Debug, Clone)]
pub struct RankedRow {
    pub key: PlayerKey,
    pub age: Option<u32>,
    pub minutes: Option<u32>,
    pub score: f64,
    pub raw_metrics: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct ScoutReport {
    /// Signature metrics present in the dataset, in catalog order.
    pub metrics: Vec<String>,
    /// Players passing filters with at least one signature metric, sorted
    /// descending by score.
    pub rows: Vec<RankedRow>,
    /// Radar payload for the top-ranked player; empty when the position
    /// has no radar definition or no radar metric survived.
    pub radar: RadarPayload,
}

#[derive(Debug, Clone)]
pub struct SimilarityReport {
    /// Top-K candidates, descending by similarity. Empty means "no
    /// comparable players".
    pub rows: Vec<SimilarityRow>,
    /// Comparative radar of reference vs. nearest neighbor.
    pub radar: RadarPayload,
}

pub fn top_k_from_env() -> usize {
    env::var("SCOUT_TOP_K")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TOP_K)
        .max(1)
}

pub fn run_scout_query(
    dataset: &Dataset,
    catalog: &MetricCatalog,
    params: &ScoutParams,
) -> Result<ScoutReport, QueryWarning> {
    if params.archetypes.is_empty() {
        return Err(QueryWarning::NoArchetypes);
    }
    let snapshot = dataset.filter(&params.filter);
    if snapshot.is_empty() {
        return Err(QueryWarning::EmptyPopulation);
    }

    let signature = signature_metrics(catalog, &params.archetypes);
    let available: Vec<String> = signature
        .into_iter()
        .filter(|m| dataset.has_metric(m))
        .collect();
    if available.is_empty() {
        return Err(QueryWarning::NoValidMetrics);
    }

    let columns = percentile_columns(&snapshot, catalog, &available);
    let weights = resolve_weights(catalog, &params.archetypes, &available);
    let scored = compute_scores(&snapshot, &available, &columns, &weights);

    let rows: Vec<RankedRow> = scored
        .iter()
        .filter_map(|s| {
            let record = snapshot.iter().find(|p| p.key() == s.key)?;
            Some(RankedRow {
                key: s.key.clone(),
                age: record.age,
                minutes: record.minutes,
                score: s.score,
                raw_metrics: available.iter().map(|m| record.metric(m)).collect(),
            })
        })
        .collect();

    let radar = match rows.first() {
        Some(top) => {
            let radar_columns = radar_percentile_columns(&snapshot, dataset, catalog);
            radar_payload(catalog, &params.position, &radar_columns, &[&top.key])
        }
        None => RadarPayload::empty(),
    };

    Ok(ScoutReport {
        metrics: available,
        rows,
        radar,
    })
}

pub fn run_similarity_query(
    dataset: &Dataset,
    catalog: &MetricCatalog,
    params: &SimilarityParams,
) -> Result<SimilarityReport, QueryWarning> {
    if !dataset.supports_similarity() {
        return Err(QueryWarning::MissingIdentityColumns);
    }
    let Some(reference) = dataset.get(&params.reference) else {
        return Err(QueryWarning::UnknownReference(params.reference.clone()));
    };

    let features = if reference.is_goalkeeper() {
        catalog.goalkeeper_features()
    } else {
        catalog.outfield_features()
    };
    let features: Vec<String> = features.into_iter().filter(|m| dataset.has_metric(m)).collect();

    let pool = dataset.candidate_pool(reference, &params.filter);
    let rows = match nearest_neighbors(reference, &pool, &features, params.top_k) {
        SimilarityOutcome::Ranked(rows) => rows,
        SimilarityOutcome::NoCandidates => Vec::new(),
        SimilarityOutcome::NoComparisonMetrics => {
            return Err(QueryWarning::NoComparisonMetrics);
        }
    };

    // Comparative radar over the segment the comparison ran against:
    // reference plus pool, so both players are ranked in one population.
    let radar = match rows.first() {
        Some(nearest) => {
            let mut segment = pool.clone();
            segment.push(reference);
            let radar_columns = radar_percentile_columns(&segment, dataset, catalog);
            let radar_position = if reference.is_goalkeeper() {
                POSITION_GOALKEEPER
            } else {
                params.position.as_str()
            };
            radar_payload(
                catalog,
                radar_position,
                &radar_columns,
                &[&params.reference, &nearest.key],
            )
        }
        None => RadarPayload::empty(),
    };

    Ok(SimilarityReport { rows, radar })
}

/// Percentile columns for the given metrics over one snapshot. Metrics are
/// independent, so the columns are computed in parallel and merged by
/// metric name; the result does not depend on scheduling.
fn percentile_columns(
    snapshot: &[&PlayerRecord],
    catalog: &MetricCatalog,
    metrics: &[String],
) -> PercentileColumns {
    metrics
        .par_iter()
        .map(|metric| {
            (
                metric.clone(),
                percentile_column(snapshot, metric, catalog.polarity(metric)),
            )
        })
        .collect()
}

/// Percentile columns over the whole radar metric universe present in the
/// dataset, for the same snapshot the scores were computed on.
fn radar_percentile_columns(
    snapshot: &[&PlayerRecord],
    dataset: &Dataset,
    catalog: &MetricCatalog,
) -> PercentileColumns {
    let metrics: Vec<String> = catalog
        .radar_metrics()
        .into_iter()
        .filter(|m| dataset.has_metric(m))
        .collect();
    percentile_columns(snapshot, catalog, &metrics)
}

use crate::dataset::{PlayerKey, PlayerRecord};

/// Threshold below which a feature column's spread is treated as zero.
const STD_EPSILON: f64 = 1e-9;

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone)]
pub struct SimilarityRow {
    pub key: PlayerKey,
    pub age: Option<u32>,
    pub position: Option<String>,
    pub minutes: Option<u32>,
    /// Display score in [0, 100], affine-rescaled cosine similarity.
    pub score: f64,
}

#[derive(Debug, Clone)]
pub enum SimilarityOutcome {
    Ranked(Vec<SimilarityRow>),
    /// Candidate pool was empty: "no comparable players".
    NoCandidates,
    /// None of the feature metrics exist in the dataset: "no valid
    /// comparison metrics".
    NoComparisonMetrics,
}

/// Cosine similarity, defined as 0 when either vector has zero norm.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Fixed affine map from cosine range [-1, 1] to the display range
/// [0, 100]. Chosen over per-pool min-max so scores stay comparable
/// across queries.
pub fn rescale_cosine(sim: f64) -> f64 {
    (sim + 1.0) / 2.0 * 100.0
}

/// Rank a candidate pool by cosine similarity to a reference player.
///
/// The feature matrix has one row per candidate and one column per feature
/// metric present in `feature_columns`; a player missing a metric
/// contributes 0 for that column (absence treated as zero — a deliberate
/// simplification, not mean imputation). With more than one candidate the
/// columns are standardized with mean/std fit on the pool, and the same
/// transform is applied to the reference vector; a pool of one is compared
/// on raw values since there is no variance to estimate.
pub fn nearest_neighbors(
    reference: &PlayerRecord,
    pool: &[&PlayerRecord],
    feature_columns: &[String],
    top_k: usize,
) -> SimilarityOutcome {
    if feature_columns.is_empty() {
        return SimilarityOutcome::NoComparisonMetrics;
    }
    if pool.is_empty() {
        return SimilarityOutcome::NoCandidates;
    }

    let mut matrix: Vec<Vec<f64>> = pool
        .iter()
        .map(|record| feature_vector(record, feature_columns))
        .collect();
    let mut reference_row = feature_vector(reference, feature_columns);

    if pool.len() > 1 {
        standardize(&mut matrix, &mut reference_row);
    }

    let mut rows: Vec<SimilarityRow> = pool
        .iter()
        .zip(&matrix)
        .map(|(record, row)| SimilarityRow {
            key: record.key(),
            age: record.age,
            position: record.position.clone(),
            minutes: record.minutes,
            score: rescale_cosine(cosine(&reference_row, row)),
        })
        .collect();

    rows.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    rows.truncate(top_k);
    SimilarityOutcome::Ranked(rows)
}

fn feature_vector(record: &PlayerRecord, feature_columns: &[String]) -> Vec<f64> {
    feature_columns
        .iter()
        .map(|metric| record.metric(metric).unwrap_or(0.0))
        .collect()
}

/// Column-wise standardization fit on the candidate matrix and applied to
/// the reference row as well. Zero-variance columns are centered only
/// (scale degrades to 1).
fn standardize(matrix: &mut [Vec<f64>], reference: &mut [f64]) {
    let rows = matrix.len();
    let cols = reference.len();
    for col in 0..cols {
        let mean = matrix.iter().map(|row| row[col]).sum::<f64>() / rows as f64;
        let var = matrix
            .iter()
            .map(|row| {
                let d = row[col] - mean;
                d * d
            })
            .sum::<f64>()
            / rows as f64;
        let std = var.sqrt();
        let scale = if std < STD_EPSILON { 1.0 } else { std };
        for row in matrix.iter_mut() {
            row[col] = (row[col] - mean) / scale;
        }
        reference[col] = (reference[col] - mean) / scale;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn player(name: &str, metrics: &[(&str, f64)]) -> PlayerRecord {
        PlayerRecord {
            player: name.to_string(),
            team: "T".to_string(),
            age: Some(25),
            position: Some("Centroavante".to_string()),
            minutes: Some(1800),
            metrics: metrics.iter().map(|(m, v)| (m.to_string(), *v)).collect(),
        }
    }

    fn features(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = [1.0, 2.0, -0.5];
        let b = [0.3, -1.0, 2.2];
        assert!((cosine(&a, &b) - cosine(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn rescale_maps_cosine_range_onto_display_range() {
        assert_eq!(rescale_cosine(1.0), 100.0);
        assert_eq!(rescale_cosine(-1.0), 0.0);
        assert_eq!(rescale_cosine(0.0), 50.0);
    }

    #[test]
    fn empty_pool_reports_no_candidates() {
        let reference = player("Ref", &[("Golos/90", 1.0)]);
        let outcome = nearest_neighbors(&reference, &[], &features(&["Golos/90"]), DEFAULT_TOP_K);
        assert!(matches!(outcome, SimilarityOutcome::NoCandidates));
    }

    #[test]
    fn empty_feature_set_refuses_to_compute() {
        let reference = player("Ref", &[("Golos/90", 1.0)]);
        let candidate = player("C", &[("Golos/90", 1.0)]);
        let pool = vec![&candidate];
        let outcome = nearest_neighbors(&reference, &pool, &[], DEFAULT_TOP_K);
        assert!(matches!(outcome, SimilarityOutcome::NoComparisonMetrics));
    }

    #[test]
    fn identical_player_is_the_nearest_neighbor() {
        let reference = player("Ref", &[("Golos/90", 0.8), ("Remates/90", 3.0)]);
        let twin = player("Twin", &[("Golos/90", 0.8), ("Remates/90", 3.0)]);
        let far = player("Far", &[("Golos/90", 0.1), ("Remates/90", 0.2)]);
        let mid = player("Mid", &[("Golos/90", 0.5), ("Remates/90", 1.5)]);
        let pool = vec![&far, &twin, &mid];
        let outcome = nearest_neighbors(
            &reference,
            &pool,
            &features(&["Golos/90", "Remates/90"]),
            DEFAULT_TOP_K,
        );
        let SimilarityOutcome::Ranked(rows) = outcome else {
            panic!("expected a ranking");
        };
        assert_eq!(rows[0].key.player, "Twin");
        assert!(rows.iter().all(|r| (0.0..=100.0).contains(&r.score)));
        assert_eq!(rows[0].score, rows.iter().cloned().fold(0.0f64, |m, r| m.max(r.score)));
    }

    #[test]
    fn pool_of_one_skips_standardization() {
        let reference = player("Ref", &[("Golos/90", 1.0), ("Remates/90", 2.0)]);
        let only = player("Only", &[("Golos/90", 2.0), ("Remates/90", 4.0)]);
        let pool = vec![&only];
        let outcome = nearest_neighbors(
            &reference,
            &pool,
            &features(&["Golos/90", "Remates/90"]),
            DEFAULT_TOP_K,
        );
        let SimilarityOutcome::Ranked(rows) = outcome else {
            panic!("expected a ranking");
        };
        // Raw vectors are parallel, so the cosine is 1 and the display
        // score is the maximum.
        assert!((rows[0].score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn missing_metrics_are_zero_filled() {
        let reference = player("Ref", &[("Golos/90", 1.0), ("Remates/90", 4.0)]);
        let sparse = player("Sparse", &[]);
        let rich = player("Rich", &[("Golos/90", 1.0), ("Remates/90", 5.0)]);
        let pool = vec![&sparse, &rich];
        let outcome = nearest_neighbors(
            &reference,
            &pool,
            &features(&["Golos/90", "Remates/90"]),
            DEFAULT_TOP_K,
        );
        let SimilarityOutcome::Ranked(rows) = outcome else {
            panic!("expected a ranking");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key.player, "Rich");
    }

    #[test]
    fn top_k_truncates_the_ranking() {
        let reference = player("Ref", &[("Golos/90", 1.0)]);
        let candidates: Vec<PlayerRecord> = (0..8)
            .map(|i| player(&format!("C{i}"), &[("Golos/90", 0.1 * i as f64)]))
            .collect();
        let pool: Vec<&PlayerRecord> = candidates.iter().collect();
        let outcome = nearest_neighbors(&reference, &pool, &features(&["Golos/90"]), 5);
        let SimilarityOutcome::Ranked(rows) = outcome else {
            panic!("expected a ranking");
        };
        assert_eq!(rows.len(), 5);
    }
}

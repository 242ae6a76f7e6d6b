use std::collections::HashMap;

use crate::catalog::Polarity;
use crate::dataset::{PlayerKey, PlayerRecord};

/// Rank-based percentiles in [0, 100] for one metric across a population.
///
/// Ranks are 1..=N with ties sharing the average of their rank span, then
/// scaled by `rank / N * 100`, so the best value under the metric's
/// polarity always lands on 100 and a population of one yields 100.
/// Values are grouped into a tie by exact equality.
pub fn rank_percentiles(values: &[f64], polarity: Polarity) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    // Better values must sort last so they collect the highest ranks.
    match polarity {
        Polarity::HigherBetter => {
            indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        }
        Polarity::LowerBetter => {
            indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
        }
    }

    let mut out = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + 1 + j + 1) as f64 / 2.0;
        let pct = avg_rank / n as f64 * 100.0;
        for k in i..=j {
            out[indexed[k].0] = pct;
        }
        i = j + 1;
    }
    out
}

/// Percentile column for one metric over a population snapshot. Players
/// without a numeric value for the metric are excluded from the ranked
/// population and get no entry; absence means "does not contribute", never
/// zero.
pub fn percentile_column(
    population: &[&PlayerRecord],
    metric: &str,
    polarity: Polarity,
) -> HashMap<PlayerKey, f64> {
    let mut keys = Vec::new();
    let mut values = Vec::new();
    for record in population {
        if let Some(v) = record.metric(metric) {
            keys.push(record.key());
            values.push(v);
        }
    }

    let percentiles = rank_percentiles(&values, polarity);
    keys.into_iter().zip(percentiles).collect()
}

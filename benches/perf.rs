use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use proscout_terminal::catalog::{Polarity, default_catalog};
use proscout_terminal::dataset::{Dataset, PopulationFilter};
use proscout_terminal::percentile::rank_percentiles;
use proscout_terminal::query::{ScoutParams, SimilarityParams, run_scout_query, run_similarity_query};
use proscout_terminal::sample_data::sample_dataset;

fn demo(players_per_position: usize) -> Dataset {
    sample_dataset(default_catalog(), players_per_position)
}

fn wide_filter() -> PopulationFilter {
    PopulationFilter { age_min: 0, age_max: 99, minutes_min: 0, minutes_max: 99_999 }
}

fn bench_rank_percentiles(c: &mut Criterion) {
    let values: Vec<f64> = (0..5000).map(|i| ((i * 37) % 997) as f64 / 7.0).collect();
    c.bench_function("rank_percentiles_5000", |b| {
        b.iter(|| {
            let out = rank_percentiles(black_box(&values), Polarity::HigherBetter);
            black_box(out.len());
        })
    });
}

fn bench_scout_query(c: &mut Criterion) {
    let dataset = demo(120);
    let catalog = default_catalog();
    let params = ScoutParams {
        position: "Centroavante".to_string(),
        archetypes: vec!["Finalizador".to_string(), "Assistente".to_string()],
        filter: wide_filter(),
    };
    c.bench_function("scout_query_960_players", |b| {
        b.iter(|| {
            let report = run_scout_query(black_box(&dataset), catalog, &params).unwrap();
            black_box(report.rows.len());
        })
    });
}

fn bench_similarity_query(c: &mut Criterion) {
    let dataset = demo(120);
    let catalog = default_catalog();
    let reference = dataset
        .players()
        .iter()
        .find(|p| !p.is_goalkeeper())
        .expect("demo data has outfield players")
        .key();
    let params = SimilarityParams {
        reference,
        position: "Centroavante".to_string(),
        filter: wide_filter(),
        top_k: 5,
    };
    c.bench_function("similarity_query_960_players", |b| {
        b.iter(|| {
            let report = run_similarity_query(black_box(&dataset), catalog, &params).unwrap();
            black_box(report.rows.len());
        })
    });
}

criterion_group!(
    benches,
    bench_rank_percentiles,
    bench_scout_query,
    bench_similarity_query
);
criterion_main!(benches);

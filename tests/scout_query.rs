use std::path::PathBuf;

use proscout_terminal::catalog::{MetricCatalog, default_catalog};
use proscout_terminal::dataset::{Dataset, PopulationFilter};
use proscout_terminal::ingest::load_dataset;
use proscout_terminal::query::{QueryWarning, ScoutParams, run_scout_query};
use proscout_terminal::scoring::resolve_weights;

fn load_fixture(name: &str) -> Dataset {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    load_dataset(&path).expect("fixture should load")
}

fn wide_filter() -> PopulationFilter {
    PopulationFilter { age_min: 0, age_max: 99, minutes_min: 0, minutes_max: 99_999 }
}

fn finalizador_params() -> ScoutParams {
    ScoutParams {
        position: "Centroavante".to_string(),
        archetypes: vec!["Finalizador".to_string()],
        filter: wide_filter(),
    }
}

#[test]
fn finalizador_ranking_matches_hand_computed_scores() {
    let dataset = load_fixture("players_small.csv");
    let report = run_scout_query(&dataset, default_catalog(), &finalizador_params()).unwrap();

    // Goalkeepers have none of the signature metrics and are excluded.
    assert_eq!(report.rows.len(), 4);
    let order: Vec<&str> = report.rows.iter().map(|r| r.key.player.as_str()).collect();
    assert_eq!(order, vec!["Ana Prieto", "Bruna Costa", "Carla Dias", "Dora Luz"]);

    // Percentiles over 4 strikers, weights Golos 3.0 / Toques 2.0 /
    // Remates à baliza 1.5 / Remates 1.0:
    // Ana = (100*3 + 100*2 + 75*1.5 + 75*1) / 7.5
    assert!((report.rows[0].score - 687.5 / 7.5).abs() < 1e-9);
    assert!((report.rows[1].score - 625.0 / 7.5).abs() < 1e-9);
    assert!((report.rows[2].score - 50.0).abs() < 1e-9);
    assert!((report.rows[3].score - 25.0).abs() < 1e-9);
}

#[test]
fn ranked_rows_carry_raw_metric_values() {
    let dataset = load_fixture("players_small.csv");
    let report = run_scout_query(&dataset, default_catalog(), &finalizador_params()).unwrap();
    let golos_idx = report.metrics.iter().position(|m| m == "Golos/90").unwrap();
    assert_eq!(report.rows[0].raw_metrics[golos_idx], Some(0.9));
}

#[test]
fn top_player_radar_follows_catalog_groups() {
    let dataset = load_fixture("players_small.csv");
    let report = run_scout_query(&dataset, default_catalog(), &finalizador_params()).unwrap();

    let radar = &report.radar;
    assert!(!radar.is_empty());
    // Only the radar metrics present in the file survive, in group order:
    // Posse first, then Atacando.
    assert_eq!(
        radar.metrics,
        vec![
            "Passes certos, %".to_string(),
            "Golos/90".to_string(),
            "Remates/90".to_string(),
            "Remates à baliza, %".to_string(),
            "Toques na área/90".to_string(),
        ]
    );
    assert_eq!(radar.groups[0], "Posse");
    assert!(radar.groups[1..].iter().all(|g| g == "Atacando"));
    assert_eq!(radar.values.len(), 1);
    assert!(radar.values[0].iter().all(|v| (0.0..=100.0).contains(v)));
    // Ana tops Golos/90 in this population.
    let golos = radar.metrics.iter().position(|m| m == "Golos/90").unwrap();
    assert_eq!(radar.values[0][golos], 100.0);
}

#[test]
fn age_filter_with_no_matches_warns_without_computing() {
    let dataset = load_fixture("players_small.csv");
    let params = ScoutParams {
        position: "Centroavante".to_string(),
        archetypes: vec!["Finalizador".to_string()],
        filter: PopulationFilter { age_min: 18, age_max: 18, minutes_min: 0, minutes_max: 99_999 },
    };
    assert_eq!(
        run_scout_query(&dataset, default_catalog(), &params).unwrap_err(),
        QueryWarning::EmptyPopulation
    );
}

#[test]
fn minutes_filter_trims_the_population_and_percentiles() {
    let dataset = load_fixture("players_small.csv");
    let params = ScoutParams {
        position: "Centroavante".to_string(),
        archetypes: vec!["Finalizador".to_string()],
        // Excludes Carla (900 minutes).
        filter: PopulationFilter { age_min: 0, age_max: 99, minutes_min: 1000, minutes_max: 99_999 },
    };
    let report = run_scout_query(&dataset, default_catalog(), &params).unwrap();
    assert_eq!(report.rows.len(), 3);
    assert!(report.rows.iter().all(|r| r.key.player != "Carla Dias"));
    // Percentiles are recomputed on the trimmed population: Dora is now
    // the worst of 3 on every metric.
    let dora = report.rows.iter().find(|r| r.key.player == "Dora Luz").unwrap();
    assert!((dora.score - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn conflicting_weights_resolve_to_the_maximum() {
    let catalog: MetricCatalog = serde_json::from_str(
        r#"{
            "position_archetypes": {"Centroavante": ["Oportunista", "Matador"]},
            "archetype_metrics": {
                "Oportunista": ["Golos/90"],
                "Matador": ["Golos/90"]
            },
            "archetype_weights": {
                "Oportunista": {"Golos/90": 1.5},
                "Matador": {"Golos/90": 3.0}
            },
            "position_kpis": {},
            "lower_is_better": []
        }"#,
    )
    .expect("inline catalog should parse");

    let archetypes = vec!["Oportunista".to_string(), "Matador".to_string()];
    let available = vec!["Golos/90".to_string()];
    let resolved = resolve_weights(&catalog, &archetypes, &available);
    assert_eq!(resolved.get("Golos/90"), Some(&3.0));
}

#[test]
fn unweighted_fallback_uses_the_plain_mean() {
    // An injected catalog whose archetype has signature metrics but no
    // weight table at all.
    let catalog: MetricCatalog = serde_json::from_str(
        r#"{
            "position_archetypes": {"Centroavante": ["Cru"]},
            "archetype_metrics": {"Cru": ["Golos/90", "Remates/90"]},
            "archetype_weights": {},
            "position_kpis": {},
            "lower_is_better": []
        }"#,
    )
    .unwrap();

    let dataset = load_fixture("players_small.csv");
    let params = ScoutParams {
        position: "Centroavante".to_string(),
        archetypes: vec!["Cru".to_string()],
        filter: wide_filter(),
    };
    let report = run_scout_query(&dataset, &catalog, &params).unwrap();
    // Ana: Golos pct 100, Remates pct 75 -> mean 87.5.
    let ana = report.rows.iter().find(|r| r.key.player == "Ana Prieto").unwrap();
    assert!((ana.score - 87.5).abs() < 1e-9);
}

#[test]
fn selecting_two_archetypes_unions_their_metrics() {
    let dataset = load_fixture("players_small.csv");
    let params = ScoutParams {
        position: "Centroavante".to_string(),
        archetypes: vec!["Finalizador".to_string(), "Assistente".to_string()],
        filter: wide_filter(),
    };
    // Assistente's metrics are absent from the fixture, so the available
    // set equals Finalizador's and the scores are unchanged.
    let report = run_scout_query(&dataset, default_catalog(), &params).unwrap();
    assert_eq!(report.metrics.len(), 4);
    assert_eq!(report.rows[0].key.player, "Ana Prieto");
}

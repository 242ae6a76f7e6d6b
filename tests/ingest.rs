use std::path::PathBuf;

use proscout_terminal::dataset::{Dataset, PlayerKey};
use proscout_terminal::ingest::load_dataset;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn load_fixture(name: &str) -> Dataset {
    load_dataset(&fixture_path(name)).expect("fixture should load")
}

#[test]
fn duplicate_columns_keep_the_first_occurrence() {
    let dataset = load_fixture("players_dupes.csv");
    let ana = dataset
        .get(&PlayerKey::new("Ana", "Alfa"))
        .expect("Ana (Alfa) should exist");
    // The second Golos/90 column carries 9,9; the first one wins.
    assert_eq!(ana.metric("Golos/90"), Some(0.9));
}

#[test]
fn duplicate_player_team_rows_are_dropped() {
    let dataset = load_fixture("players_dupes.csv");
    assert_eq!(dataset.len(), 2);
    let ana_alfa = dataset.get(&PlayerKey::new("Ana", "Alfa")).unwrap();
    assert_eq!(ana_alfa.age, Some(22));
    assert!(dataset.get(&PlayerKey::new("Ana", "Beta")).is_some());
}

#[test]
fn decimal_commas_become_dots() {
    let dataset = load_fixture("players_small.csv");
    let ana = dataset.get(&PlayerKey::new("Ana Prieto", "Alfa FC")).unwrap();
    assert_eq!(ana.metric("Golos/90"), Some(0.9));
    assert_eq!(ana.metric("Toques na área/90"), Some(5.1));
}

#[test]
fn empty_cells_leave_metrics_sparse() {
    let dataset = load_fixture("players_small.csv");
    let eva = dataset.get(&PlayerKey::new("Eva Reis", "Beta SC")).unwrap();
    assert_eq!(eva.metric("Golos/90"), None);
    assert_eq!(eva.metric("Defesas, %"), Some(71.0));
}

#[test]
fn identity_columns_are_detected() {
    let full = load_fixture("players_small.csv");
    assert!(full.supports_similarity());

    let no_position = load_fixture("players_no_position.csv");
    assert!(!no_position.supports_similarity());
    // Scoring still works without a position column.
    assert!(no_position.has_metric("Golos/90"));
    assert_eq!(no_position.len(), 2);
}

#[test]
fn observed_bounds_cover_the_file() {
    let dataset = load_fixture("players_small.csv");
    assert_eq!(dataset.age_bounds(), Some((22, 31)));
    assert_eq!(dataset.minutes_bounds(), Some((900, 2500)));
}

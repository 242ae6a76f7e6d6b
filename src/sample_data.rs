use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::catalog::{MetricCatalog, POSITIONS};
use crate::dataset::{Dataset, IdentityColumns, PlayerRecord};

const TEAMS: [&str; 8] = [
    "Alfa FC",
    "Beta SC",
    "Gama EC",
    "Delta AC",
    "Ómega FC",
    "Sigma SC",
    "Vetor EC",
    "Pulso AC",
];

const SURNAMES: [&str; 20] = [
    "Silva", "Santos", "Costa", "Pereira", "Rocha", "Mendes", "Nunes", "Pinto", "Moreira",
    "Tavares", "Ramos", "Lopes", "Cardoso", "Fonseca", "Barros", "Matos", "Vieira", "Sales",
    "Dias", "Teles",
];

/// Synthetic population so the terminal runs without a file. Values are
/// drawn per metric family, so percentiles and similarity behave like a
/// real export would.
pub fn sample_dataset(catalog: &MetricCatalog, players_per_position: usize) -> Dataset {
    let mut rng = rand::thread_rng();
    let metrics = demo_metrics(catalog);
    let mut records = Vec::new();
    let mut serial = 0usize;

    for position in POSITIONS {
        for _ in 0..players_per_position {
            let surname = SURNAMES[serial % SURNAMES.len()];
            let initial = (b'A' + (serial / SURNAMES.len()) as u8) as char;
            let team = TEAMS[rng.gen_range(0..TEAMS.len())];
            serial += 1;

            let mut values = HashMap::new();
            for metric in &metrics {
                // Leave an occasional hole so "metric missing for this
                // player" paths get exercised in the demo too.
                if rng.gen_range(0..20) == 0 {
                    continue;
                }
                values.insert(metric.clone(), demo_value(metric, &mut rng));
            }

            records.push(PlayerRecord {
                player: format!("{initial}. {surname}"),
                team: team.to_string(),
                age: Some(rng.gen_range(17..=35)),
                position: Some(position.to_string()),
                minutes: Some(rng.gen_range(180..=3200)),
                metrics: values,
            });
        }
    }

    Dataset::new(
        records,
        IdentityColumns { player: true, team: true, position: true },
    )
}

/// Every metric the catalog can ask for: the radar universe plus all
/// archetype signatures.
fn demo_metrics(catalog: &MetricCatalog) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for metric in catalog.radar_metrics() {
        if seen.insert(metric.clone()) {
            out.push(metric);
        }
    }
    for position in POSITIONS {
        let archetypes: Vec<String> = catalog.archetypes_for(position).to_vec();
        for archetype in &archetypes {
            for metric in catalog.metrics_for(archetype) {
                if seen.insert(metric.clone()) {
                    out.push(metric.clone());
                }
            }
        }
    }
    out
}

fn demo_value(metric: &str, rng: &mut impl Rng) -> f64 {
    if metric.contains('%') {
        return round1(rng.gen_range(30.0..95.0));
    }
    if metric.contains("Golos") || metric.contains("Assistências") {
        return round2(rng.gen_range(0.0..1.2));
    }
    if metric.contains("Passes") {
        return round1(rng.gen_range(5.0..75.0));
    }
    round1(rng.gen_range(0.0..14.0))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn demo_population_covers_every_position() {
        let ds = sample_dataset(default_catalog(), 6);
        assert_eq!(ds.len(), 6 * POSITIONS.len());
        for position in POSITIONS {
            assert!(ds
                .players()
                .iter()
                .any(|p| p.position.as_deref() == Some(position)));
        }
        assert!(ds.supports_similarity());
    }

    #[test]
    fn demo_metrics_are_present_in_the_dataset() {
        let ds = sample_dataset(default_catalog(), 4);
        assert!(ds.has_metric("Golos/90"));
        assert!(ds.has_metric("Defesas, %"));
    }
}

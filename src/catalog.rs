use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const POSITIONS: [&str; 8] = [
    "Goleiro",
    "Lateral",
    "Zagueiro",
    "Volante",
    "Meia-Central",
    "Meia-Ofensivo",
    "Extremo",
    "Centroavante",
];

pub const POSITION_GOALKEEPER: &str = "Goleiro";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherBetter,
    LowerBetter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiGroup {
    pub name: String,
    pub metrics: Vec<String>,
}

/// Static scouting knowledge: which archetypes belong to each position,
/// which metrics define each archetype (and at what weight), and which
/// grouped KPI sets drive the radar per position. Immutable after load;
/// query code receives it by reference and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricCatalog {
    position_archetypes: HashMap<String, Vec<String>>,
    archetype_metrics: HashMap<String, Vec<String>>,
    archetype_weights: HashMap<String, HashMap<String, f64>>,
    position_kpis: HashMap<String, Vec<KpiGroup>>,
    lower_is_better: HashSet<String>,
}

static EMPTY_METRICS: Lazy<Vec<String>> = Lazy::new(Vec::new);
static EMPTY_WEIGHTS: Lazy<HashMap<String, f64>> = Lazy::new(HashMap::new);
static EMPTY_KPIS: Lazy<Vec<KpiGroup>> = Lazy::new(Vec::new);

impl MetricCatalog {
    /// Archetype names valid for a position. Unknown positions yield an
    /// empty slice, not an error.
    pub fn archetypes_for(&self, position: &str) -> &[String] {
        self.position_archetypes
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Signature metrics of an archetype, in catalog order. Empty for
    /// unknown archetypes and for archetypes with no metric table.
    pub fn metrics_for(&self, archetype: &str) -> &[String] {
        self.archetype_metrics
            .get(archetype)
            .unwrap_or(&EMPTY_METRICS)
    }

    /// Per-metric importance weights of an archetype. Empty for unknown
    /// archetypes and for archetypes with no weight table.
    pub fn weights_for(&self, archetype: &str) -> &HashMap<String, f64> {
        self.archetype_weights
            .get(archetype)
            .unwrap_or(&EMPTY_WEIGHTS)
    }

    /// Ordered KPI groups a position's radar is built from. Empty for
    /// positions without a radar definition.
    pub fn kpi_groups_for(&self, position: &str) -> &[KpiGroup] {
        self.position_kpis
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or(&EMPTY_KPIS)
    }

    pub fn polarity(&self, metric: &str) -> Polarity {
        if self.lower_is_better.contains(metric) {
            Polarity::LowerBetter
        } else {
            Polarity::HigherBetter
        }
    }

    /// Every distinct radar metric across all positions, in fixed position
    /// then group order. This is the percentile universe for radar payloads.
    pub fn radar_metrics(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for position in POSITIONS {
            for group in self.kpi_groups_for(position) {
                for metric in &group.metrics {
                    if seen.insert(metric.clone()) {
                        out.push(metric.clone());
                    }
                }
            }
        }
        out
    }

    /// Feature set for goalkeeper similarity: the goalkeeper KPI catalog.
    pub fn goalkeeper_features(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for group in self.kpi_groups_for(POSITION_GOALKEEPER) {
            for metric in &group.metrics {
                if seen.insert(metric.clone()) {
                    out.push(metric.clone());
                }
            }
        }
        out
    }

    /// Feature set for outfield similarity: the union of every outfield
    /// position's KPIs, in fixed position order.
    pub fn outfield_features(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for position in POSITIONS {
            if position == POSITION_GOALKEEPER {
                continue;
            }
            for group in self.kpi_groups_for(position) {
                for metric in &group.metrics {
                    if seen.insert(metric.clone()) {
                        out.push(metric.clone());
                    }
                }
            }
        }
        out
    }
}

pub fn group_color(group: &str) -> &'static str {
    match group {
        "Atacando" => "#FF5733",
        "Defendendo" => "#33FF57",
        "Posse" => "#3375FF",
        _ => "#999999",
    }
}

/// Built-in catalog, shared process-wide. Query code still takes
/// `&MetricCatalog` so tests can inject a small one.
pub fn default_catalog() -> &'static MetricCatalog {
    static DEFAULT: Lazy<MetricCatalog> = Lazy::new(build_default_catalog);
    &DEFAULT
}

/// Catalog used by the binaries: a JSON artifact from `SCOUT_CATALOG_PATH`
/// when set and readable, the built-in tables otherwise.
pub fn global_catalog() -> &'static MetricCatalog {
    static CATALOG: OnceLock<Option<MetricCatalog>> = OnceLock::new();
    CATALOG
        .get_or_init(|| load_catalog_override().ok().flatten())
        .as_ref()
        .unwrap_or_else(|| default_catalog())
}

fn load_catalog_override() -> Result<Option<MetricCatalog>> {
    let Some(path) = catalog_path_override() else {
        return Ok(None);
    };
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read catalog artifact {}", path.display()))?;
    let catalog = serde_json::from_str::<MetricCatalog>(&raw)
        .with_context(|| format!("parse catalog artifact {}", path.display()))?;
    Ok(Some(catalog))
}

fn catalog_path_override() -> Option<PathBuf> {
    env::var("SCOUT_CATALOG_PATH")
        .ok()
        .map(|s| PathBuf::from(s.trim()))
        .filter(|p| !p.as_os_str().is_empty())
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn weights(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(m, w)| (m.to_string(), *w)).collect()
}

fn kpis(groups: &[(&str, &[&str])]) -> Vec<KpiGroup> {
    groups
        .iter()
        .map(|(name, metrics)| KpiGroup {
            name: name.to_string(),
            metrics: names(metrics),
        })
        .collect()
}

fn build_default_catalog() -> MetricCatalog {
    let mut position_archetypes = HashMap::new();
    position_archetypes.insert(
        "Centroavante".to_string(),
        names(&["Finalizador", "Pressionador", "Dominador Aéreo", "Movimentador", "Assistente"]),
    );
    position_archetypes.insert(
        "Extremo".to_string(),
        names(&["Driblador", "Finalizador", "Cruzador", "Acelerador", "Assistente"]),
    );
    position_archetypes.insert(
        "Meia-Ofensivo".to_string(),
        names(&["Assistente", "Construtor", "Driblador", "Finalizador", "Especialista em Bola Parada"]),
    );
    position_archetypes.insert(
        "Meia-Central".to_string(),
        names(&["Construtor", "Assistente", "Box-to-Box", "Recuperador", "Distribuidor"]),
    );
    position_archetypes.insert(
        "Volante".to_string(),
        names(&["Recuperador", "Construtor", "Defensor", "Distribuidor", "Pressionador"]),
    );
    position_archetypes.insert(
        "Lateral".to_string(),
        names(&["Construtor", "Cruzador", "Acelerador", "Desarme", "Movimentador"]),
    );
    position_archetypes.insert(
        "Zagueiro".to_string(),
        names(&["Defensor", "Dominador Aéreo", "Construtor", "Líder de Defesa", "Lançador"]),
    );
    position_archetypes.insert(
        "Goleiro".to_string(),
        names(&["Shot Stopper", "Sweeper Keeper", "Distribuidor"]),
    );

    let mut archetype_metrics = HashMap::new();
    archetype_metrics.insert(
        "Shot Stopper".to_string(),
        names(&["Defesas, %", "Golos sofridos/90", "Golos expectáveis defendidos por 90´"]),
    );
    archetype_metrics.insert(
        "Sweeper Keeper".to_string(),
        names(&["Saídas/90", "Duelos aéreos/90", "Duelos aéreos ganhos, %"]),
    );
    archetype_metrics.insert(
        "Distribuidor".to_string(),
        names(&[
            "Passes para a frente/90",
            "Passes para a frente certos, %",
            "Passes progressivos/90",
            "Passes progressivos certos, %",
        ]),
    );
    archetype_metrics.insert(
        "Defensor".to_string(),
        names(&[
            "Duelos defensivos/90",
            "Duelos defensivos ganhos, %",
            "Cortes/90",
            "Interseções/90",
            "Faltas/90",
        ]),
    );
    archetype_metrics.insert(
        "Líder de Defesa".to_string(),
        names(&["Ações defensivas com êxito/90", "Duelos aéreos ganhos, %"]),
    );
    archetype_metrics.insert(
        "Construtor".to_string(),
        names(&[
            "Passes/90",
            "Passes certos, %",
            "Passes progressivos/90",
            "Passes progressivos certos, %",
        ]),
    );
    archetype_metrics.insert(
        "Lançador".to_string(),
        names(&[
            "Passes longos/90",
            "Passes longos certos, %",
            "Passes em profundidade/90",
            "Passes em profundidade certos, %",
        ]),
    );
    archetype_metrics.insert(
        "Dominador Aéreo".to_string(),
        names(&["Duelos aéreos/90", "Duelos aéreos ganhos, %", "Golos de cabeça/90"]),
    );
    archetype_metrics.insert(
        "Cruzador".to_string(),
        names(&["Cruzamentos/90", "Cruzamentos certos, %", "Passes para a área de penálti/90"]),
    );
    archetype_metrics.insert(
        "Driblador".to_string(),
        names(&["Dribles/90", "Dribles com sucesso, %", "Acelerações/90"]),
    );
    archetype_metrics.insert(
        "Desarme".to_string(),
        names(&["Duelos defensivos/90", "Duelos defensivos ganhos, %", "Interseções/90"]),
    );
    archetype_metrics.insert(
        "Recuperador".to_string(),
        names(&[
            "Interseções/90",
            "Duelos defensivos/90",
            "Duelos defensivos ganhos, %",
            "Faltas/90",
        ]),
    );
    archetype_metrics.insert(
        "Box-to-Box".to_string(),
        names(&["Duelos/90", "Interseções/90", "Corridas progressivas/90", "Acelerações/90"]),
    );
    archetype_metrics.insert(
        "Assistente".to_string(),
        names(&["Assistências/90", "Assistências esperadas/90", "Passes chave/90"]),
    );
    archetype_metrics.insert(
        "Finalizador".to_string(),
        names(&["Golos/90", "Remates/90", "Remates à baliza, %", "Toques na área/90"]),
    );
    archetype_metrics.insert(
        "Acelerador".to_string(),
        names(&["Corridas progressivas/90", "Acelerações/90"]),
    );
    archetype_metrics.insert(
        "Movimentador".to_string(),
        names(&["Acelerações/90", "Corridas progressivas/90", "Passes recebidos/90"]),
    );
    archetype_metrics.insert(
        "Pressionador".to_string(),
        names(&[
            "Duelos defensivos/90",
            "Duelos defensivos ganhos, %",
            "Acções atacantes com sucesso/90",
        ]),
    );
    // "Especialista em Bola Parada" is selectable for Meia-Ofensivo but has
    // no metric table; it contributes nothing to scoring.

    let mut archetype_weights = HashMap::new();
    archetype_weights.insert(
        "Construtor".to_string(),
        weights(&[
            ("Passes certos, %", 3.0),
            ("Passes progressivos certos, %", 2.5),
            ("Passes progressivos/90", 1.5),
            ("Passes/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Assistente".to_string(),
        weights(&[
            ("Assistências/90", 3.0),
            ("Passes chave/90", 2.5),
            ("Assistências esperadas/90", 2.0),
            ("Passes inteligentes certos, %", 1.5),
        ]),
    );
    archetype_weights.insert(
        "Driblador".to_string(),
        weights(&[
            ("Dribles com sucesso, %", 2.5),
            ("Dribles/90", 1.5),
            ("Acelerações/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Finalizador".to_string(),
        weights(&[
            ("Golos/90", 3.0),
            ("Toques na área/90", 2.0),
            ("Remates à baliza, %", 1.5),
            ("Remates/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Defensor".to_string(),
        weights(&[
            ("Duelos defensivos ganhos, %", 3.0),
            ("Interseções/90", 2.5),
            ("Cortes/90", 2.0),
            ("Duelos defensivos/90", 1.0),
            ("Faltas/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Líder de Defesa".to_string(),
        weights(&[
            ("Duelos aéreos ganhos, %", 3.0),
            ("Ações defensivas com êxito/90", 2.0),
        ]),
    );
    archetype_weights.insert(
        "Lançador".to_string(),
        weights(&[
            ("Passes longos certos, %", 3.0),
            ("Passes em profundidade certos, %", 2.5),
            ("Passes longos/90", 1.5),
            ("Passes em profundidade/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Cruzador".to_string(),
        weights(&[
            ("Cruzamentos certos, %", 3.0),
            ("Passes para a área de penálti/90", 2.0),
            ("Cruzamentos/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Desarme".to_string(),
        weights(&[
            ("Duelos defensivos ganhos, %", 3.0),
            ("Interseções/90", 2.0),
            ("Duelos defensivos/90", 1.5),
        ]),
    );
    archetype_weights.insert(
        "Recuperador".to_string(),
        weights(&[
            ("Duelos defensivos ganhos, %", 3.0),
            ("Interseções/90", 2.5),
            ("Duelos defensivos/90", 1.5),
            ("Faltas/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Box-to-Box".to_string(),
        weights(&[
            ("Corridas progressivas/90", 2.5),
            ("Interseções/90", 2.0),
            ("Duelos/90", 1.5),
            ("Acelerações/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Distribuidor".to_string(),
        weights(&[
            ("Passes certos, %", 3.0),
            ("Passes longos certos, %", 2.0),
            ("Passes para trás recebidos pelo guarda-redes/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Acelerador".to_string(),
        weights(&[("Corridas progressivas/90", 2.5), ("Acelerações/90", 1.5)]),
    );
    archetype_weights.insert(
        "Pressionador".to_string(),
        weights(&[
            ("Duelos defensivos ganhos, %", 3.0),
            ("Acções atacantes com sucesso/90", 2.0),
            ("Duelos defensivos/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Dominador Aéreo".to_string(),
        weights(&[
            ("Golos de cabeça/90", 3.0),
            ("Duelos aéreos ganhos, %", 2.0),
            ("Duelos aéreos/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Movimentador".to_string(),
        weights(&[
            ("Passes recebidos/90", 2.5),
            ("Corridas progressivas/90", 1.5),
            ("Acelerações/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Shot Stopper".to_string(),
        weights(&[
            ("Defesas, %", 3.0),
            ("Golos expectáveis defendidos por 90´", 2.5),
            ("Golos sofridos/90", 1.0),
        ]),
    );
    archetype_weights.insert(
        "Sweeper Keeper".to_string(),
        weights(&[
            ("Saídas/90", 2.0),
            ("Duelos aéreos ganhos, %", 3.0),
            ("Duelos aéreos/90", 1.0),
        ]),
    );

    let mut position_kpis = HashMap::new();
    position_kpis.insert(
        "Goleiro".to_string(),
        kpis(&[
            (
                "Defendendo",
                &[
                    "Defesas, %",
                    "Golos sofridos/90",
                    "Golos sofridos esperados/90",
                    "Golos expectáveis defendidos por 90´",
                    "Remates sofridos/90",
                    "Jogos sem sofrer golos",
                ],
            ),
            (
                "Posse",
                &[
                    "Passes certos, %",
                    "Passes longos/90",
                    "Passes longos certos, %",
                    "Passes para trás recebidos pelo guarda-redes/90",
                    "Saídas/90",
                ],
            ),
            ("Atacando", &[]),
        ]),
    );
    position_kpis.insert(
        "Zagueiro".to_string(),
        kpis(&[
            (
                "Defendendo",
                &[
                    "Ações defensivas com êxito/90",
                    "Duelos defensivos/90",
                    "Duelos defensivos ganhos, %",
                    "Cortes/90",
                    "Cortes de carrinho ajust. à posse",
                    "Remates intercetados/90",
                    "Interseções/90",
                    "Interceções ajust. à posse",
                    "Duelos aéreos/90",
                    "Duelos aéreos ganhos, %",
                ],
            ),
            (
                "Posse",
                &[
                    "Passes/90",
                    "Passes certos, %",
                    "Passes para a frente/90",
                    "Passes para a frente certos, %",
                    "Passes laterais/90",
                    "Passes laterais certos, %",
                    "Passes progressivos/90",
                    "Passes progressivos certos, %",
                ],
            ),
            ("Atacando", &["Golos", "Golos de cabeça/90", "Assistências/90"]),
        ]),
    );
    position_kpis.insert(
        "Lateral".to_string(),
        kpis(&[
            (
                "Defendendo",
                &[
                    "Duelos defensivos/90",
                    "Duelos defensivos ganhos, %",
                    "Interseções/90",
                    "Cortes/90",
                ],
            ),
            (
                "Posse",
                &[
                    "Passes/90",
                    "Passes certos, %",
                    "Passes progressivos/90",
                    "Passes progressivos certos, %",
                    "Corridas progressivas/90",
                ],
            ),
            (
                "Atacando",
                &[
                    "Assistências/90",
                    "Assistências esperadas/90",
                    "Cruzamentos/90",
                    "Cruzamentos certos, %",
                    "Cruzamentos do flanco esquerdo/90",
                    "Cruzamentos precisos do flanco esquerdo, %",
                    "Cruzamentos do flanco direito/90",
                    "Cruzamentos precisos do flanco direito, %",
                    "Acelerações/90",
                ],
            ),
        ]),
    );
    position_kpis.insert(
        "Volante".to_string(),
        kpis(&[
            (
                "Defendendo",
                &[
                    "Duelos defensivos/90",
                    "Duelos defensivos ganhos, %",
                    "Interseções/90",
                    "Faltas/90",
                ],
            ),
            (
                "Posse",
                &[
                    "Passes/90",
                    "Passes certos, %",
                    "Passes curtos / médios /90",
                    "Passes curtos / médios precisos, %",
                    "Passes para a frente/90",
                    "Passes para a frente certos, %",
                    "Passes progressivos/90",
                    "Passes progressivos certos, %",
                ],
            ),
            (
                "Atacando",
                &[
                    "Assistências/90",
                    "Assistências esperadas/90",
                    "Passes chave/90",
                    "Passes inteligentes/90",
                ],
            ),
        ]),
    );
    position_kpis.insert(
        "Meia-Ofensivo".to_string(),
        kpis(&[
            ("Defendendo", &["Duelos/90", "Duelos ganhos, %"]),
            (
                "Posse",
                &[
                    "Passes/90",
                    "Passes certos, %",
                    "Passes chave/90",
                    "Passes para terço final/90",
                    "Passes certos para terço final, %",
                    "Passes para a área de penálti/90",
                    "Passes precisos para a área de penálti, %",
                    "Passes inteligentes/90",
                ],
            ),
            (
                "Atacando",
                &[
                    "Golos/90",
                    "Golos esperados/90",
                    "Assistências/90",
                    "Assistências esperadas/90",
                    "Dribles/90",
                    "Dribles com sucesso, %",
                    "Toques na área/90",
                ],
            ),
        ]),
    );
    position_kpis.insert(
        "Extremo".to_string(),
        kpis(&[
            ("Defendendo", &["Duelos ofensivos/90", "Duelos ofensivos ganhos, %"]),
            (
                "Posse",
                &[
                    "Passes/90",
                    "Passes certos, %",
                    "Passes progressivos/90",
                    "Passes progressivos certos, %",
                    "Corridas progressivas/90",
                    "Acelerações/90",
                ],
            ),
            (
                "Atacando",
                &[
                    "Golos/90",
                    "Golos esperados/90",
                    "Assistências/90",
                    "Assistências esperadas/90",
                    "Cruzamentos/90",
                    "Cruzamentos certos, %",
                    "Dribles/90",
                    "Dribles com sucesso, %",
                    "Toques na área/90",
                ],
            ),
        ]),
    );
    position_kpis.insert(
        "Centroavante".to_string(),
        kpis(&[
            (
                "Defendendo",
                &[
                    "Ações defensivas com êxito/90",
                    "Duelos aéreos/90",
                    "Duelos aéreos ganhos, %",
                ],
            ),
            (
                "Posse",
                &[
                    "Passes/90",
                    "Passes certos, %",
                    "Passes recebidos/90",
                    "Passes longos recebidos/90",
                ],
            ),
            (
                "Atacando",
                &[
                    "Golos/90",
                    "Golos sem ser por penálti/90",
                    "Golos esperados/90",
                    "Golos de cabeça/90",
                    "Remates/90",
                    "Remates à baliza, %",
                    "Toques na área/90",
                    "Acelerações/90",
                ],
            ),
        ]),
    );
    // Meia-Central has no radar definition; its queries rank without one.

    let lower_is_better: HashSet<String> =
        ["Golos sofridos/90", "Faltas/90"].iter().map(|s| s.to_string()).collect();

    MetricCatalog {
        position_archetypes,
        archetype_metrics,
        archetype_weights,
        position_kpis,
        lower_is_better,
    }
}

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

pub const COL_PLAYER: &str = "Jogador";
pub const COL_TEAM: &str = "Equipa";
pub const COL_AGE: &str = "Idade";
pub const COL_POSITION: &str = "Posição";
pub const COL_MINUTES: &str = "Minutos jogados:";

/// (player, team) is the only key that addresses a player unambiguously;
/// names alone collide across teams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerKey {
    pub player: String,
    pub team: String,
}

impl PlayerKey {
    pub fn new(player: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            team: team.into(),
        }
    }

    pub fn label(&self) -> String {
        if self.team.is_empty() {
            self.player.clone()
        } else {
            format!("{} ({})", self.player, self.team)
        }
    }
}

/// One cleaned dataset row: identity fields plus a sparse metric map.
/// Identity and metric namespaces are disjoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player: String,
    pub team: String,
    pub age: Option<u32>,
    pub position: Option<String>,
    pub minutes: Option<u32>,
    pub metrics: HashMap<String, f64>,
}

impl PlayerRecord {
    pub fn key(&self) -> PlayerKey {
        PlayerKey::new(self.player.clone(), self.team.clone())
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn is_goalkeeper(&self) -> bool {
        let Some(position) = &self.position else {
            return false;
        };
        let p = position.to_lowercase();
        p.contains("goleiro") || p.contains("guarda-redes") || p.contains("goalkeeper") || p == "gk"
    }
}

/// Which identity columns the source file carried. Similarity mode needs
/// all three; scoring only needs player/team for display.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IdentityColumns {
    pub player: bool,
    pub team: bool,
    pub position: bool,
}

/// Inclusive integer bounds collected from the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationFilter {
    pub age_min: u32,
    pub age_max: u32,
    pub minutes_min: u32,
    pub minutes_max: u32,
}

impl PopulationFilter {
    pub fn matches(&self, record: &PlayerRecord) -> bool {
        let Some(age) = record.age else { return false };
        let Some(minutes) = record.minutes else { return false };
        age >= self.age_min
            && age <= self.age_max
            && minutes >= self.minutes_min
            && minutes <= self.minutes_max
    }
}

/// Schema-aware wrapper around the cleaned rows. Rows keep file order;
/// duplicate (player, team) keys are dropped, first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    players: Vec<PlayerRecord>,
    columns: HashSet<String>,
    identity: IdentityColumns,
}

impl Dataset {
    pub fn new(records: Vec<PlayerRecord>, identity: IdentityColumns) -> Self {
        let mut seen: HashSet<PlayerKey> = HashSet::new();
        let mut players = Vec::with_capacity(records.len());
        let mut columns = HashSet::new();
        for record in records {
            if !seen.insert(record.key()) {
                continue;
            }
            for name in record.metrics.keys() {
                columns.insert(name.clone());
            }
            players.push(record);
        }
        Self {
            players,
            columns,
            identity,
        }
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn has_metric(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn identity(&self) -> IdentityColumns {
        self.identity
    }

    /// Similarity search needs the full identity triple from the file.
    pub fn supports_similarity(&self) -> bool {
        self.identity.player && self.identity.team && self.identity.position
    }

    pub fn get(&self, key: &PlayerKey) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| &p.key() == key)
    }

    /// Observed (min, max) age over rows that have one.
    pub fn age_bounds(&self) -> Option<(u32, u32)> {
        bounds(self.players.iter().filter_map(|p| p.age))
    }

    /// Observed (min, max) minutes over rows that have them.
    pub fn minutes_bounds(&self) -> Option<(u32, u32)> {
        bounds(self.players.iter().filter_map(|p| p.minutes))
    }

    pub fn default_filter(&self) -> Option<PopulationFilter> {
        let (age_min, age_max) = self.age_bounds()?;
        let (minutes_min, minutes_max) = self.minutes_bounds()?;
        Some(PopulationFilter {
            age_min,
            age_max,
            minutes_min,
            minutes_max,
        })
    }

    /// Immutable snapshot of the filtered population, in file order.
    /// Rows without an age or minutes value never pass the filter.
    pub fn filter(&self, filter: &PopulationFilter) -> Vec<&PlayerRecord> {
        self.players.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Candidate pool for similarity: same player type as the reference,
    /// reference excluded, filter bounds applied.
    pub fn candidate_pool(
        &self,
        reference: &PlayerRecord,
        filter: &PopulationFilter,
    ) -> Vec<&PlayerRecord> {
        let reference_key = reference.key();
        let goalkeeper = reference.is_goalkeeper();
        self.players
            .iter()
            .filter(|p| p.key() != reference_key)
            .filter(|p| p.is_goalkeeper() == goalkeeper)
            .filter(|p| filter.matches(p))
            .collect()
    }
}

fn bounds(values: impl Iterator<Item = u32>) -> Option<(u32, u32)> {
    let mut out: Option<(u32, u32)> = None;
    for v in values {
        out = Some(match out {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    out
}

use std::collections::{HashSet, VecDeque};

use crate::catalog::{MetricCatalog, POSITIONS};
use crate::dataset::{Dataset, PopulationFilter};
use crate::query::{
    QueryWarning, ScoutParams, ScoutReport, SimilarityParams, SimilarityReport, run_scout_query,
    run_similarity_query, top_k_from_env,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Ranking,
    Similarity,
}

/// Which filter bound the setup screen currently adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    AgeMin,
    AgeMax,
    MinutesMin,
    MinutesMax,
}

impl SetupField {
    pub fn next(self) -> Self {
        match self {
            SetupField::AgeMin => SetupField::AgeMax,
            SetupField::AgeMax => SetupField::MinutesMin,
            SetupField::MinutesMin => SetupField::MinutesMax,
            SetupField::MinutesMax => SetupField::AgeMin,
        }
    }
}

const MINUTES_STEP: u32 = 90;

pub struct AppState {
    pub screen: Screen,
    pub dataset: Dataset,
    pub dataset_label: String,
    pub filter: PopulationFilter,
    pub setup_field: SetupField,
    pub position_idx: usize,
    pub archetype_cursor: usize,
    pub selected_archetypes: HashSet<String>,
    pub report: Option<ScoutReport>,
    pub report_warning: Option<String>,
    pub ranking_selected: usize,
    pub similarity: Option<SimilarityReport>,
    pub similarity_warning: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(dataset: Dataset, dataset_label: String) -> Self {
        let filter = dataset.default_filter().unwrap_or(PopulationFilter {
            age_min: 0,
            age_max: 99,
            minutes_min: 0,
            minutes_max: 99_999,
        });
        Self {
            screen: Screen::Setup,
            dataset,
            dataset_label,
            filter,
            setup_field: SetupField::AgeMin,
            position_idx: 0,
            archetype_cursor: 0,
            selected_archetypes: HashSet::new(),
            report: None,
            report_warning: None,
            ranking_selected: 0,
            similarity: None,
            similarity_warning: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn position(&self) -> &'static str {
        POSITIONS[self.position_idx % POSITIONS.len()]
    }

    /// Changing position invalidates the archetype selection; archetypes
    /// are only valid for the position they belong to.
    pub fn cycle_position(&mut self, forward: bool) {
        let n = POSITIONS.len();
        self.position_idx = if forward {
            (self.position_idx + 1) % n
        } else {
            (self.position_idx + n - 1) % n
        };
        self.selected_archetypes.clear();
        self.archetype_cursor = 0;
    }

    pub fn set_position(&mut self, position: &str) {
        if let Some(idx) = POSITIONS.iter().position(|p| *p == position) {
            self.position_idx = idx;
            self.selected_archetypes.clear();
            self.archetype_cursor = 0;
        }
    }

    pub fn archetype_names(&self, catalog: &MetricCatalog) -> Vec<String> {
        catalog.archetypes_for(self.position()).to_vec()
    }

    pub fn move_archetype_cursor(&mut self, catalog: &MetricCatalog, down: bool) {
        let n = self.archetype_names(catalog).len();
        if n == 0 {
            return;
        }
        self.archetype_cursor = if down {
            (self.archetype_cursor + 1) % n
        } else {
            (self.archetype_cursor + n - 1) % n
        };
    }

    pub fn toggle_archetype(&mut self, catalog: &MetricCatalog) {
        let names = self.archetype_names(catalog);
        let Some(name) = names.get(self.archetype_cursor) else {
            return;
        };
        if !self.selected_archetypes.remove(name) {
            self.selected_archetypes.insert(name.clone());
        }
    }

    /// Selected archetypes in catalog order, the order weights and
    /// signature metrics are resolved in.
    pub fn selection(&self, catalog: &MetricCatalog) -> Vec<String> {
        self.archetype_names(catalog)
            .into_iter()
            .filter(|name| self.selected_archetypes.contains(name))
            .collect()
    }

    pub fn adjust_filter(&mut self, up: bool) {
        let (age_lo, age_hi) = self.dataset.age_bounds().unwrap_or((0, 99));
        let (min_lo, min_hi) = self.dataset.minutes_bounds().unwrap_or((0, 99_999));
        let f = &mut self.filter;
        match self.setup_field {
            SetupField::AgeMin => {
                f.age_min = step_u32(f.age_min, 1, up, age_lo, f.age_max);
            }
            SetupField::AgeMax => {
                f.age_max = step_u32(f.age_max, 1, up, f.age_min, age_hi);
            }
            SetupField::MinutesMin => {
                f.minutes_min = step_u32(f.minutes_min, MINUTES_STEP, up, min_lo, f.minutes_max);
            }
            SetupField::MinutesMax => {
                f.minutes_max = step_u32(f.minutes_max, MINUTES_STEP, up, f.minutes_min, min_hi);
            }
        }
    }

    /// One full recomputation; prior results are only replaced on success,
    /// a warning leaves them untouched.
    pub fn run_analysis(&mut self, catalog: &MetricCatalog) {
        let archetypes = self.selection(catalog);
        let params = ScoutParams {
            position: self.position().to_string(),
            archetypes,
            filter: self.filter,
        };
        match run_scout_query(&self.dataset, catalog, &params) {
            Ok(report) => {
                self.push_log(format!(
                    "[INFO] Ranked {} players over {} metrics",
                    report.rows.len(),
                    report.metrics.len()
                ));
                self.report = Some(report);
                self.report_warning = None;
                self.ranking_selected = 0;
                self.screen = Screen::Ranking;
            }
            Err(warning) => {
                self.push_log(format!("[WARN] {warning}"));
                self.report_warning = Some(warning.to_string());
            }
        }
    }

    pub fn ranking_len(&self) -> usize {
        self.report.as_ref().map(|r| r.rows.len()).unwrap_or(0)
    }

    pub fn select_next(&mut self) {
        let n = self.ranking_len();
        if n > 0 {
            self.ranking_selected = (self.ranking_selected + 1) % n;
        }
    }

    pub fn select_prev(&mut self) {
        let n = self.ranking_len();
        if n > 0 {
            self.ranking_selected = (self.ranking_selected + n - 1) % n;
        }
    }

    /// Similarity search seeded from the highlighted ranking row.
    pub fn run_similarity(&mut self, catalog: &MetricCatalog) {
        let Some(reference) = self
            .report
            .as_ref()
            .and_then(|r| r.rows.get(self.ranking_selected))
            .map(|row| row.key.clone())
        else {
            self.push_log("[INFO] No ranked player selected for similarity");
            return;
        };
        let params = SimilarityParams {
            reference: reference.clone(),
            position: self.position().to_string(),
            filter: self.filter,
            top_k: top_k_from_env(),
        };
        match run_similarity_query(&self.dataset, catalog, &params) {
            Ok(report) => {
                if report.rows.is_empty() {
                    self.push_log(format!(
                        "[INFO] No comparable players for {}",
                        reference.label()
                    ));
                } else {
                    self.push_log(format!(
                        "[INFO] {} neighbors for {}",
                        report.rows.len(),
                        reference.label()
                    ));
                }
                self.similarity = Some(report);
                self.similarity_warning = None;
                self.screen = Screen::Similarity;
            }
            Err(warning) => {
                self.push_log(format!("[WARN] {warning}"));
                self.similarity_warning = Some(warning.to_string());
                if matches!(warning, QueryWarning::MissingIdentityColumns) {
                    // Similarity stays disabled for this dataset; scoring
                    // is unaffected.
                    self.screen = Screen::Ranking;
                }
            }
        }
    }
}

fn step_u32(value: u32, step: u32, up: bool, lo: u32, hi: u32) -> u32 {
    let next = if up {
        value.saturating_add(step)
    } else {
        value.saturating_sub(step)
    };
    next.clamp(lo, hi)
}

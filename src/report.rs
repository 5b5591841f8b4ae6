use chrono::NaiveDate;
use log::warn;

use crate::classify::Classification;
use crate::config::{ModelConfig, STANDARD_RUN_HOURS};

/// Placeholder shown for cells without a classified value
pub const MISSING: &str = "---";

/// Processing state of one (run hour, model) cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellState {
    #[default]
    Unfetched,
    Classified(Classification),
    Unclassifiable,
    FetchFailed,
}

impl CellState {
    pub fn classification(&self) -> Option<&Classification> {
        match self {
            CellState::Classified(c) => Some(c),
            _ => None,
        }
    }
}

/// Maximum precipitation per model (columns) and run hour (rows) for the
/// runs of a single day
#[derive(Debug, Clone)]
pub struct ReportTable {
    run_date: NaiveDate,
    run_hours: Vec<u32>,
    models: Vec<ModelConfig>,
    cells: Vec<Vec<CellState>>,
}

impl ReportTable {
    pub fn new(run_date: NaiveDate, models: &[ModelConfig]) -> Self {
        let run_hours = STANDARD_RUN_HOURS.to_vec();
        let cells = vec![vec![CellState::Unfetched; models.len()]; run_hours.len()];
        Self {
            run_date,
            run_hours,
            models: models.to_vec(),
            cells,
        }
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    pub fn run_hours(&self) -> &[u32] {
        &self.run_hours
    }

    pub fn models(&self) -> &[ModelConfig] {
        &self.models
    }

    pub fn model_labels(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.label.as_str()).collect()
    }

    fn position(&self, run_hour: u32, model: &str) -> Option<(usize, usize)> {
        let row = self.run_hours.iter().position(|h| *h == run_hour)?;
        let col = self.models.iter().position(|m| m.label == model)?;
        Some((row, col))
    }

    /// Store the outcome for a cell. Cells for unknown models, or for run
    /// hours the model does not publish, are left untouched.
    pub fn record(&mut self, run_hour: u32, model: &str, state: CellState) -> bool {
        let Some((row, col)) = self.position(run_hour, model) else {
            warn!("report has no cell for model {} at {:02} UTC", model, run_hour);
            return false;
        };
        if !self.models[col].publishes_at(run_hour) {
            warn!("model {} does not run at {:02} UTC, ignoring", model, run_hour);
            return false;
        }
        self.cells[row][col] = state;
        true
    }

    pub fn cell(&self, run_hour: u32, model: &str) -> Option<&CellState> {
        self.position(run_hour, model)
            .map(|(row, col)| &self.cells[row][col])
    }

    /// Labels per cell, `MISSING` where nothing was classified
    pub fn display_grid(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell.classification() {
                        Some(c) => c.display_value.clone(),
                        None => MISSING.to_string(),
                    })
                    .collect()
            })
            .collect()
    }

    /// Representative values per cell, same shape as `display_grid`
    pub fn value_grid(&self) -> Vec<Vec<Option<f64>>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.classification().map(|c| c.representative_value))
                    .collect()
            })
            .collect()
    }

    pub fn classified_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.classification().is_some())
            .count()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum::<usize>() - self.classified_count()
    }
}

//! Reference cases from the legacy system and the acceptance score computed against them.

mod parser;

use crate::engine::{Amount, ReimbursementEngine, TripInput, TripRecord};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Absolute error below which a case counts as reproduced exactly.
pub const EXACT_TOLERANCE: f64 = 0.01;
/// Absolute error below which a case counts as close.
pub const CLOSE_TOLERANCE: f64 = 1.00;

/// One historical trip and the amount the legacy system paid for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCase {
    pub input: TripRecord,
    pub expected_output: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    cases: Vec<ReferenceCase>,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read reference cases: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid reference JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid reference CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl ReferenceDataset {
    pub fn new(cases: Vec<ReferenceCase>) -> Self {
        Self { cases }
    }

    /// Loads a dataset, picking CSV for `.csv` files and JSON for everything else.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Self::from_csv_reader(file)
        } else {
            Self::from_json_reader(file)
        }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        Ok(Self::new(parser::parse_json(reader)?))
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        Ok(Self::new(parser::parse_csv(reader)?))
    }

    pub fn cases(&self) -> &[ReferenceCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Runs every case through `engine` and summarises how closely it reproduces the legacy output.
    /// `worst` bounds how many of the largest misses are kept for inspection.
    pub fn score(&self, engine: &ReimbursementEngine, worst: usize) -> EvaluationSummary {
        let mut trips = Vec::with_capacity(self.cases.len());
        let mut accepted = Vec::with_capacity(self.cases.len());
        let mut rejected = Vec::new();

        for (index, case) in self.cases.iter().enumerate() {
            match TripInput::try_from(case.input) {
                Ok(trip) => {
                    trips.push(trip);
                    accepted.push(index);
                }
                Err(err) => rejected.push(RejectedCase {
                    index,
                    input: case.input,
                    reason: err.to_string(),
                }),
            }
        }

        let results = engine.calculate_batch(&trips);
        let mut outcomes: Vec<CaseOutcome> = accepted
            .into_iter()
            .zip(results)
            .map(|(index, result)| {
                let case = &self.cases[index];
                CaseOutcome {
                    index,
                    input: case.input,
                    expected: case.expected_output,
                    actual: result.amount,
                    error: (result.amount.as_f64() - case.expected_output).abs(),
                }
            })
            .collect();

        let evaluated = outcomes.len();
        let exact_matches = outcomes
            .iter()
            .filter(|outcome| outcome.error < EXACT_TOLERANCE)
            .count();
        let close_matches = outcomes
            .iter()
            .filter(|outcome| outcome.error < CLOSE_TOLERANCE)
            .count();
        let total_error: f64 = outcomes.iter().map(|outcome| outcome.error).sum();
        let average_error = if evaluated == 0 {
            0.0
        } else {
            total_error / evaluated as f64
        };
        let max_error = outcomes
            .iter()
            .map(|outcome| outcome.error)
            .fold(0.0, f64::max);
        let misses = self.cases.len() - exact_matches;
        let score = average_error * 100.0 + misses as f64 * 0.1;

        outcomes.sort_by(|a, b| b.error.total_cmp(&a.error).then(a.index.cmp(&b.index)));
        outcomes.truncate(worst);

        info!(
            cases = self.cases.len(),
            evaluated,
            exact_matches,
            close_matches,
            average_error,
            score,
            "reference dataset scored"
        );

        EvaluationSummary {
            schedule_version: engine.schedule_version().to_string(),
            cases: self.cases.len(),
            evaluated,
            exact_matches,
            close_matches,
            average_error,
            max_error,
            score,
            worst_cases: outcomes,
            rejected,
        }
    }
}

/// Aggregate fit of an engine against a reference dataset. Lower `score` is better.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub schedule_version: String,
    pub cases: usize,
    pub evaluated: usize,
    pub exact_matches: usize,
    pub close_matches: usize,
    pub average_error: f64,
    pub max_error: f64,
    pub score: f64,
    pub worst_cases: Vec<CaseOutcome>,
    pub rejected: Vec<RejectedCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    pub index: usize,
    pub input: TripRecord,
    pub expected: f64,
    pub actual: Amount,
    pub error: f64,
}

/// Case whose inputs failed validation; it counts as a miss.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedCase {
    pub index: usize,
    pub input: TripRecord,
    pub reason: String,
}

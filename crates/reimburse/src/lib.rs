//! Deterministic travel reimbursement engine.
//!
//! `(duration_days, miles_traveled, total_receipts)` goes in, a rounded amount comes out.
//! The per-diem, mileage and receipts contributions are computed by independent tiered
//! models, combined, passed through a table-driven adjustment stage and rounded to cents.
//! Every constant lives in a versioned [`schedule::RateSchedule`].

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod telemetry;

pub use dataset::{EvaluationSummary, ReferenceCase, ReferenceDataset};
pub use engine::{Amount, ReimbursementEngine, ReimbursementResult, TripInput, TripInputError};
pub use schedule::{RateSchedule, ScheduleError};

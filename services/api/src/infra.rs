use metrics_exporter_prometheus::PrometheusHandle;
use reimburse::error::AppError;
use reimburse::{RateSchedule, ReimbursementEngine};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Engine plus the schedule it was built from, shared across request handlers.
pub(crate) struct EngineState {
    pub(crate) engine: ReimbursementEngine,
    pub(crate) schedule: RateSchedule,
}

impl EngineState {
    pub(crate) fn load(rates: Option<&Path>) -> Result<Self, AppError> {
        let schedule = load_schedule(rates)?;
        let engine = ReimbursementEngine::new(&schedule)?;
        Ok(Self { engine, schedule })
    }

    pub(crate) fn standard() -> Self {
        Self {
            engine: ReimbursementEngine::standard(),
            schedule: RateSchedule::standard(),
        }
    }
}

/// Reads the schedule at `rates`, falling back to the compiled-in standard rates.
pub(crate) fn load_schedule(rates: Option<&Path>) -> Result<RateSchedule, AppError> {
    match rates {
        Some(path) => {
            let schedule = RateSchedule::from_path(path)?;
            info!(
                path = %path.display(),
                version = %schedule.version,
                effective_on = %schedule.effective_on,
                "loaded rate schedule"
            );
            Ok(schedule)
        }
        None => Ok(RateSchedule::standard()),
    }
}

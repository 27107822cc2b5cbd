use crate::infra::{load_schedule, EngineState};
use clap::Args;
use reimburse::config::AppConfig;
use reimburse::dataset::CaseOutcome;
use reimburse::error::AppError;
use reimburse::schedule::Effect;
use reimburse::telemetry;
use reimburse::{EvaluationSummary, ReferenceDataset, ReimbursementResult, TripInput};
use serde_json::json;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// Trip length in whole days
    #[arg(allow_negative_numbers = true)]
    pub(crate) duration_days: i64,
    /// Miles driven over the whole trip
    #[arg(allow_negative_numbers = true)]
    pub(crate) miles_traveled: f64,
    /// Total of submitted receipts in dollars
    #[arg(allow_negative_numbers = true)]
    pub(crate) total_receipts: f64,
    /// Show every component and adjustment behind the amount
    #[arg(long)]
    pub(crate) breakdown: bool,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
    /// Rate schedule JSON to use instead of the configured one
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Reference cases as JSON (`[{"input": {...}, "expected_output": ...}]`) or CSV
    #[arg(long)]
    pub(crate) cases: PathBuf,
    /// Rate schedule JSON to score instead of the configured one
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
    /// Number of worst cases to list
    #[arg(long, default_value_t = 10)]
    pub(crate) worst: usize,
    /// Print the summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RatesArgs {
    /// Rate schedule JSON to print instead of the configured one
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
}

pub(crate) fn run_calculate(args: CalculateArgs) -> Result<(), AppError> {
    let state = prepare(args.rates)?;
    let trip = TripInput::new(args.duration_days, args.miles_traveled, args.total_receipts)?;
    let result = state.engine.calculate(&trip);

    let output = if args.json {
        let mut value = json!({
            "reimbursement": result.amount,
            "schedule_version": state.engine.schedule_version(),
        });
        if args.breakdown {
            value["breakdown"] =
                serde_json::to_value(&result.breakdown).map_err(std::io::Error::from)?;
        }
        serde_json::to_string_pretty(&value).map_err(std::io::Error::from)?
    } else if args.breakdown {
        render_breakdown(&result, state.engine.schedule_version())
    } else {
        result.amount.to_string()
    };

    println!("{output}");
    Ok(())
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let state = prepare(args.rates)?;
    let dataset = ReferenceDataset::from_path(&args.cases)?;
    let summary = dataset.score(&state.engine, args.worst);

    let output = if args.json {
        serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?
    } else {
        render_summary(&summary)
    };

    println!("{output}");
    Ok(())
}

pub(crate) fn run_rates(args: RatesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let schedule = load_schedule(args.rates.or(config.engine.rates_path).as_deref())?;

    println!(
        "{}",
        serde_json::to_string_pretty(&schedule).map_err(std::io::Error::from)?
    );
    Ok(())
}

/// Loads configuration and logging, then builds the engine. `--rates` beats `REIMBURSE_RATES`.
fn prepare(rates: Option<PathBuf>) -> Result<EngineState, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    EngineState::load(rates.or(config.engine.rates_path).as_deref())
}

fn render_breakdown(result: &ReimbursementResult, schedule_version: &str) -> String {
    let breakdown = &result.breakdown;
    let mut out = String::new();

    let _ = writeln!(out, "Reimbursement: {} (schedule {schedule_version})", result.amount);
    let _ = writeln!(out, "  per diem   {:>10.2}", breakdown.per_diem);
    let _ = writeln!(out, "  mileage    {:>10.2}", breakdown.mileage);
    let _ = write!(
        out,
        "  receipts   {:>10.2} ({:?}",
        breakdown.receipts, breakdown.receipts_regime
    );
    if breakdown.sparse_receipts_penalty {
        out.push_str(", sparse receipts penalty");
    }
    out.push_str(")\n");
    let _ = writeln!(out, "  subtotal   {:>10.2}", breakdown.subtotal);

    if breakdown.adjustments.is_empty() {
        out.push_str("  no adjustments applied\n");
    } else {
        out.push_str("  adjustments\n");
        for adjustment in &breakdown.adjustments {
            let effect = match adjustment.effect {
                Effect::Multiply(factor) => format!("x{factor}"),
                Effect::Add(amount) => format!("{amount:+}"),
            };
            let _ = writeln!(
                out,
                "  - {}/{}: {effect} ({:.2} -> {:.2})",
                adjustment.group, adjustment.rule, adjustment.before, adjustment.after
            );
        }
    }
    let _ = write!(out, "  unrounded  {:>10.4}", breakdown.unrounded);

    out
}

fn render_summary(summary: &EvaluationSummary) -> String {
    let mut out = String::new();
    let percent = |count: usize| {
        if summary.evaluated == 0 {
            0.0
        } else {
            count as f64 * 100.0 / summary.evaluated as f64
        }
    };

    let _ = writeln!(
        out,
        "Scored {} of {} cases against schedule {}",
        summary.evaluated, summary.cases, summary.schedule_version
    );
    let _ = writeln!(
        out,
        "  exact matches (within $0.01): {} ({:.1}%)",
        summary.exact_matches,
        percent(summary.exact_matches)
    );
    let _ = writeln!(
        out,
        "  close matches (within $1.00): {} ({:.1}%)",
        summary.close_matches,
        percent(summary.close_matches)
    );
    let _ = writeln!(out, "  average error: ${:.2}", summary.average_error);
    let _ = writeln!(out, "  maximum error: ${:.2}", summary.max_error);
    let _ = write!(out, "  score: {:.2} (lower is better)", summary.score);

    if !summary.worst_cases.is_empty() {
        out.push_str("\nWorst cases");
        for case in &summary.worst_cases {
            out.push('\n');
            out.push_str(&render_case(case));
        }
    }

    if !summary.rejected.is_empty() {
        let _ = write!(out, "\nRejected {} cases", summary.rejected.len());
        for rejected in &summary.rejected {
            let _ = write!(out, "\n  case {}: {}", rejected.index + 1, rejected.reason);
        }
    }

    out
}

fn render_case(case: &CaseOutcome) -> String {
    format!(
        "  case {}: {} days, {} miles, ${:.2} receipts: expected ${:.2}, got ${} (error ${:.2})",
        case.index + 1,
        case.input.trip_duration_days,
        case.input.miles_traveled,
        case.input.total_receipts_amount,
        case.expected,
        case.actual,
        case.error
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reimburse::ReimbursementEngine;
    use std::io::Cursor;

    fn calculate(days: i64, miles: f64, receipts: f64) -> ReimbursementResult {
        let trip = TripInput::new(days, miles, receipts).expect("valid trip");
        ReimbursementEngine::standard().calculate(&trip)
    }

    #[test]
    fn breakdown_lists_components_and_adjustments() {
        let rendered = render_breakdown(&calculate(3, 1000.0, 0.0), "legacy-2024.1");

        assert!(rendered.starts_with("Reimbursement: 675.50 (schedule legacy-2024.1)"));
        assert!(rendered.contains("mileage        390.50"));
        assert!(rendered.contains("(None)"));
    }

    #[test]
    fn breakdown_flags_tiny_receipts() {
        let rendered = render_breakdown(&calculate(1, 181.0, 3.6), "legacy-2024.1");
        assert!(rendered.contains("(Tiny"));
    }

    #[test]
    fn summary_reports_matches_and_worst_cases() {
        let csv = "trip_duration_days,miles_traveled,total_receipts_amount,expected_output\n\
                   1,0,0,170.00\n\
                   5,0,0,500.00\n\
                   0,10,10,50.00\n";
        let dataset = ReferenceDataset::from_csv_reader(Cursor::new(csv)).expect("csv parses");
        let summary = dataset.score(&ReimbursementEngine::standard(), 5);

        let rendered = render_summary(&summary);
        assert!(rendered.starts_with("Scored 2 of 3 cases against schedule legacy-2024.1"));
        assert!(rendered.contains("exact matches (within $0.01): 1 (50.0%)"));
        assert!(rendered.contains("expected $500.00, got $550.00 (error $50.00)"));
        assert!(rendered.contains("Rejected 1 cases"));
        assert!(rendered.contains("case 3:"));
    }
}

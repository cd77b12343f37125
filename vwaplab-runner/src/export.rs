//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for a finished run:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: per-session records and training history for external tools
//! - **Markdown**: a human-readable single-run report
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use vwaplab_core::domain::SessionRecord;

use crate::runner::{BacktestReport, SCHEMA_VERSION};
use crate::train::EpochStats;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestReport` to pretty JSON.
pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a `BacktestReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export per-session records as CSV.
///
/// Columns: date, benchmark_vwap, model_vwap, slippage, slippage_bps
pub fn export_records_csv(records: &[SessionRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "benchmark_vwap",
        "model_vwap",
        "slippage",
        "slippage_bps",
    ])?;

    for r in records {
        wtr.write_record([
            &r.date.to_string(),
            &format!("{:.6}", r.benchmark_vwap),
            &format!("{:.6}", r.model_vwap),
            &format!("{:.6}", r.slippage),
            &format!("{:.4}", r.slippage_bps),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export training history as CSV with epoch, train_loss, val_loss columns.
pub fn export_history_csv(history: &[EpochStats]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["epoch", "train_loss", "val_loss"])?;
    for stats in history {
        let val = stats
            .val_loss
            .map(|v| format!("{v:.6e}"))
            .unwrap_or_default();
        wtr.write_record([
            &stats.epoch.to_string(),
            &format!("{:.6e}", stats.train_loss),
            &val,
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single run.
///
/// Creates a directory named after the run ID's first 12 hex digits under
/// `output_dir`, containing:
/// - `manifest.json` — the full `BacktestReport` (config included)
/// - `records.csv` — one row per evaluated session
/// - `summary.json` — aggregate slippage statistics alone
/// - `history.csv` — per-epoch losses (trained runs only)
/// - `report.md` — human-readable summary
///
/// Re-running an identical config overwrites the same directory.
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf> {
    let short_id = &report.run_id[..report.run_id.len().min(12)];
    let run_dir = output_dir.join(short_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    // manifest.json
    let json = export_json(report)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    // records.csv
    let records_csv = export_records_csv(&report.records)?;
    std::fs::write(run_dir.join("records.csv"), &records_csv)?;

    // summary.json
    let summary = serde_json::to_string_pretty(&report.summary)
        .context("failed to serialize SlippageSummary to JSON")?;
    std::fs::write(run_dir.join("summary.json"), &summary)?;

    // history.csv (only when the run trained something)
    if !report.train_history.is_empty() {
        let history_csv = export_history_csv(&report.train_history)?;
        std::fs::write(run_dir.join("history.csv"), &history_csv)?;
    }

    // report.md
    std::fs::write(run_dir.join("report.md"), generate_report(report))?;

    Ok(run_dir)
}

/// Load a `BacktestReport` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single run.
pub fn generate_report(report: &BacktestReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# VWAP Execution Report\n\n");

    // Metadata
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Run ID | {} |\n", report.run_id));
    md.push_str(&format!("| Scheduler | {} |\n", report.scheduler));
    md.push_str(&format!(
        "| Window | {} lookback / {} horizon |\n",
        report.config.schedule.lookback, report.config.schedule.horizon
    ));
    md.push_str(&format!(
        "| Order Size | {:.0} shares |\n",
        report.config.execution.total_shares
    ));
    md.push_str(&format!(
        "| Sessions | {} evaluated, {} skipped |\n",
        report.summary.sessions, report.sessions_skipped
    ));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    if report.synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    // Slippage summary
    let s = &report.summary;
    md.push_str("## Slippage Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Mean | {:.2} bps |\n", s.mean_bps));
    md.push_str(&format!("| Median | {:.2} bps |\n", s.median_bps));
    md.push_str(&format!("| Std Dev | {:.2} bps |\n", s.std_bps));
    md.push_str(&format!("| Mean Abs | {:.2} bps |\n", s.mean_abs_bps));
    md.push_str(&format!("| Min | {:.2} bps |\n", s.min_bps));
    md.push_str(&format!("| Max | {:.2} bps |\n", s.max_bps));
    md.push_str(&format!(
        "| Underperformed Benchmark | {:.1}% of sessions |\n",
        s.positive_share * 100.0
    ));
    md.push('\n');

    // Training
    if let (Some(first), Some(last)) = (report.train_history.first(), report.train_history.last())
    {
        md.push_str("## Training\n\n");
        md.push_str("| Field | Value |\n");
        md.push_str("| --- | --- |\n");
        md.push_str(&format!("| Epochs | {} |\n", report.train_history.len()));
        md.push_str(&format!(
            "| Train Loss | {:.6e} → {:.6e} |\n",
            first.train_loss, last.train_loss
        ));
        if let (Some(first_val), Some(last_val)) = (first.val_loss, last.val_loss) {
            md.push_str(&format!(
                "| Val Loss | {:.6e} → {:.6e} |\n",
                first_val, last_val
            ));
        }
        md.push('\n');
    }

    md
}

//! CLI entry point for the data quality checker.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dqc::{AnalysisConfig, DiagnosticsEngine, ReportAssembler, ReportBundle, Table};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular data quality diagnostics",
    long_about = "Profiles a CSV file: schema, missingness, duplicates, cardinality, \
                  constant columns, numeric summary, outliers, PII patterns and, \
                  when a reference file is given, distribution drift.\n\n\
                  EXAMPLES:\n  \
                  # Profile a single file\n  \
                  dqc -i data.csv\n\n  \
                  # Compare against a reference and save the report\n  \
                  dqc -i current.csv --reference train.csv -o report.json\n\n  \
                  # Machine-readable output\n  \
                  dqc -i data.csv --json | jq .missing"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: PathBuf,

    /// Reference CSV file for drift analysis
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Expected share of anomalous rows for the isolation forest (clamped to 0-0.49)
    #[arg(long, default_value = "0.03")]
    contamination: f64,

    /// Multiplier k for the IQR fences
    #[arg(long, default_value = "1.5")]
    iqr_multiplier: f64,

    /// Number of quantile bins for numeric drift
    #[arg(long, default_value = "10")]
    drift_bins: usize,

    /// PSI at or above this value flags a numeric column
    #[arg(long, default_value = "0.25")]
    psi_threshold: f64,

    /// JSD at or above this value flags a categorical column
    #[arg(long, default_value = "0.20")]
    jsd_threshold: f64,

    /// Skip the PII scan
    #[arg(long)]
    no_pii: bool,

    /// Write the JSON report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; only outputs the report.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = AnalysisConfig::builder()
        .contamination(args.contamination)
        .iqr_multiplier(args.iqr_multiplier)
        .drift_bins(args.drift_bins)
        .psi_threshold(args.psi_threshold)
        .jsd_threshold(args.jsd_threshold)
        .run_pii_scan(!args.no_pii)
        .build()?;

    let current = load_table(&args.input)?;
    let reference = args.reference.as_deref().map(load_table).transpose()?;

    let engine = DiagnosticsEngine::new(config)?;
    let bundle = match engine.run(&current, reference.as_ref()) {
        Ok(bundle) => bundle,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed [{}]: {}", e.error_code(), e));
        }
    };

    if let Some(ref path) = args.output {
        ReportAssembler::write_report_to_file(&bundle, path)?;
    }

    if args.json {
        println!("{}", ReportAssembler::to_json_pretty(&bundle)?);
        return Ok(());
    }

    print_human_readable_summary(&bundle, &args);
    Ok(())
}

/// Load a CSV file into a [`Table`].
fn load_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }

    info!("Loading dataset from: {}", path.display());
    let df = load_csv_with_fallbacks(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    info!("Dataset loaded successfully: {:?}", df.shape());

    Ok(Table::new(df))
}

/// Load CSV with a plain-quoting retry for malformed files.
fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    let content = std::fs::read_to_string(path)?;
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(clean_csv_content(&content)))
        .finish()
        .map_err(Into::into)
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "n/a".to_string(), |s| format!("{:.4}", s))
}

/// Print a human-readable summary of the report.
///
/// Uses `println!` rather than logging so the summary is visible regardless of
/// log level.
fn print_human_readable_summary(bundle: &ReportBundle, args: &Args) {
    println!();
    println!("{}", "=".repeat(80));
    println!("DATA QUALITY REPORT");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input: {} ({} rows x {} columns)",
        args.input.display(),
        bundle.meta.rows,
        bundle.meta.cols
    );
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<24} {:<12} {:<10} {:<10} {:<10}",
        "Column", "Kind", "Missing %", "Unique", "Ratio"
    );
    println!("{}", "-".repeat(70));
    for col in &bundle.schema {
        let missing = bundle.missing.iter().find(|m| m.column == col.column);
        let cardinality = bundle.cardinality.iter().find(|c| c.column == col.column);
        println!(
            "{:<24} {:<12} {:<10.2} {:<10} {:<10.4}",
            truncate_str(&col.column, 23),
            col.kind.as_str(),
            missing.map_or(0.0, |m| m.missing_pct),
            cardinality.map_or(0, |c| c.nunique),
            cardinality.map_or(0.0, |c| c.unique_ratio),
        );
    }
    println!();

    println!("QUALITY");
    println!("{}", "-".repeat(40));
    println!("  Duplicate rows: {}", bundle.duplicates.count);
    if bundle.constant_columns.is_empty() {
        println!("  Constant columns: none");
    } else {
        println!("  Constant columns: {}", bundle.constant_columns.join(", "));
    }
    println!("  Outliers (IQR): {} rows", bundle.outliers.iqr.n_outliers);
    println!(
        "  Outliers (isolation forest): {} rows",
        bundle.outliers.isolation_forest.n_outliers
    );
    println!();

    if let Some(ref drift) = bundle.drift {
        println!("DRIFT");
        println!("{}", "-".repeat(40));
        for record in drift.psi_numeric.iter().flatten() {
            println!(
                "  PSI  {:<24} {}",
                truncate_str(&record.column, 23),
                format_score(record.psi)
            );
        }
        for record in drift.jsd_categorical.iter().flatten() {
            println!(
                "  JSD  {:<24} {}",
                truncate_str(&record.column, 23),
                format_score(record.jsd)
            );
        }
        let flagged: Vec<&str> = drift
            .flags
            .psi_numeric
            .iter()
            .chain(&drift.flags.jsd_categorical)
            .map(String::as_str)
            .collect();
        if flagged.is_empty() {
            println!("  No columns over drift thresholds");
        } else {
            println!("  Flagged: {}", flagged.join(", "));
        }
        println!();
    }

    println!("PII");
    println!("{}", "-".repeat(40));
    match bundle.pii {
        Some(ref findings) => {
            for finding in findings {
                println!(
                    "  ! {}: email {}, phone {}, ssn {}, card {}",
                    finding.column,
                    finding.email_hits,
                    finding.phone_hits,
                    finding.ssn_hits,
                    finding.credit_card_hits
                );
            }
        }
        None if args.no_pii => println!("  Scan skipped"),
        None => println!("  No PII patterns found"),
    }
    println!();

    if let Some(ref path) = args.output {
        println!("Report written to: {}", path.display());
    } else {
        println!("Use --output <file> to save the JSON report");
    }
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a_very_long_column_name", 10), "a_very_...");
    }

    #[test]
    fn test_clean_csv_content() {
        let raw = "a,b\n\n\"\"x\"\",1\n";
        assert_eq!(clean_csv_content(raw), "a,b\n\"x\",1");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Some(0.25)), "0.2500");
        assert_eq!(format_score(None), "n/a");
    }
}

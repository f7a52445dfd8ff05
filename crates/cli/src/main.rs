// pkgmatch CLI - reconcile EDS holdings packages against Alma activation packages
// Three file-based stages, each runnable alone, plus `pipeline` to chain them.

mod exit_codes;
mod stages;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use pkgmatch_recon::model::{DedupSummary, ExtractSummary};
use pkgmatch_recon::{PipelineConfig, ReconError};

use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_SCHEMA, EXIT_SUCCESS, EXIT_USAGE};
use stages::{MatchReport, ALMA_PACKAGES_CSV, EDS_PACKAGES_CSV};

#[derive(Parser)]
#[command(name = "pkgmatch")]
#[command(about = "Match EDS e-resource packages to Alma packages by normalized name")]
#[command(version)]
struct Cli {
    /// TOML file overriding sheet names, blank-row limit and skipped package ids
    #[arg(long, global = true, env = "PKGMATCH_CONFIG", value_name = "TOML")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every package row of the Alma activation workbook to CSV
    #[command(after_help = "\
Examples:
  pkgmatch extract-alma \"E-Resource Activation Form.xlsm\" outputs/alma_packages.csv")]
    ExtractAlma {
        /// Activation workbook (.xlsx, .xlsm, .xls, .ods)
        workbook: PathBuf,

        /// Output CSV
        output: PathBuf,
    },

    /// Collapse a title-level EDS export into unique packages with title counts
    #[command(after_help = "\
Examples:
  pkgmatch dedup-eds EDS_export.csv outputs/eds_packages_unique.csv")]
    DedupEds {
        /// EDS holdings export (one row per title)
        input: PathBuf,

        /// Output CSV
        output: PathBuf,
    },

    /// Match unique EDS packages to Alma packages by normalized name
    #[command(after_help = "\
Examples:
  pkgmatch match outputs/eds_packages_unique.csv outputs/alma_packages.csv outputs/
  pkgmatch match eds.csv alma.csv outputs/ --json")]
    Match {
        /// Unique EDS packages (output of dedup-eds)
        eds: PathBuf,

        /// Alma packages (output of extract-alma)
        alma: PathBuf,

        /// Directory for matches_exact.csv, eds_unmatched.csv, alma_unmatched.csv
        out_dir: PathBuf,

        /// Also print the summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Run extract-alma, dedup-eds and match into one output directory
    #[command(after_help = "\
Examples:
  pkgmatch pipeline \"E-Resource Activation Form.xlsm\" EDS_export.csv outputs/
  pkgmatch --config recon.toml pipeline form.xlsm export.csv outputs/ --json")]
    Pipeline {
        /// Activation workbook
        workbook: PathBuf,

        /// EDS holdings export (one row per title)
        eds_export: PathBuf,

        /// Output directory for all five CSVs
        out_dir: PathBuf,

        /// Also print the summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too, on stdout
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::ExtractAlma { workbook, output } => cmd_extract(&workbook, &output, &config),
        Commands::DedupEds { input, output } => cmd_dedup(&input, &output, &config),
        Commands::Match {
            eds,
            alma,
            out_dir,
            json,
        } => cmd_match(&eds, &alma, &out_dir, json),
        Commands::Pipeline {
            workbook,
            eds_export,
            out_dir,
            json,
        } => cmd_pipeline(&workbook, &eds_export, &out_dir, &config, json),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, CliError> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    let config = PipelineConfig::from_toml(&text)?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let message = err.to_string();
        match err {
            ReconError::MissingColumns { .. } => Self { code: EXIT_SCHEMA, message, hint: None }
                .with_hint("column names are matched exactly, including case"),
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => {
                Self { code: EXIT_CONFIG, message, hint: None }
            }
            ReconError::Io(_) => Self::io(message),
        }
    }
}

// ============================================================================
// Reporting
// ============================================================================

fn report_extract(summary: &ExtractSummary, output: &Path) {
    for sheet in &summary.sheets {
        println!("Sheet {}: wrote {} package rows", sheet.sheet, sheet.rows_written);
    }
    println!("Wrote Alma packages to {}", output.display());
}

fn report_dedup(summary: &DedupSummary, output: &Path) {
    println!(
        "Wrote {} unique packages to {}",
        summary.unique_packages,
        output.display()
    );
}

fn report_match(report: &MatchReport) {
    let s = &report.summary;
    let f = &report.files;
    println!("Wrote {} exact matches to {}", s.exact_matches, f.exact.display());
    println!(
        "Wrote {} unmatched EDS packages to {}",
        s.eds_unmatched,
        f.eds_unmatched.display()
    );
    println!(
        "Wrote {} unmatched Alma packages to {}",
        s.alma_unmatched,
        f.alma_unmatched.display()
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_extract(workbook: &Path, output: &Path, config: &PipelineConfig) -> Result<(), CliError> {
    let summary = stages::run_extract(workbook, output, &config.alma)?;
    report_extract(&summary, output);
    Ok(())
}

fn cmd_dedup(input: &Path, output: &Path, config: &PipelineConfig) -> Result<(), CliError> {
    let summary = stages::run_dedup(input, output, &config.eds)?;
    report_dedup(&summary, output);
    Ok(())
}

fn cmd_match(eds: &Path, alma: &Path, out_dir: &Path, json: bool) -> Result<(), CliError> {
    let report = stages::run_match(eds, alma, out_dir)?;
    report_match(&report);
    if json {
        print_json(&report)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct PipelineReport {
    alma: ExtractSummary,
    eds: DedupSummary,
    matching: MatchReport,
}

fn cmd_pipeline(
    workbook: &Path,
    eds_export: &Path,
    out_dir: &Path,
    config: &PipelineConfig,
    json: bool,
) -> Result<(), CliError> {
    stages::create_out_dir(out_dir)?;
    let alma_csv = out_dir.join(ALMA_PACKAGES_CSV);
    let eds_csv = out_dir.join(EDS_PACKAGES_CSV);

    let alma = stages::run_extract(workbook, &alma_csv, &config.alma)?;
    report_extract(&alma, &alma_csv);

    let eds = stages::run_dedup(eds_export, &eds_csv, &config.eds)?;
    report_dedup(&eds, &eds_csv);

    let matching = stages::run_match(&eds_csv, &alma_csv, out_dir)?;
    report_match(&matching);

    if json {
        print_json(&PipelineReport { alma, eds, matching })?;
    }
    Ok(())
}

//! ledgerscore entrypoint: score transaction files and print one JSON report per line.
//! Runs without model artifacts or network access (heuristic scoring, template narratives).

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use ledgerscore::{
    assessment::{sample_transactions, thresholds, ApplicantInput, Assessor},
    config::ScorerConfig,
    logging::{ReportLine, StructuredLogger},
    ScoringError, Transaction,
};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (falls back to LEDGERSCORE_CONFIG_PATH, then ledgerscore.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consumer report: score, explanations, improvements, narrative
    Citizen {
        /// CSV or JSON transaction file; `-` reads stdin
        #[arg(long, short)]
        input: PathBuf,
    },
    /// Lender report for one applicant
    Bank {
        #[arg(long, short)]
        input: PathBuf,
        #[arg(long, default_value = "UNKNOWN")]
        applicant_id: String,
    },
    /// Lender reports for many applicants from `{"applicants": [...]}`
    Batch {
        #[arg(long, short)]
        input: PathBuf,
    },
    /// Consumer report over built-in demo transactions
    Sample,
    /// Score ranges and decision criteria
    Thresholds,
}

#[derive(Deserialize)]
struct BatchRequest {
    #[serde(default)]
    applicants: Vec<ApplicantInput>,
}

fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

/// JSON bodies (`{"transactions": [...]}` or `{"csv_content": "..."}`) or raw CSV.
fn load_transactions(path: &Path) -> Result<Vec<Transaction>, ScoringError> {
    let text = read_input(path)?;
    let input = if text.trim_start().starts_with('{') {
        serde_json::from_str::<ApplicantInput>(&text)?
    } else {
        ApplicantInput {
            csv_content: Some(text),
            ..Default::default()
        }
    };
    input.parse_transactions()
}

fn main() -> Result<(), BoxError> {
    dotenv().ok();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("LEDGERSCORE_CONFIG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("ledgerscore.json"));
    let config = ScorerConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(config = %config_path.display(), "ledgerscore starting");

    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Thresholds => {
            let table = thresholds();
            StructuredLogger::emit_json(&table, &mut out)?;
        }
        Commands::Sample => {
            let assessor = Assessor::from_config(&config);
            let report = assessor.assess_citizen(&sample_transactions())?;
            StructuredLogger::emit_json(&ReportLine::new("citizen", &report), &mut out)?;
        }
        Commands::Citizen { input } => {
            let transactions = load_transactions(&input)?;
            let assessor = Assessor::from_config(&config);
            let report = assessor.assess_citizen(&transactions)?;
            StructuredLogger::emit_json(&ReportLine::new("citizen", &report), &mut out)?;
        }
        Commands::Bank {
            input,
            applicant_id,
        } => {
            let transactions = load_transactions(&input)?;
            let assessor = Assessor::from_config(&config);
            let report = assessor.assess_applicant(&applicant_id, &transactions)?;
            StructuredLogger::emit_json(&ReportLine::new("bank", &report), &mut out)?;
        }
        Commands::Batch { input } => {
            let request: BatchRequest = serde_json::from_str(&read_input(&input)?)?;
            if request.applicants.is_empty() {
                return Err("no applicants data provided".into());
            }
            let assessor = Assessor::from_config(&config);
            let batch = assessor.assess_batch(&request.applicants);
            for entry in &batch.results {
                StructuredLogger::emit_json(&ReportLine::new("batch_result", entry), &mut out)?;
            }
            StructuredLogger::emit_json(
                &ReportLine::new("batch_summary", &batch.summary),
                &mut out,
            )?;
        }
    }

    Ok(())
}

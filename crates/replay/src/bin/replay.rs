use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use replay::{
    ReplayReport, SessionFile, SessionFileValidator, SessionReplayer,
    session_file::{read_coefficients, read_session_file},
};
use rules::{CoefficientTable, RecordTable, ScoringEngine, ScoringSystem};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Weightlifting session replay and scoring", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Coefficient table to use instead of the bundled one.
    #[arg(long, env = "COEFFICIENTS_FILE", global = true)]
    coefficients: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the events of one session file through the rules engine.
    Replay {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Replay every session file of a directory.
    BulkReplay {
        #[arg(long, default_value = "./sessions")]
        directory: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// Replay a session and rank its athletes.
    Score {
        file: PathBuf,

        /// Defaults to the scoring system of the session rules.
        #[arg(long)]
        system: Option<ScoringSystem>,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("replay={},rules={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Replay {
            file,
            validate_only,
            json,
        } => {
            handle_replay(&file, validate_only, json).await?;
        }
        Commands::BulkReplay {
            directory,
            validate_only,
        } => {
            handle_bulk_replay(&directory, validate_only).await?;
        }
        Commands::Score { file, system, json } => {
            let coefficients = read_coefficients(cli.coefficients.as_deref())
                .await
                .context("Failed to load coefficient table")?;
            handle_score(&file, system, json, &coefficients).await?;
        }
    }

    Ok(())
}

async fn load_validated(file: &Path) -> anyhow::Result<SessionFile> {
    let session_file = read_session_file(file)
        .await
        .with_context(|| format!("Failed to load {}", file.display()))?;

    tracing::info!(
        "Loaded session: {} (v{}, {} entries, {} events)",
        session_file.session.id,
        session_file.format_version,
        session_file.entries.len(),
        session_file.events.len()
    );

    let validation_report = SessionFileValidator::validate(&session_file)?;
    validation_report.log_warnings();
    tracing::info!("✓ Validation successful!");

    Ok(session_file)
}

async fn handle_replay(file: &Path, validate_only: bool, json: bool) -> anyhow::Result<()> {
    let session_file = load_validated(file).await?;
    if validate_only {
        return Ok(());
    }

    let report = SessionReplayer::new().replay(&session_file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

async fn handle_bulk_replay(directory: &Path, validate_only: bool) -> anyhow::Result<()> {
    tracing::info!("Scanning directory for session files: {}", directory.display());

    let mut json_files = Vec::new();
    let mut entries = tokio::fs::read_dir(directory)
        .await
        .with_context(|| format!("Cannot read {}", directory.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            json_files.push(path);
        }
    }

    if json_files.is_empty() {
        tracing::warn!("No JSON files found in {}", directory.display());
        return Ok(());
    }

    json_files.sort();
    tracing::info!("Found {} session file(s)", json_files.len());

    let replayer = SessionReplayer::new();
    let mut success_count = 0;
    let mut error_count = 0;

    for (idx, file_path) in json_files.iter().enumerate() {
        tracing::info!("[{}/{}] Processing: {}", idx + 1, json_files.len(), file_path.display());

        let result = match load_validated(file_path).await {
            Ok(session_file) if !validate_only => replayer
                .replay(&session_file)
                .map(|report| print_report(&report))
                .map_err(anyhow::Error::from),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                success_count += 1;
                tracing::info!("  ✓ Success");
            }
            Err(e) => {
                error_count += 1;
                tracing::error!("  ✗ Error: {:#}", e);
            }
        }
    }

    tracing::info!("Summary: {} succeeded, {} failed", success_count, error_count);

    if error_count > 0 {
        bail!("{} file(s) failed to replay", error_count);
    }
    Ok(())
}

async fn handle_score(
    file: &Path,
    system: Option<ScoringSystem>,
    json: bool,
    coefficients: &CoefficientTable,
) -> anyhow::Result<()> {
    let session_file = load_validated(file).await?;
    let report = SessionReplayer::new().replay(&session_file)?;

    let system = system.unwrap_or(session_file.rules.scoring_system);
    let records = RecordTable::new(session_file.records.clone());
    if system == ScoringSystem::Robi && records.records().is_empty() {
        tracing::warn!("No records in {}, Robi scores will be 0", file.display());
    }
    let engine = ScoringEngine::for_competition(coefficients, &session_file.rules)
        .context("Coefficient table is incomplete")?
        .with_records(records);

    let ranking = report.ranking(&engine, system);
    if json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(());
    }

    tracing::info!("Ranking by {} for session {}:", system, report.session.id);
    for ranked in &ranking {
        let rank = ranked
            .rank
            .map(|rank| rank.to_string())
            .unwrap_or_else(|| "-".to_string());
        tracing::info!("  {:>3}  {:<30} {:>10.3}", rank, ranked.name, ranked.score);
    }
    Ok(())
}

fn print_report(report: &ReplayReport) {
    tracing::info!(
        "Session {}: {} event(s) applied, {} rejected",
        report.session.id,
        report.applied_count(),
        report.rejected().count()
    );
    for rejected in report.rejected() {
        if let replay::Outcome::Rejected { key, message } = &rejected.outcome {
            tracing::info!(
                "  event {} ({}, {}): {} [{}]",
                rejected.index,
                rejected.kind,
                rejected.entry.as_deref().unwrap_or("-"),
                message,
                key
            );
        }
    }
    for entry in report.session.entries() {
        tracing::info!(
            "  {:<30} snatch {:>3}  clean & jerk {:>3}  total {:>3}",
            entry.meta.name,
            entry.card.best_snatch(),
            entry.card.best_clean_jerk(),
            entry.card.total()
        );
    }
}

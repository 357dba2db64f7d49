use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use argus_engine::{
    config::{Config, LogFormat},
    engine::{AnalysisRequest, ArgusEngine, DialecticRequest},
    gateway::HttpReasoningService,
    pipeline::{GenerationFailure, Persona, RoundFailure, Stance},
    ArgumentGraph,
};

/// ARGUS - the universal argument engine.
///
/// If it can be believed, ARGUS can argue it.
#[derive(Parser)]
#[command(name = "argus", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze an argument: claims, attacks, defenses, fallacies, score
    Analyze {
        /// The argument to analyze
        text: String,
        /// Analysis mode: attack, defense, dialectic, or neutral
        #[arg(long, default_value = "dialectic")]
        stance: Stance,
        /// Argument style persona
        #[arg(long, default_value = "academic")]
        persona: Persona,
        /// Skip the fallacy-detection pass
        #[arg(long)]
        no_fallacies: bool,
        /// Time budget in milliseconds for the whole analysis
        #[arg(long)]
        deadline_ms: Option<u64>,
    },
    /// Run a multi-round dialectic session
    Dialectic {
        /// The argument to analyze
        text: String,
        /// Number of rounds
        #[arg(long, default_value_t = 3)]
        rounds: usize,
        /// Argument style persona
        #[arg(long, default_value = "academic")]
        persona: Persona,
        /// Time budget in milliseconds for the whole session
        #[arg(long)]
        deadline_ms: Option<u64>,
    },
    /// Fast robustness check without the full graph
    QuickScore {
        /// The argument to score
        text: String,
    },
}

/// Serving envelope for a single analysis
#[derive(Serialize)]
struct AnalysisEnvelope {
    analysis_id: String,
    timestamp: DateTime<Utc>,
    execution_time_ms: u64,
    graph: ArgumentGraph,
    generation_failures: Vec<GenerationFailure>,
}

/// Serving envelope for a dialectic session
#[derive(Serialize)]
struct DialecticEnvelope {
    analysis_id: String,
    timestamp: DateTime<Utc>,
    execution_time_ms: u64,
    rounds: Vec<ArgumentGraph>,
    failures: Vec<RoundFailure>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.gateway.base_url,
        "ARGUS engine starting"
    );

    let gateway = HttpReasoningService::new(&config.gateway, config.request.clone())?;
    let engine = ArgusEngine::new(Arc::new(gateway), &config);

    match cli.command {
        Command::Analyze {
            text,
            stance,
            persona,
            no_fallacies,
            deadline_ms,
        } => {
            let mut request = AnalysisRequest::new(text)
                .with_stance(stance)
                .with_persona(persona)
                .with_fallacy_detection(!no_fallacies);
            if let Some(ms) = deadline_ms {
                request = request.with_deadline(Duration::from_millis(ms));
            }

            let start = Instant::now();
            let report = engine.analyze(request).await?;

            let envelope = AnalysisEnvelope {
                analysis_id: Uuid::new_v4().to_string(),
                timestamp: Utc::now(),
                execution_time_ms: start.elapsed().as_millis() as u64,
                graph: report.graph,
                generation_failures: report.generation_failures,
            };
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Command::Dialectic {
            text,
            rounds,
            persona,
            deadline_ms,
        } => {
            let mut request = DialecticRequest::new(text)
                .with_rounds(rounds)
                .with_persona(persona);
            if let Some(ms) = deadline_ms {
                request = request.with_deadline(Duration::from_millis(ms));
            }

            let start = Instant::now();
            let session = engine
                .run_dialectic(request)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({} rounds completed)", e, e.completed.rounds.len()))?;

            let envelope = DialecticEnvelope {
                analysis_id: Uuid::new_v4().to_string(),
                timestamp: Utc::now(),
                execution_time_ms: start.elapsed().as_millis() as u64,
                rounds: session.rounds,
                failures: session.failures,
            };
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Command::QuickScore { text } => {
            let quick = engine.quick_score(text, None).await?;
            println!("{}", serde_json::to_string_pretty(&quick)?);
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

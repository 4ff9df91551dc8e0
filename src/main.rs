mod config;
mod core;
mod models;
mod services;

use std::fs;
use std::process;

use thiserror::Error;
use tracing::{error, info};

use crate::config::{PartitionStrategy, Settings};
use crate::core::{MatchResult, Matcher, MatchingError};
use crate::models::{DomainError, MatchReport};
use crate::services::dataset::{self, DatasetError, PopulationData};
use crate::services::partition;

/// Failures surfaced by the matchmaking pipeline
#[derive(Debug, Error)]
enum AppError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("invalid input: {0}")]
    Domain(#[from] DomainError),

    #[error("matching failed: {0}")]
    Matching(#[from] MatchingError),

    #[error("failed to encode the report: {0}")]
    ReportEncode(#[from] serde_json::Error),

    #[error("failed to write report {path}: {source}")]
    ReportWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_logging();

    info!("Starting Duet matchmaking run...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    if let Err(e) = run(&settings) {
        error!("Matchmaking run failed: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn run(settings: &Settings) -> Result<(), AppError> {
    let data = dataset::load(&settings.input)?;
    let population = data.matrix.size();
    info!("Loaded {} participants", population);

    let partition = match settings.matching.partition {
        PartitionStrategy::Ordered => partition::ordered(population)?,
        PartitionStrategy::Shuffled => partition::shuffled(population, settings.matching.seed)?,
    };
    let strategy = match settings.matching.partition {
        PartitionStrategy::Ordered => "ordered",
        PartitionStrategy::Shuffled => "shuffled",
    };
    info!(
        "Partitioned population: {} proposers, {} acceptors ({} strategy)",
        partition.proposers().len(),
        partition.acceptors().len(),
        strategy
    );

    let matcher = Matcher::new(&data.participants, &data.matrix, partition)?;
    let result = matcher.run()?;

    print_outcome(&result, &data);

    if let Some(path) = &settings.output.report {
        write_report(path, &result, &data)?;
        info!("Report written to {}", path);
    }

    Ok(())
}

fn print_outcome(result: &MatchResult, data: &PopulationData) {
    println!();
    println!("Matched pairs ({}):", result.pairs.len());
    for pair in &result.pairs {
        println!(
            "  {} <-> {}  (score {:.2})",
            label(data, pair.proposer),
            label(data, pair.acceptor),
            data.matrix.score(pair.proposer, pair.acceptor)
        );
    }

    let unmatched: Vec<String> = result
        .unmatched_proposers
        .iter()
        .chain(result.unmatched_acceptors.iter())
        .map(|&index| label(data, index))
        .collect();
    if unmatched.is_empty() {
        println!("Everyone was matched.");
    } else {
        println!("Unmatched ({}):", unmatched.len());
        for entry in unmatched {
            println!("  {}", entry);
        }
    }
}

fn label(data: &PopulationData, index: usize) -> String {
    match data.names.as_ref().and_then(|names| names.get(index)) {
        Some(name) => format!("{} (#{})", name, index),
        None => format!("participant #{}", index),
    }
}

fn write_report(path: &str, result: &MatchResult, data: &PopulationData) -> Result<(), AppError> {
    let report = MatchReport::new(result, &data.matrix, data.names.as_deref());
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(path, json).map_err(|source| AppError::ReportWrite {
        path: path.to_string(),
        source,
    })?;
    Ok(())
}

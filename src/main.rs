use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use price_deviation_alert::config::Config;
use price_deviation_alert::detector::AnomalyDetector;
use price_deviation_alert::gemini::GeminiRestClient;
use price_deviation_alert::report::AlertReporter;
use price_deviation_alert::runner::{resolve_pairs, run_pairs};

#[derive(Debug, Parser)]
#[command(
    name = "price-deviation-alert",
    about = "Flag anomalous hourly price moves on Gemini trading pairs"
)]
struct Cli {
    /// Path to a TOML config file (defaults to config/default.toml when present)
    #[arg(short, long, env = "PRICE_ALERT_CONFIG")]
    config: Option<PathBuf>,

    /// Pair to evaluate; repeat for several. Overrides the configured pairs.
    #[arg(short, long = "pair")]
    pairs: Vec<String>,

    /// Evaluate every symbol listed on the exchange
    #[arg(long, conflicts_with = "pairs")]
    all_symbols: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    // Diagnostics go to stderr; stdout carries the alert lines.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .json()
        .init();

    let detector = AnomalyDetector::new(config.detector).context("invalid detector config")?;
    let client = GeminiRestClient::new(&config.gemini.rest_base_url);
    let mut reporter = AlertReporter::new(std::io::stdout(), config.report.include_non_alerts);

    if !config.horizon_covers_window() {
        tracing::warn!(
            total_hours = config.gemini.total_hours,
            window_size = config.detector.window_size,
            "Look-back horizon leaves no price to score"
        );
    }

    let pairs = match resolve_pairs(&client, &config.gemini, &cli.pairs, cli.all_symbols).await {
        Ok(pairs) => pairs,
        Err(e) => {
            let detail = format!("{:#}", e);
            reporter.report_error("Error fetching symbols", Some(&detail))?;
            std::process::exit(1);
        }
    };

    tracing::info!(
        pairs = pairs.len(),
        rest_url = %config.gemini.rest_base_url,
        window_size = config.detector.window_size,
        std_threshold = config.detector.std_threshold,
        "Starting price-deviation-alert"
    );

    let outcomes = run_pairs(&client, &detector, &config.gemini, &pairs, &mut reporter).await;

    let evaluated = outcomes.iter().filter(|o| o.is_evaluated()).count();
    let alerts: usize = outcomes.iter().map(|o| o.alerts()).sum();
    tracing::info!(
        pairs = outcomes.len(),
        evaluated,
        skipped = outcomes.len() - evaluated,
        alerts,
        "Run complete"
    );
    Ok(())
}

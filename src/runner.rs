use anyhow::{Context, Result};
use std::io::Write;

use crate::config::{normalize_pairs, GeminiConfig};
use crate::detector::{AnomalyDetector, Step};
use crate::error::{DetectorError, FetchError};
use crate::gemini::GeminiRestClient;
use crate::report::AlertReporter;

/// What happened to one pair during a run.
#[derive(Debug)]
pub enum PairOutcome {
    Evaluated {
        pair: String,
        evaluated: usize,
        alerts: usize,
        degenerate: usize,
    },
    InsufficientData {
        pair: String,
        required: usize,
        available: usize,
    },
    FetchFailed {
        pair: String,
        error: FetchError,
    },
    /// The detector refused the series for a reason other than its length.
    Rejected {
        pair: String,
        error: DetectorError,
    },
}

impl PairOutcome {
    pub fn pair(&self) -> &str {
        match self {
            Self::Evaluated { pair, .. }
            | Self::InsufficientData { pair, .. }
            | Self::FetchFailed { pair, .. }
            | Self::Rejected { pair, .. } => pair,
        }
    }

    pub fn alerts(&self) -> usize {
        match self {
            Self::Evaluated { alerts, .. } => *alerts,
            _ => 0,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self, Self::Evaluated { .. })
    }
}

fn report_error<W: Write>(reporter: &mut AlertReporter<W>, message: &str, error: &str) {
    if let Err(e) = reporter.report_error(message, Some(error)) {
        tracing::error!(error = %e, "Failed to write error line");
    }
}

/// Fetch, score and report one pair. Never fails; failures become outcomes.
pub async fn run_pair<W: Write>(
    client: &GeminiRestClient,
    detector: &AnomalyDetector,
    gemini: &GeminiConfig,
    pair: &str,
    reporter: &mut AlertReporter<W>,
) -> PairOutcome {
    let prices = match client
        .get_closes(pair, &gemini.candle_interval, gemini.total_hours)
        .await
    {
        Ok(prices) => prices,
        Err(error) => {
            let message = if error.is_parse() {
                format!("Parsing hourly prices for {} failed", pair)
            } else {
                format!("Fetching hourly prices for {} failed", pair)
            };
            tracing::warn!(pair, error = %error, "Price fetch failed");
            report_error(reporter, &message, &error.to_string());
            return PairOutcome::FetchFailed {
                pair: pair.to_string(),
                error,
            };
        }
    };

    let mut observations = match detector.observe(&prices) {
        Ok(observations) => observations,
        Err(error) => {
            tracing::warn!(pair, error = %error, "Skipping pair");
            report_error(
                reporter,
                &format!("Calculating alert for {} failed", pair),
                &error.to_string(),
            );
            return match error {
                DetectorError::InsufficientData {
                    required,
                    available,
                } => PairOutcome::InsufficientData {
                    pair: pair.to_string(),
                    required,
                    available,
                },
                error => PairOutcome::Rejected {
                    pair: pair.to_string(),
                    error,
                },
            };
        }
    };

    let mut evaluated = 0;
    let mut alerts = 0;
    let mut degenerate = 0;
    while let Some(step) = observations.next_step() {
        match step {
            Step::Evaluated(obs) => {
                evaluated += 1;
                if obs.alert {
                    alerts += 1;
                }
                if let Err(e) = reporter.report(pair, &obs) {
                    tracing::error!(
                        pair,
                        index = obs.index,
                        error = %e,
                        "Failed to write alert line"
                    );
                }
            }
            Step::Degenerate { index } => {
                degenerate += 1;
                tracing::debug!(pair, index, "Zero-variance window, index skipped");
            }
        }
    }

    tracing::info!(pair, evaluated, alerts, degenerate, "Pair evaluated");
    PairOutcome::Evaluated {
        pair: pair.to_string(),
        evaluated,
        alerts,
        degenerate,
    }
}

/// Run every pair in order. One pair's failure never stops the others.
pub async fn run_pairs<W: Write>(
    client: &GeminiRestClient,
    detector: &AnomalyDetector,
    gemini: &GeminiConfig,
    pairs: &[String],
    reporter: &mut AlertReporter<W>,
) -> Vec<PairOutcome> {
    let mut outcomes = Vec::with_capacity(pairs.len());
    for pair in pairs {
        outcomes.push(run_pair(client, detector, gemini, pair, reporter).await);
    }
    outcomes
}

/// Pairs to evaluate: explicit overrides, else every exchange symbol when
/// `all_symbols` is set, else the configured pairs.
pub async fn resolve_pairs(
    client: &GeminiRestClient,
    gemini: &GeminiConfig,
    overrides: &[String],
    all_symbols: bool,
) -> Result<Vec<String>> {
    if !overrides.is_empty() {
        return Ok(normalize_pairs(overrides));
    }
    if all_symbols {
        let symbols = client
            .get_symbols()
            .await
            .context("Error fetching symbols")?;
        return Ok(normalize_pairs(&symbols));
    }
    Ok(gemini.tradable_pairs())
}

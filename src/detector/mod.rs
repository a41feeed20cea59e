//! Rolling z-score anomaly detection over a price sequence.
//!
//! Every price that has `window_size` predecessors is scored against the mean
//! and sample standard deviation of exactly those predecessors. The detector
//! holds no state between calls; each [`Observations`] run owns its own window.

pub mod window;

use serde::{Deserialize, Serialize};

use crate::error::DetectorError;
use crate::model::observation::ObservationResult;

pub use window::{RollingWindow, Step};

pub const DEFAULT_WINDOW_SIZE: usize = 24;
pub const DEFAULT_STD_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Number of look-back samples. Must be at least 2.
    pub window_size: usize,
    /// Z-score cutoff. A deviation strictly greater than this alerts.
    pub std_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            std_threshold: DEFAULT_STD_THRESHOLD,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.window_size < 2 {
            return Err(DetectorError::InvalidConfiguration(format!(
                "window_size must be >= 2, got {}",
                self.window_size
            )));
        }
        if !self.std_threshold.is_finite() || self.std_threshold <= 0.0 {
            return Err(DetectorError::InvalidConfiguration(format!(
                "std_threshold must be a finite value > 0, got {}",
                self.std_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: DetectorConfig,
}

impl AnomalyDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Lazily score `prices` (oldest first).
    ///
    /// Fails with [`DetectorError::InsufficientData`] when the sequence is
    /// shorter than one full window.
    pub fn observe<'a>(&self, prices: &'a [f64]) -> Result<Observations<'a>, DetectorError> {
        if prices.len() < self.config.window_size {
            return Err(DetectorError::InsufficientData {
                required: self.config.window_size,
                available: prices.len(),
            });
        }
        Ok(Observations {
            prices,
            next: 0,
            window: self.rolling_window(),
        })
    }

    /// Empty window for scoring prices as they arrive, one `push` at a time.
    pub fn rolling_window(&self) -> RollingWindow {
        RollingWindow::new(self.config.window_size, self.config.std_threshold)
    }

    /// Eager form of [`observe`](Self::observe).
    pub fn evaluate(&self, prices: &[f64]) -> Result<Evaluation, DetectorError> {
        let mut observations = self.observe(prices)?;
        let mut evaluation = Evaluation::default();
        while let Some(step) = observations.next_step() {
            match step {
                Step::Evaluated(obs) => evaluation.results.push(obs),
                Step::Degenerate { index } => evaluation.degenerate.push(index),
            }
        }
        Ok(evaluation)
    }
}

/// Iterator over the scored prices of one sequence, in ascending index order.
///
/// `next()` skips degenerate windows; use [`next_step`](Self::next_step) to see
/// them.
#[derive(Debug, Clone)]
pub struct Observations<'a> {
    prices: &'a [f64],
    next: usize,
    window: RollingWindow,
}

impl Observations<'_> {
    pub fn next_step(&mut self) -> Option<Step> {
        while let Some(&price) = self.prices.get(self.next) {
            self.next += 1;
            if let Some(step) = self.window.push(price) {
                return Some(step);
            }
        }
        None
    }

    /// Number of indices still to be scored.
    pub fn remaining(&self) -> usize {
        let start = self.next.max(self.window.size());
        self.prices.len().saturating_sub(start)
    }
}

impl Iterator for Observations<'_> {
    type Item = ObservationResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_step()? {
                Step::Evaluated(obs) => return Some(obs),
                Step::Degenerate { .. } => continue,
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub results: Vec<ObservationResult>,
    /// Indices skipped because their window had zero variance.
    pub degenerate: Vec<usize>,
}

impl Evaluation {
    pub fn alerts(&self) -> impl Iterator<Item = &ObservationResult> {
        self.results.iter().filter(|r| r.alert)
    }

    pub fn alert_count(&self) -> usize {
        self.alerts().count()
    }

    /// Degenerate indices as typed errors.
    pub fn degenerate_errors(&self) -> impl Iterator<Item = DetectorError> + '_ {
        self.degenerate
            .iter()
            .map(|&index| DetectorError::DegenerateWindow { index })
    }
}

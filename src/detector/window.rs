use std::collections::VecDeque;

use crate::indicator::stats;
use crate::model::observation::ObservationResult;

/// Result of feeding one price once the window is full.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Evaluated(ObservationResult),
    /// The window before `index` had zero variance, so no score exists.
    Degenerate { index: usize },
}

impl Step {
    pub fn index(&self) -> usize {
        match self {
            Self::Evaluated(obs) => obs.index,
            Self::Degenerate { index } => *index,
        }
    }

    pub fn observation(&self) -> Option<&ObservationResult> {
        match self {
            Self::Evaluated(obs) => Some(obs),
            Self::Degenerate { .. } => None,
        }
    }
}

/// Look-back buffer of the most recent `size` prices.
///
/// A pushed price is scored against the window as it stood *before* the push,
/// then enters the window, evicting the oldest sample.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    size: usize,
    std_threshold: f64,
    prices: VecDeque<f64>,
    seen: usize,
}

impl RollingWindow {
    pub(crate) fn new(size: usize, std_threshold: f64) -> Self {
        Self {
            size,
            std_threshold,
            prices: VecDeque::new(),
            seen: 0,
        }
    }

    /// Push the next price. Returns `None` while the window is still warming up.
    pub fn push(&mut self, price: f64) -> Option<Step> {
        let index = self.seen;
        self.seen += 1;

        let step = if self.is_ready() {
            Some(self.score(index, price))
        } else {
            None
        };

        self.prices.push_back(price);
        while self.prices.len() > self.size {
            let _ = self.prices.pop_front();
        }
        step
    }

    fn score(&mut self, index: usize, price: f64) -> Step {
        let window = self.prices.make_contiguous();
        if stats::is_flat(window) {
            return Step::Degenerate { index };
        }
        let (Some(mean), Some(std_dev)) = (stats::mean(window), stats::sample_std_dev(window))
        else {
            return Step::Degenerate { index };
        };
        if std_dev == 0.0 {
            return Step::Degenerate { index };
        }

        let deviation = (price - mean).abs() / std_dev;
        Step::Evaluated(ObservationResult {
            index,
            price,
            mean,
            std_dev,
            deviation,
            alert: deviation > self.std_threshold,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.prices.len() >= self.size
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

use serde::Serialize;

/// Outcome of evaluating one price against the window that precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationResult {
    /// Position of the evaluated price in the input sequence.
    pub index: usize,
    pub price: f64,
    pub mean: f64,
    pub std_dev: f64,
    /// `|price - mean| / std_dev`
    pub deviation: f64,
    pub alert: bool,
}

impl ObservationResult {
    /// Absolute price move implied by the deviation.
    pub fn price_change(&self) -> f64 {
        self.deviation * self.std_dev
    }
}

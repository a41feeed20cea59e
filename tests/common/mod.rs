#![allow(dead_code)]

use serde_json::{json, Value};

pub const HOUR_MS: u64 = 3_600_000;

/// Candle rows for `closes` (given oldest first), newest first like the exchange.
pub fn candle_rows(closes: &[f64]) -> Value {
    let base = 1_700_000_000_000u64;
    let rows: Vec<Value> = closes
        .iter()
        .enumerate()
        .rev()
        .map(|(i, &c)| json!([base + i as u64 * HOUR_MS, c, c + 1.0, c - 1.0, c, 12.5]))
        .collect();
    Value::Array(rows)
}

pub fn fixture_with_spike() -> Vec<f64> {
    let mut prices: Vec<f64> = [100.0, 102.0, 98.0, 101.0, 99.0, 100.0]
        .iter()
        .copied()
        .cycle()
        .take(24)
        .collect();
    prices.push(105.0);
    prices
}

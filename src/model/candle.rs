use serde_json::Value;

use crate::error::FetchError;

/// One Gemini candle row: `[time, open, high, low, close, volume]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    /// Candle open time, ms since epoch.
    pub time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Parse a raw candle row. Volume may be absent; the first five fields may not.
    pub fn from_row(row: &[Value]) -> Result<Self, FetchError> {
        if row.len() < 5 {
            return Err(FetchError::Parse(format!(
                "candle row has {} fields, expected at least 5",
                row.len()
            )));
        }
        let time = field(row, 0, "time")?;
        if !time.is_finite() || time < 0.0 {
            return Err(FetchError::Parse(format!("invalid candle time {}", time)));
        }
        Ok(Self {
            time: time as u64,
            open: field(row, 1, "open")?,
            high: field(row, 2, "high")?,
            low: field(row, 3, "low")?,
            close: field(row, 4, "close")?,
            volume: match row.get(5) {
                Some(_) => field(row, 5, "volume")?,
                None => 0.0,
            },
        })
    }
}

fn field(row: &[Value], idx: usize, name: &str) -> Result<f64, FetchError> {
    match row.get(idx) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| FetchError::Parse(format!("candle {} is not a valid number", name))),
        Some(Value::String(s)) => s
            .parse::<f64>()
            .map_err(|e| FetchError::Parse(format!("candle {} '{}': {}", name, s, e))),
        Some(other) => Err(FetchError::Parse(format!(
            "candle {} has unexpected value {}",
            name, other
        ))),
        None => Err(FetchError::Parse(format!("candle {} missing", name))),
    }
}

/// Closing prices of `candles`, oldest first, keeping only the newest `limit`.
pub fn closes_oldest_first(candles: &[Candle], limit: usize) -> Vec<f64> {
    let mut sorted: Vec<&Candle> = candles.iter().collect();
    sorted.sort_by_key(|c| c.time);
    let skip = sorted.len().saturating_sub(limit);
    sorted.into_iter().skip(skip).map(|c| c.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Vec<Value> {
        v.as_array().cloned().unwrap()
    }

    #[test]
    fn parses_numeric_row() {
        let c = Candle::from_row(&row(json!([
            1559755800000u64,
            7781.6,
            7820.23,
            7776.56,
            7819.39,
            34.7624802159
        ])))
        .unwrap();
        assert_eq!(c.time, 1_559_755_800_000);
        assert!((c.close - 7819.39).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_string_numbers_and_missing_volume() {
        let c = Candle::from_row(&row(json!([1000, "10", "12", "9", "11.5"]))).unwrap();
        assert!((c.close - 11.5).abs() < f64::EPSILON);
        assert_eq!(c.volume, 0.0);
    }

    #[test]
    fn rejects_short_or_malformed_rows() {
        assert!(matches!(
            Candle::from_row(&row(json!([1000, 1.0, 2.0, 0.5]))),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            Candle::from_row(&row(json!([1000, 1.0, 2.0, 0.5, null, 3.0]))),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            Candle::from_row(&row(json!([-5, 1.0, 2.0, 0.5, 1.0]))),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn closes_are_sorted_and_truncated() {
        let mk = |time: u64, close: f64| Candle {
            time,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        };
        // newest first, the way the exchange returns them
        let candles = vec![mk(4, 40.0), mk(3, 30.0), mk(2, 20.0), mk(1, 10.0)];
        assert_eq!(closes_oldest_first(&candles, 3), vec![20.0, 30.0, 40.0]);
        assert_eq!(closes_oldest_first(&candles, 10), vec![10.0, 20.0, 30.0, 40.0]);
    }
}

//! JSON alert lines.
//!
//! Each line is a self-contained object with `timestamp`, `log_level`,
//! `trading_pair`, `deviation` and a `data` payload. Observation lines carry
//! the price statistics; error lines carry a message and the error text.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::{self, Write};

use crate::model::observation::ObservationResult;

pub const ALERT_MESSAGE: &str = "Alert generated";
pub const OBSERVATION_MESSAGE: &str = "Observation evaluated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Debug,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogLine<'a> {
    pub timestamp: String,
    pub log_level: LogLevel,
    pub trading_pair: Option<&'a str>,
    pub deviation: bool,
    pub data: LogData<'a>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LogData<'a> {
    Observation {
        message: &'a str,
        current_price: f64,
        average_price: f64,
        standard_deviation: f64,
        price_change_value: f64,
        deviation_value: f64,
    },
    Error {
        message: &'a str,
        error: Option<&'a str>,
    },
}

impl<'a> LogLine<'a> {
    pub fn observation(pair: &'a str, obs: &ObservationResult, at: DateTime<Local>) -> Self {
        Self {
            timestamp: at.to_rfc3339(),
            log_level: if obs.alert {
                LogLevel::Info
            } else {
                LogLevel::Debug
            },
            trading_pair: Some(pair),
            deviation: obs.alert,
            data: LogData::Observation {
                message: if obs.alert {
                    ALERT_MESSAGE
                } else {
                    OBSERVATION_MESSAGE
                },
                current_price: obs.price,
                average_price: obs.mean,
                standard_deviation: obs.std_dev,
                price_change_value: obs.price_change(),
                deviation_value: obs.deviation,
            },
        }
    }

    pub fn error(message: &'a str, error: Option<&'a str>, at: DateTime<Local>) -> Self {
        Self {
            timestamp: at.to_rfc3339(),
            log_level: LogLevel::Error,
            trading_pair: None,
            deviation: false,
            data: LogData::Error { message, error },
        }
    }
}

/// Writes JSON lines for observation results and boundary errors.
pub struct AlertReporter<W: Write> {
    writer: W,
    include_non_alerts: bool,
}

impl<W: Write> AlertReporter<W> {
    pub fn new(writer: W, include_non_alerts: bool) -> Self {
        Self {
            writer,
            include_non_alerts,
        }
    }

    /// Write a line for `obs` if it alerts (or non-alerts are enabled).
    /// Returns whether a line was written.
    pub fn report(&mut self, pair: &str, obs: &ObservationResult) -> io::Result<bool> {
        if !obs.alert && !self.include_non_alerts {
            return Ok(false);
        }
        self.write_line(&LogLine::observation(pair, obs, Local::now()))?;
        Ok(true)
    }

    pub fn report_error(&mut self, message: &str, error: Option<&str>) -> io::Result<()> {
        self.write_line(&LogLine::error(message, error, Local::now()))
    }

    fn write_line(&mut self, line: &LogLine<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(alert: bool) -> ObservationResult {
        ObservationResult {
            index: 30,
            price: 105.0,
            mean: 100.0,
            std_dev: 2.0,
            deviation: 2.5,
            alert,
        }
    }

    #[test]
    fn log_level_follows_alert_flag() {
        let now = Local::now();
        assert_eq!(
            LogLine::observation("btcusd", &obs(true), now).log_level,
            LogLevel::Info
        );
        assert_eq!(
            LogLine::observation("btcusd", &obs(false), now).log_level,
            LogLevel::Debug
        );
    }

    #[test]
    fn non_alerts_are_filtered_by_default() {
        let mut reporter = AlertReporter::new(Vec::new(), false);
        assert!(!reporter.report("btcusd", &obs(false)).unwrap());
        assert!(reporter.report("btcusd", &obs(true)).unwrap());
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 1);
    }
}

//! Cron schedule derived from the scan interval

use crate::error::ConfigError;
use chrono::Utc;
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;

/// Cron format: second minute hour day month weekday.
///
/// Only intervals that split a minute, an hour or a day evenly map onto a
/// cron step with a constant gap between ticks; anything else is `None`.
pub fn cron_expression(interval_seconds: u64) -> Option<String> {
    match interval_seconds {
        0 => None,
        s if s < 60 => (60 % s == 0).then(|| format!("*/{} * * * * *", s)),
        s if s < 3600 => {
            (s % 60 == 0 && 60 % (s / 60) == 0).then(|| format!("0 */{} * * * *", s / 60))
        }
        86_400 => Some("0 0 0 * * *".to_string()),
        s if s < 86_400 => {
            (s % 3600 == 0 && 24 % (s / 3600) == 0).then(|| format!("0 0 */{} * * *", s / 3600))
        }
        _ => None,
    }
}

/// Wall-clock aligned ticks for the scan loop
#[derive(Debug, Clone)]
pub struct ScanSchedule {
    expression: String,
    schedule: Schedule,
}

impl ScanSchedule {
    pub fn new(interval_seconds: u64) -> Result<Self, ConfigError> {
        if interval_seconds == 0 {
            return Err(ConfigError::InvalidEnv {
                name: "SCAN_INTERVAL_SECONDS",
                value: "0".to_string(),
                reason: "scanner disabled: interval is 0".to_string(),
            });
        }

        let expression =
            cron_expression(interval_seconds).ok_or_else(|| ConfigError::InvalidEnv {
                name: "SCAN_INTERVAL_SECONDS",
                value: interval_seconds.to_string(),
                reason: "interval must divide a minute, an hour or a day evenly".to_string(),
            })?;
        let schedule = Schedule::from_str(&expression).map_err(|e| ConfigError::InvalidEnv {
            name: "SCAN_INTERVAL_SECONDS",
            value: interval_seconds.to_string(),
            reason: format!("invalid cron expression '{}': {}", expression, e),
        })?;

        Ok(Self {
            expression,
            schedule,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Time until the next tick, or `None` if the schedule is exhausted
    pub fn next_delay(&self) -> Option<Duration> {
        let next = self.schedule.upcoming(Utc).next()?;
        Some((next - Utc::now()).to_std().unwrap_or_default())
    }
}

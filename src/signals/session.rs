//! Daily trading session filter

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Daily window, in a fixed UTC offset, during which observations are evaluated.
///
/// Both ends are inclusive. `end` earlier than `start` means the session wraps
/// past midnight (e.g. 21:00-00:30).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSession {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub utc_offset_minutes: i32,
}

impl TradingSession {
    pub fn new(start: NaiveTime, end: NaiveTime, utc_offset_minutes: i32) -> Self {
        Self {
            start,
            end,
            utc_offset_minutes,
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let local = (timestamp + Duration::minutes(i64::from(self.utc_offset_minutes))).time();
        if self.start <= self.end {
            local >= self.start && local <= self.end
        } else {
            local >= self.start || local <= self.end
        }
    }
}

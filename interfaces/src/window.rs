use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Caller-selected lookback window used to bound upstream queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Week,
    Month,
    Quarter,
}

impl TimeWindow {
    pub fn days(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }

    /// `[start, end]` ending at `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - Duration::days(self.days()), now)
    }

    pub fn contains(&self, now: DateTime<Utc>, ts: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds(now);
        ts >= start && ts <= end
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::Month
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('d') {
            "7" => Ok(Self::Week),
            "30" => Ok(Self::Month),
            "90" => Ok(Self::Quarter),
            other => Err(format!("unsupported window '{other}', expected 7, 30 or 90 days")),
        }
    }
}

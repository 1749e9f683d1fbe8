//! Persisted statistics records and rollup views
//!
//! Field names on disk are camelCase so existing stores stay readable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::format_duration_ms;

/// One finished bad-posture interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// When the session ended (ms since epoch)
    pub timestamp: i64,
    /// Recorded length in ms, after clamping to active time
    pub duration: i64,
}

impl Session {
    /// `timestamp - duration`
    ///
    /// Matches the actual start only when the session was not clamped; a
    /// clamped session reports a start that is later than when it began.
    pub fn start_timestamp(&self) -> i64 {
        self.timestamp - self.duration
    }

    pub fn end_timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Everything tracked for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: String,
    #[serde(default)]
    pub total_bad_posture_time: i64,
    #[serde(default)]
    pub total_active_time: i64,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub last_active_timestamp: Option<i64>,
}

impl DailyStats {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            total_bad_posture_time: 0,
            total_active_time: 0,
            sessions: Vec::new(),
            last_active_timestamp: None,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_time(&self) -> i64 {
        self.sessions.iter().map(|s| s.duration).sum()
    }

    pub fn bad_percentage(&self) -> f64 {
        percentage(self.total_bad_posture_time, self.total_active_time)
    }

    pub fn summary(&self) -> DailySummary {
        DailySummary {
            bad_time_ms: self.total_bad_posture_time,
            active_time_ms: self.total_active_time,
            percentage: self.bad_percentage(),
            session_count: self.session_count(),
        }
    }
}

/// All days, keyed by "YYYY-MM-DD"
pub type HistoricalStore = BTreeMap<String, DailyStats>;

/// Bad share of active time, clamped to 0..=100
pub fn percentage(bad_ms: i64, active_ms: i64) -> f64 {
    if active_ms <= 0 {
        return 0.0;
    }
    (bad_ms as f64 / active_ms as f64 * 100.0).clamp(0.0, 100.0)
}

/// Today's numbers for the display collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    #[serde(rename = "badTime")]
    pub bad_time_ms: i64,
    #[serde(rename = "activeTime")]
    pub active_time_ms: i64,
    pub percentage: f64,
    pub session_count: usize,
}

impl DailySummary {
    pub fn render(&self) -> String {
        format!(
            "Bad posture: {} of {} ({:.1}%) in {} session{}",
            format_duration_ms(self.bad_time_ms),
            format_duration_ms(self.active_time_ms),
            self.percentage,
            self.session_count,
            if self.session_count == 1 { "" } else { "s" }
        )
    }
}

/// One row of a rollup (a day, an ISO week or a month)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub key: String,
    pub bad_time_ms: i64,
    pub active_time_ms: i64,
    pub session_count: usize,
    pub percentage: f64,
}

/// Aggregate across all stored days
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollup {
    pub total_bad_time_ms: i64,
    pub total_active_time_ms: i64,
    pub session_count: usize,
    pub percentage: f64,
    /// Sorted ascending by key
    pub breakdown: Vec<PeriodStats>,
}

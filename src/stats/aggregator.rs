//! Daily and historical posture statistics
//!
//! Today's record lives in memory and is merged into the persisted history
//! by date key on every write. Storage failures are logged and never reach
//! the caller; the in-memory state carries on.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use crate::consts::{DATE_FORMAT, HISTORY_KEY, MIN_SESSION_MS, TODAY_KEY};
use crate::core::DateFilter;
use crate::error::PostureError;
use crate::stats::store::KvStore;
use crate::stats::types::{
    DailyStats, DailySummary, HistoricalStore, PeriodStats, Rollup, Session, percentage,
};
use crate::utils::{Timezone, parse_date_key};

/// Minimum spacing between persists caused only by active-time updates
const ACTIVE_PERSIST_INTERVAL_MS: i64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday();
    date - chrono::Duration::days(weekday as i64)
}

fn period_key(date_key: &str, period: Period) -> String {
    match (period, parse_date_key(date_key)) {
        (Period::Day, _) | (_, None) => date_key.to_string(),
        (Period::Week, Some(date)) => week_start(date).format(DATE_FORMAT).to_string(),
        (Period::Month, Some(_)) => date_key.get(0..7).unwrap_or(date_key).to_string(),
    }
}

pub struct StatsAggregator<S: KvStore> {
    store: S,
    timezone: Timezone,
    history: HistoricalStore,
    today: Option<DailyStats>,
    last_persist_ms: Option<i64>,
}

impl<S: KvStore> StatsAggregator<S> {
    pub fn new(store: S, timezone: Timezone) -> Self {
        let history = load_history(&store);
        Self {
            store,
            timezone,
            history,
            today: None,
            last_persist_ms: None,
        }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Today's record, created (and persisted) on the first call of a new day
    pub fn today(&mut self, now: i64) -> &DailyStats {
        self.today_mut(now)
    }

    pub(crate) fn today_mut(&mut self, now: i64) -> &mut DailyStats {
        let key = self.timezone.date_key(now);
        let stale = self.today.as_ref().is_none_or(|d| d.date != key);
        if stale {
            if let Some(previous) = &self.today {
                tracing::info!(from = %previous.date, to = %key, "day rolled over");
                // flush pending active time before the old day freezes
                self.persist(now);
            }
            match self.history.get(&key) {
                Some(existing) => self.today = Some(existing.clone()),
                None => {
                    self.today = Some(DailyStats::new(key.clone()));
                    self.persist(now);
                }
            }
        }
        self.today.get_or_insert_with(|| DailyStats::new(key))
    }

    /// Append a finished bad-posture session to today's record
    ///
    /// Returns false when the session is too short to keep.
    pub fn record_session(&mut self, duration: i64, now: i64) -> bool {
        if duration <= MIN_SESSION_MS {
            tracing::debug!(duration, "session below minimum, discarded");
            return false;
        }
        let day = self.today_mut(now);
        day.sessions.push(Session {
            timestamp: now,
            duration,
        });
        day.total_bad_posture_time += duration;
        tracing::info!(
            date = %day.date,
            duration,
            total_bad = day.total_bad_posture_time,
            "bad posture session recorded"
        );
        self.persist(now);
        true
    }

    /// Persist if active-time changes have been pending for a while
    pub(crate) fn persist_if_due(&mut self, now: i64) {
        let due = match self.last_persist_ms {
            Some(last) => now - last >= ACTIVE_PERSIST_INTERVAL_MS || now < last,
            None => true,
        };
        if due {
            self.persist(now);
        }
    }

    /// Write today's record into the stored history (read-merge-write)
    pub fn persist(&mut self, now: i64) {
        self.last_persist_ms = Some(now);
        let Some(today) = self.today.clone() else {
            return;
        };

        let stored = load_history(&self.store);
        self.history.extend(stored);
        self.history.insert(today.date.clone(), today.clone());

        write_json(&mut self.store, HISTORY_KEY, &self.history);
        write_json(&mut self.store, TODAY_KEY, &today);
    }

    /// Stored days plus today's in-memory record
    pub fn history(&self) -> HistoricalStore {
        let mut all = self.history.clone();
        if let Some(today) = &self.today {
            all.insert(today.date.clone(), today.clone());
        }
        all
    }

    pub fn daily_summary(&mut self, now: i64) -> DailySummary {
        self.today(now).summary()
    }

    /// Totals across every stored day, with a per-day breakdown
    pub fn rollup(&self) -> Rollup {
        self.rollup_filtered(&DateFilter::default())
    }

    pub fn rollup_filtered(&self, filter: &DateFilter) -> Rollup {
        self.rollup_inner(filter, Period::Day)
    }

    pub fn rollup_by_period(&self, filter: &DateFilter, period: Period) -> Rollup {
        self.rollup_inner(filter, period)
    }

    fn rollup_inner(&self, filter: &DateFilter, period: Period) -> Rollup {
        let mut buckets: BTreeMap<String, (i64, i64, usize)> = BTreeMap::new();
        let mut rollup = Rollup::default();

        for (date, day) in self.history() {
            if let Some(parsed) = parse_date_key(&date)
                && !filter.contains(parsed)
            {
                continue;
            }
            rollup.total_bad_time_ms += day.total_bad_posture_time;
            rollup.total_active_time_ms += day.total_active_time;
            rollup.session_count += day.session_count();

            let entry = buckets.entry(period_key(&date, period)).or_default();
            entry.0 += day.total_bad_posture_time;
            entry.1 += day.total_active_time;
            entry.2 += day.session_count();
        }

        rollup.percentage = percentage(rollup.total_bad_time_ms, rollup.total_active_time_ms);
        rollup.breakdown = buckets
            .into_iter()
            .map(|(key, (bad, active, sessions))| PeriodStats {
                key,
                bad_time_ms: bad,
                active_time_ms: active,
                session_count: sessions,
                percentage: percentage(bad, active),
            })
            .collect();
        rollup
    }
}

fn load_history<S: KvStore>(store: &S) -> HistoricalStore {
    let raw = match store.get(HISTORY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return HistoricalStore::new(),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to empty history");
            return HistoricalStore::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(history) => history,
        Err(e) => {
            let e = PostureError::StorageRead {
                key: HISTORY_KEY.to_string(),
                reason: e.to_string(),
            };
            tracing::warn!(error = %e, "falling back to empty history");
            HistoricalStore::new()
        }
    }
}

fn write_json<S: KvStore, T: serde::Serialize>(store: &mut S, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(|e| PostureError::StorageWrite {
            key: key.to_string(),
            reason: e.to_string(),
        })
        .and_then(|json| store.set(key, &json));
    if let Err(e) = result {
        tracing::warn!(error = %e, "keeping statistics in memory only");
    }
}

//! Bad-posture session state machine and active-time bookkeeping
//!
//! The tracker owns the open-session timestamps; the totals it maintains
//! live in today's `DailyStats` inside the aggregator.

use crate::consts::ACTIVE_GAP_MS;
use crate::core::types::PostureVerdict;
use crate::stats::{KvStore, Session, StatsAggregator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerState {
    #[default]
    Good,
    Bad,
}

/// Active time contributed by a tick `now` following one at `last`
///
/// Deltas of `ACTIVE_GAP_MS` or more are gaps (backgrounded tab, sleep) and
/// count for nothing, as do non-positive deltas.
pub fn active_delta(last: Option<i64>, now: i64) -> i64 {
    match last {
        Some(last) if now > last && now - last < ACTIVE_GAP_MS => now - last,
        _ => 0,
    }
}

/// What one tick did to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackerUpdate {
    pub state: TrackerState,
    /// Time spent in the current bad stretch, while Bad
    pub elapsed_bad_ms: Option<i64>,
    pub active_added_ms: i64,
    /// Session persisted by a Bad -> Good transition on this tick
    pub recorded: Option<Session>,
}

#[derive(Debug, Default)]
pub struct SessionTracker {
    state: TrackerState,
    bad_posture_start: Option<i64>,
    session_start: Option<i64>,
    running: bool,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn elapsed_bad_ms(&self, now: i64) -> Option<i64> {
        self.bad_posture_start.map(|start| (now - start).max(0))
    }

    /// Account active time for a tick at `now`
    pub fn record_active<S: KvStore>(&mut self, now: i64, stats: &mut StatsAggregator<S>) -> i64 {
        if !self.running {
            return 0;
        }
        let day = stats.today_mut(now);
        let added = active_delta(day.last_active_timestamp, now);
        if added == 0
            && let Some(last) = day.last_active_timestamp
            && now - last >= ACTIVE_GAP_MS
        {
            tracing::debug!(gap_ms = now - last, "tick gap, active time not counted");
        }
        day.total_active_time += added;
        day.last_active_timestamp = Some(now);
        stats.persist_if_due(now);
        added
    }

    /// Feed one tick: active time first, then the verdict if there is one
    ///
    /// A missing verdict (no pose) leaves the state machine untouched.
    pub fn tick<S: KvStore>(
        &mut self,
        verdict: Option<PostureVerdict>,
        now: i64,
        stats: &mut StatsAggregator<S>,
    ) -> TrackerUpdate {
        let active_added_ms = self.record_active(now, stats);
        let recorded = match verdict {
            Some(verdict) => self.observe(verdict, now, stats),
            None => None,
        };
        TrackerUpdate {
            state: self.state,
            elapsed_bad_ms: self.elapsed_bad_ms(now),
            active_added_ms,
            recorded,
        }
    }

    /// Apply a verdict; returns the session a Bad -> Good transition recorded
    pub fn observe<S: KvStore>(
        &mut self,
        verdict: PostureVerdict,
        now: i64,
        stats: &mut StatsAggregator<S>,
    ) -> Option<Session> {
        match (self.state, verdict) {
            (TrackerState::Good, PostureVerdict::Bad) => {
                self.state = TrackerState::Bad;
                self.bad_posture_start = Some(now);
                self.session_start = Some(now);
                tracing::debug!(at = now, "bad posture started");
                None
            }
            (TrackerState::Bad, PostureVerdict::Good) => {
                let recorded = self.close_session(now, stats);
                self.state = TrackerState::Good;
                recorded
            }
            _ => None,
        }
    }

    /// Stop detection: flush an open bad session and forget the last tick
    pub fn stop<S: KvStore>(&mut self, now: i64, stats: &mut StatsAggregator<S>) -> Option<Session> {
        let recorded = if self.state == TrackerState::Bad {
            self.close_session(now, stats)
        } else {
            None
        };
        self.state = TrackerState::Good;
        self.running = false;

        stats.today_mut(now).last_active_timestamp = None;
        stats.persist(now);
        recorded
    }

    /// Clamp the open session to the untracked active time and record it
    fn close_session<S: KvStore>(&mut self, now: i64, stats: &mut StatsAggregator<S>) -> Option<Session> {
        let start = self.session_start.take()?;
        self.bad_posture_start = None;

        let mut duration = now - start;
        let day = stats.today_mut(now);
        if day.total_bad_posture_time + duration > day.total_active_time {
            let clamped = (day.total_active_time - day.total_bad_posture_time).max(0);
            tracing::debug!(raw = duration, clamped, "session clamped to active time");
            duration = clamped;
        }

        if stats.record_session(duration, now) {
            Some(Session {
                timestamp: now,
                duration,
            })
        } else {
            None
        }
    }
}

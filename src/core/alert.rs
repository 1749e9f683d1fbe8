//! Throttled bad-posture alerts

use crate::error::{PostureError, PostureResult};

/// Plays the notification sound; implemented by the host
pub trait AlertSink {
    fn play(&mut self) -> PostureResult<()>;
}

/// Sink for hosts without audio
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl AlertSink for SilentSink {
    fn play(&mut self) -> PostureResult<()> {
        Ok(())
    }
}

impl<F> AlertSink for F
where
    F: FnMut() -> PostureResult<()>,
{
    fn play(&mut self) -> PostureResult<()> {
        self()
    }
}

/// Outcome of one alert evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    /// Conditions not met
    Idle,
    /// Interval elapsed and the sound was requested
    Played,
    /// Interval elapsed but alerts are switched off; still counts as fired
    Muted,
}

impl AlertDecision {
    pub fn fired(self) -> bool {
        self != AlertDecision::Idle
    }
}

#[derive(Debug)]
pub struct AlertScheduler {
    last_alert_time: Option<i64>,
    enabled: bool,
}

impl Default for AlertScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertScheduler {
    pub fn new() -> Self {
        Self {
            last_alert_time: None,
            enabled: true,
        }
    }

    pub fn last_alert_time(&self) -> Option<i64> {
        self.last_alert_time
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip the alert switch, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Whether an alert is due, without side effects
    pub fn is_due(&self, elapsed_bad_ms: i64, interval_ms: i64, now: i64) -> bool {
        elapsed_bad_ms >= interval_ms
            && self
                .last_alert_time
                .is_none_or(|last| now - last >= interval_ms)
    }

    /// Evaluate the current bad stretch and play the alert when due
    ///
    /// Playback failures are logged; the alert still counts as fired.
    pub fn evaluate(
        &mut self,
        elapsed_bad_ms: Option<i64>,
        interval_ms: i64,
        now: i64,
        sink: &mut dyn AlertSink,
    ) -> AlertDecision {
        let Some(elapsed) = elapsed_bad_ms else {
            return AlertDecision::Idle;
        };
        if !self.is_due(elapsed, interval_ms, now) {
            return AlertDecision::Idle;
        }

        self.last_alert_time = Some(now);
        if !self.enabled {
            tracing::debug!(elapsed, "alert due but alerts are disabled");
            return AlertDecision::Muted;
        }

        tracing::info!(elapsed, "bad posture alert");
        if let Err(e) = sink.play() {
            let e = match e {
                PostureError::Playback(_) => e,
                other => PostureError::Playback(other.to_string()),
            };
            tracing::warn!(error = %e, "alert playback failed");
        }
        AlertDecision::Played
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(usize);

    impl AlertSink for Counter {
        fn play(&mut self) -> PostureResult<()> {
            self.0 += 1;
            Ok(())
        }
    }

    /// Continuous bad stretch starting at 0, ticking every `step` ms
    fn alert_times(scheduler: &mut AlertScheduler, until: i64, step: i64, interval: i64) -> Vec<i64> {
        let mut sink = Counter(0);
        let mut fired = Vec::new();
        let mut t = 0;
        while t <= until {
            if scheduler.evaluate(Some(t), interval, t, &mut sink).fired() {
                fired.push(t);
            }
            t += step;
        }
        fired
    }

    #[test]
    fn fires_exactly_at_interval() {
        let mut scheduler = AlertScheduler::new();
        assert_eq!(alert_times(&mut scheduler, 10_000, 100, 10_000), vec![10_000]);
    }

    #[test]
    fn fires_once_per_interval_while_bad() {
        let mut scheduler = AlertScheduler::new();
        let fired = alert_times(&mut scheduler, 35_000, 200, 10_000);
        assert_eq!(fired, vec![10_000, 20_000, 30_000]);
    }

    #[test]
    fn no_alert_without_bad_stretch() {
        let mut scheduler = AlertScheduler::new();
        let mut sink = Counter(0);
        let decision = scheduler.evaluate(None, 1_000, 50_000, &mut sink);
        assert_eq!(decision, AlertDecision::Idle);
        assert_eq!(sink.0, 0);
    }

    #[test]
    fn disabled_alerts_still_update_bookkeeping() {
        let mut scheduler = AlertScheduler::new();
        assert!(!scheduler.toggle());
        let mut sink = Counter(0);
        let decision = scheduler.evaluate(Some(10_000), 10_000, 10_000, &mut sink);
        assert_eq!(decision, AlertDecision::Muted);
        assert_eq!(sink.0, 0);
        assert_eq!(scheduler.last_alert_time(), Some(10_000));

        // re-enabling does not make the same interval eligible again
        scheduler.set_enabled(true);
        let decision = scheduler.evaluate(Some(12_000), 10_000, 12_000, &mut sink);
        assert_eq!(decision, AlertDecision::Idle);
    }

    #[test]
    fn playback_failure_still_counts() {
        let mut scheduler = AlertScheduler::new();
        let mut failing = || -> PostureResult<()> { Err(PostureError::Playback("no device".into())) };
        let decision = scheduler.evaluate(Some(5_000), 5_000, 5_000, &mut failing);
        assert_eq!(decision, AlertDecision::Played);
        assert_eq!(scheduler.last_alert_time(), Some(5_000));
        assert!(!scheduler.is_due(5_000, 5_000, 6_000));
    }

    #[test]
    fn re_entering_bad_needs_a_full_interval() {
        let mut scheduler = AlertScheduler::new();
        let mut sink = Counter(0);
        scheduler.evaluate(Some(10_000), 10_000, 10_000, &mut sink);
        // back to good at 11s, bad again from 12s
        for t in (12_000..22_000).step_by(500) {
            let elapsed = t - 12_000;
            assert!(!scheduler.evaluate(Some(elapsed), 10_000, t, &mut sink).fired());
        }
        assert!(scheduler.evaluate(Some(10_000), 10_000, 22_000, &mut sink).fired());
        assert_eq!(sink.0, 2);
    }
}

//! Posture monitoring session
//!
//! `PostureMonitor` owns every piece of mutable state (config, tracker,
//! alert throttle, statistics) so hosts can run several independent
//! instances. The host decides when ticks happen; each tick goes through
//! `process_tick`.

use serde::Serialize;

use crate::config::{Config, Settings, load_config, reset_config, save_config};
use crate::consts::{NO_POSE_MESSAGE, THROUGHPUT_LOG_EVERY};
use crate::core::{
    AlertDecision, AlertScheduler, AlertSink, AngleSet, DateFilter, LandmarkFrame,
    PostureVerdict, SessionTracker, TrackerState, angle_summary, classify, compute_angles,
    status_text,
};
use crate::error::PostureResult;
use crate::schedule::{FrameInbox, FrameSource, ReplaySource, TickStrategy};
use crate::stats::{
    DailyStats, DailySummary, HistoricalStore, KvStore, Period, Rollup, Session, StatsAggregator,
};
use crate::utils::Timezone;

/// What the display collaborator gets for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TickReport {
    /// Detection is not running; nothing was done
    Idle,
    /// Tick older than the previous one; ignored
    OutOfOrder,
    /// No usable landmarks this tick
    NoPose { error: String },
    #[serde(rename_all = "camelCase")]
    Posture {
        verdict: PostureVerdict,
        angles: AngleSet,
        status: String,
        angle_summary: String,
        elapsed_bad_secs: Option<u64>,
        alert: bool,
        recorded: Option<Session>,
    },
}

#[derive(Debug, Default)]
struct Throughput {
    processed: u64,
    out_of_order: u64,
    window_start: Option<i64>,
}

impl Throughput {
    fn record(&mut self, now: i64) {
        self.processed += 1;
        let start = *self.window_start.get_or_insert(now);
        if self.processed % THROUGHPUT_LOG_EVERY == 0 {
            let span_ms = (now - start).max(1);
            let fps = THROUGHPUT_LOG_EVERY as f64 * 1000.0 / span_ms as f64;
            tracing::debug!(
                frames = self.processed,
                fps = (fps * 10.0).round() / 10.0,
                span_ms,
                "tick throughput"
            );
            self.window_start = Some(now);
        }
    }
}

pub struct PostureMonitor<S: KvStore, A: AlertSink> {
    config: Config,
    defaults: Config,
    tracker: SessionTracker,
    alerts: AlertScheduler,
    stats: StatsAggregator<S>,
    sink: A,
    last_tick: Option<i64>,
    throughput: Throughput,
}

impl<S: KvStore, A: AlertSink> PostureMonitor<S, A> {
    pub fn new(store: S, sink: A, timezone: Timezone) -> Self {
        Self::build(store, sink, timezone, Config::default(), true)
    }

    /// Monitor using a host settings file for defaults and timezone
    pub fn with_settings(store: S, sink: A, settings: &Settings) -> PostureResult<Self> {
        let timezone = settings.timezone()?;
        Ok(Self::build(
            store,
            sink,
            timezone,
            settings.defaults(),
            settings.alerts_enabled.unwrap_or(true),
        ))
    }

    fn build(store: S, sink: A, timezone: Timezone, defaults: Config, alerts_enabled: bool) -> Self {
        let stats = StatsAggregator::new(store, timezone);
        let config = load_config(stats.store(), defaults);
        let mut alerts = AlertScheduler::new();
        alerts.set_enabled(alerts_enabled);
        Self {
            config,
            defaults,
            tracker: SessionTracker::new(),
            alerts,
            stats,
            sink,
            last_tick: None,
            throughput: Throughput::default(),
        }
    }

    // --- lifecycle ---

    /// Start the frame source, then begin tracking
    ///
    /// A source that cannot start leaves the monitor stopped; retrying is fine.
    pub fn start(&mut self, source: &mut dyn FrameSource) -> PostureResult<()> {
        if let Err(e) = source.start() {
            tracing::warn!(error = %e, "detection could not start");
            return Err(e);
        }
        self.activate();
        Ok(())
    }

    /// Begin tracking for hosts that push frames themselves
    pub fn activate(&mut self) {
        if self.tracker.is_running() {
            return;
        }
        self.tracker.start();
        self.last_tick = None;
        tracing::info!(
            threshold = self.config.max_good_angle_degrees,
            alert_interval_ms = self.config.alert_interval_ms,
            speed = ?self.config.processing_speed,
            "detection started"
        );
    }

    pub fn is_running(&self) -> bool {
        self.tracker.is_running()
    }

    /// Stop tracking; an open bad session is flushed first
    pub fn stop(&mut self, now: i64) -> Option<Session> {
        if !self.tracker.is_running() {
            return None;
        }
        let flushed = self.tracker.stop(now, &mut self.stats);
        tracing::info!(
            frames = self.throughput.processed,
            flushed = flushed.map(|s| s.duration),
            "detection stopped"
        );
        flushed
    }

    /// `stop`, then release the frame source
    pub fn shutdown(&mut self, source: &mut dyn FrameSource, now: i64) -> Option<Session> {
        let flushed = self.stop(now);
        source.stop();
        flushed
    }

    // --- ticks ---

    /// Run one tick with whatever the detector produced at `now`
    pub fn process_tick(&mut self, frame: Option<&LandmarkFrame>, now: i64) -> TickReport {
        if !self.tracker.is_running() {
            return TickReport::Idle;
        }
        if let Some(last) = self.last_tick
            && now < last
        {
            self.throughput.out_of_order += 1;
            tracing::warn!(now, last, "tick older than previous one, dropped");
            return TickReport::OutOfOrder;
        }
        self.last_tick = Some(now);
        self.throughput.record(now);

        let angles = match frame {
            None => Err(NO_POSE_MESSAGE.to_string()),
            Some(frame) => compute_angles(frame).map_err(|e| e.to_string()),
        };
        let threshold = self.config.max_good_angle_degrees;
        let classified = angles.and_then(|angles| {
            classify(&angles, threshold)
                .map(|verdict| (angles, verdict))
                .map_err(|e| e.to_string())
        });

        let verdict = classified.as_ref().ok().map(|(_, verdict)| *verdict);
        let update = self.tracker.tick(verdict, now, &mut self.stats);
        // no pose in view: the bad stretch keeps running but nothing sounds
        let decision = match verdict {
            Some(_) => self.alerts.evaluate(
                update.elapsed_bad_ms,
                self.config.alert_interval_ms,
                now,
                &mut self.sink,
            ),
            None => AlertDecision::Idle,
        };

        match classified {
            Err(error) => {
                tracing::debug!(now, %error, "no usable pose");
                TickReport::NoPose { error }
            }
            Ok((angles, verdict)) => {
                tracing::debug!(
                    now,
                    ?verdict,
                    right = angles.right,
                    left = angles.left,
                    "posture classified"
                );
                TickReport::Posture {
                    verdict,
                    status: status_text(&angles, verdict),
                    angle_summary: angle_summary(&angles, threshold),
                    angles,
                    elapsed_bad_secs: update.elapsed_bad_ms.map(|ms| (ms / 1000) as u64),
                    alert: decision == AlertDecision::Played,
                    recorded: update.recorded,
                }
            }
        }
    }

    /// Pull one frame from `source` and process it
    pub fn poll(&mut self, source: &mut dyn FrameSource, now: i64) -> PostureResult<TickReport> {
        let frame = source.next_frame()?;
        Ok(self.process_tick(frame.as_ref(), now))
    }

    /// Wait for the next pushed frame and process it
    pub fn pump(&mut self, inbox: &FrameInbox, timeout: std::time::Duration) -> Option<TickReport> {
        let pushed = inbox.recv_timeout(timeout)?;
        Some(self.process_tick(pushed.frame.as_ref(), pushed.timestamp))
    }

    /// Feed every recorded tick in order, using the recorded timestamps
    pub fn replay(&mut self, source: &mut ReplaySource) -> Vec<TickReport> {
        let mut reports = Vec::with_capacity(source.remaining());
        while let Some(tick) = source.next_tick() {
            reports.push(self.process_tick(tick.frame.as_ref(), tick.timestamp));
        }
        reports
    }

    pub fn tick_strategy(&self) -> TickStrategy {
        TickStrategy::from(self.config.processing_speed)
    }

    pub fn state(&self) -> TrackerState {
        self.tracker.state()
    }

    pub fn elapsed_bad_ms(&self, now: i64) -> Option<i64> {
        self.tracker.elapsed_bad_ms(now)
    }

    pub fn frames_processed(&self) -> u64 {
        self.throughput.processed
    }

    pub fn frames_out_of_order(&self) -> u64 {
        self.throughput.out_of_order
    }

    // --- config & alerts ---

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate, persist and apply a new config
    pub fn update_config(&mut self, config: Config) -> PostureResult<()> {
        save_config(self.stats.store_mut(), &config)?;
        tracing::info!(?config, "config updated");
        self.config = config;
        Ok(())
    }

    pub fn reset_config(&mut self) -> Config {
        self.config = reset_config(self.stats.store_mut(), self.defaults);
        self.config
    }

    pub fn alerts_enabled(&self) -> bool {
        self.alerts.is_enabled()
    }

    pub fn set_alerts_enabled(&mut self, enabled: bool) {
        self.alerts.set_enabled(enabled);
    }

    pub fn toggle_alerts(&mut self) -> bool {
        self.alerts.toggle()
    }

    pub fn last_alert_time(&self) -> Option<i64> {
        self.alerts.last_alert_time()
    }

    // --- statistics ---

    pub fn today(&mut self, now: i64) -> &DailyStats {
        self.stats.today(now)
    }

    pub fn daily_summary(&mut self, now: i64) -> DailySummary {
        self.stats.daily_summary(now)
    }

    pub fn history(&self) -> HistoricalStore {
        self.stats.history()
    }

    pub fn rollup(&self) -> Rollup {
        self.stats.rollup()
    }

    pub fn rollup_by_period(&self, filter: &DateFilter, period: Period) -> Rollup {
        self.stats.rollup_by_period(filter, period)
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }
}

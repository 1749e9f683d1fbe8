//! Frame sources and tick scheduling
//!
//! The pose detector sits behind `FrameSource` (pull) or `FrameMailbox`
//! (push). Which one drives ticks, and how often, is the host's choice.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Duration;

use crate::config::ProcessingSpeed;
use crate::core::LandmarkFrame;
use crate::error::{PostureError, PostureResult};

/// How ticks are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStrategy {
    /// One tick per frame the detector delivers
    FrameSynchronized,
    /// One tick per fixed interval, using the most recent frame
    Interval(Duration),
}

impl From<ProcessingSpeed> for TickStrategy {
    fn from(speed: ProcessingSpeed) -> Self {
        match speed.tick_interval() {
            Some(interval) => TickStrategy::Interval(interval),
            None => TickStrategy::FrameSynchronized,
        }
    }
}

/// Upstream pose detector, polled once per tick
pub trait FrameSource {
    /// Acquire the camera/model; `InputUnavailable` when that is impossible
    fn start(&mut self) -> PostureResult<()> {
        Ok(())
    }

    /// Landmarks for the next tick; `Ok(None)` when no pose was detected
    fn next_frame(&mut self) -> PostureResult<Option<LandmarkFrame>>;

    fn stop(&mut self) {}
}

/// One recorded tick: when it happened and what the detector saw
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayTick {
    pub timestamp: i64,
    pub frame: Option<LandmarkFrame>,
}

/// Deterministic source replaying a recorded or synthetic sequence
#[derive(Debug, Default)]
pub struct ReplaySource {
    ticks: VecDeque<ReplayTick>,
    unavailable: Option<String>,
    started: bool,
}

impl ReplaySource {
    pub fn new(ticks: impl IntoIterator<Item = ReplayTick>) -> Self {
        Self {
            ticks: ticks.into_iter().collect(),
            unavailable: None,
            started: false,
        }
    }

    /// A source whose `start` always fails, like a denied camera
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn push(&mut self, timestamp: i64, frame: Option<LandmarkFrame>) {
        self.ticks.push_back(ReplayTick { timestamp, frame });
    }

    /// Timestamp of the tick `next_frame` will return
    pub fn peek_timestamp(&self) -> Option<i64> {
        self.ticks.front().map(|t| t.timestamp)
    }

    pub fn remaining(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Next tick with its timestamp
    pub fn next_tick(&mut self) -> Option<ReplayTick> {
        self.ticks.pop_front()
    }
}

impl FrameSource for ReplaySource {
    fn start(&mut self) -> PostureResult<()> {
        if let Some(reason) = &self.unavailable {
            return Err(PostureError::input_unavailable(reason.clone()));
        }
        self.started = true;
        Ok(())
    }

    fn next_frame(&mut self) -> PostureResult<Option<LandmarkFrame>> {
        Ok(self.ticks.pop_front().and_then(|t| t.frame))
    }

    fn stop(&mut self) {
        self.started = false;
    }
}

/// A frame pushed by the detector, stamped on arrival
#[derive(Debug, Clone, PartialEq)]
pub struct PushedFrame {
    pub timestamp: i64,
    pub frame: Option<LandmarkFrame>,
}

/// Producer half of a drop-on-busy frame hand-off
///
/// `offer` succeeds only while the consumer is blocked waiting for a frame;
/// frames arriving during a tick are dropped, never queued.
#[derive(Debug, Clone)]
pub struct FrameMailbox {
    tx: SyncSender<PushedFrame>,
    dropped: Arc<AtomicU64>,
}

/// Consumer half, owned by whoever runs the ticks
#[derive(Debug)]
pub struct FrameInbox {
    rx: Receiver<PushedFrame>,
    dropped: Arc<AtomicU64>,
}

pub fn frame_mailbox() -> (FrameMailbox, FrameInbox) {
    let (tx, rx) = mpsc::sync_channel(0);
    let dropped = Arc::new(AtomicU64::new(0));
    (
        FrameMailbox {
            tx,
            dropped: Arc::clone(&dropped),
        },
        FrameInbox { rx, dropped },
    )
}

impl FrameMailbox {
    /// Hand a frame over; false if the consumer was busy (or gone)
    pub fn offer(&self, timestamp: i64, frame: Option<LandmarkFrame>) -> bool {
        match self.tx.try_send(PushedFrame { timestamp, frame }) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl FrameInbox {
    /// Wait up to `timeout` for the next frame
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PushedFrame> {
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Some(frame),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn strategy_from_speed() {
        assert_eq!(
            TickStrategy::from(ProcessingSpeed::Fast),
            TickStrategy::FrameSynchronized
        );
        assert_eq!(
            TickStrategy::from(ProcessingSpeed::Medium),
            TickStrategy::Interval(Duration::from_millis(200))
        );
        assert_eq!(
            TickStrategy::from(ProcessingSpeed::Slow),
            TickStrategy::Interval(Duration::from_millis(500))
        );
    }

    #[test]
    fn replay_yields_in_order() {
        let frame = LandmarkFrame::default();
        let mut source = ReplaySource::new([
            ReplayTick {
                timestamp: 0,
                frame: Some(frame.clone()),
            },
            ReplayTick {
                timestamp: 200,
                frame: None,
            },
        ]);
        source.start().unwrap();
        assert!(source.is_started());
        assert_eq!(source.peek_timestamp(), Some(0));
        assert_eq!(source.next_frame().unwrap(), Some(frame));
        assert_eq!(source.peek_timestamp(), Some(200));
        assert_eq!(source.next_frame().unwrap(), None);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn unavailable_source_fails_start() {
        let mut source = ReplaySource::unavailable("camera permission denied");
        let err = source.start().unwrap_err();
        assert!(err.is_user_facing());
        assert!(!source.is_started());
    }

    #[test]
    fn mailbox_drops_when_nobody_waits() {
        let (mailbox, inbox) = frame_mailbox();
        assert!(!mailbox.offer(0, None));
        assert!(!mailbox.offer(1, None));
        assert_eq!(inbox.dropped(), 2);
        assert_eq!(inbox.recv_timeout(Duration::from_millis(10)), None);
    }

    #[test]
    fn mailbox_delivers_to_waiting_consumer() {
        let (mailbox, inbox) = frame_mailbox();
        let producer = thread::spawn(move || {
            // keep offering until the consumer is parked in recv
            let mut attempts = 0;
            while !mailbox.offer(42, None) {
                attempts += 1;
                thread::sleep(Duration::from_millis(1));
            }
            attempts
        });
        let received = inbox.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(received.timestamp, 42);
        let attempts = producer.join().unwrap();
        assert_eq!(inbox.dropped(), attempts);
    }
}

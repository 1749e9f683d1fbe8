//! posturewatch - forward-head posture tracking core
//!
//! Turns a stream of pose-landmark frames into per-tick good/bad verdicts,
//! bad-posture sessions, throttled alerts and persisted daily statistics.
//! Camera access, the landmark model, audio and UI belong to the host.
//!
//! ```no_run
//! use posturewatch::{PostureMonitor, MemoryStore, SilentSink, Timezone};
//!
//! let mut monitor = PostureMonitor::new(MemoryStore::new(), SilentSink, Timezone::Local);
//! monitor.activate();
//! let report = monitor.process_tick(None, 1_772_442_000_000);
//! println!("{report:?}");
//! ```

pub mod config;
pub mod consts;
pub mod core;
pub mod error;
pub mod monitor;
pub mod schedule;
pub mod stats;
pub mod utils;

pub use crate::config::{Config, ProcessingSpeed, Settings};
pub use crate::core::{
    AlertSink, AngleSet, Landmark, LandmarkFrame, PostureVerdict, SilentSink, TrackerState,
};
pub use crate::error::{PostureError, PostureResult};
pub use crate::monitor::{PostureMonitor, TickReport};
pub use crate::schedule::{FrameInbox, FrameMailbox, FrameSource, ReplaySource, ReplayTick, TickStrategy, frame_mailbox};
pub use crate::stats::{DailyStats, DailySummary, FileStore, KvStore, MemoryStore, Rollup, Session};
pub use crate::utils::Timezone;

//! Core module - per-tick posture pipeline
//!
//! frame -> angles -> verdict -> session tracker, with alerts fed from the
//! tracker's live bad duration.

mod alert;
mod angle;
mod classifier;
mod tracker;
mod types;

pub use alert::{AlertDecision, AlertScheduler, AlertSink, SilentSink};
pub use angle::{compute_angles, side_angle};
pub use classifier::{angle_summary, classify, status_text};
pub use tracker::{SessionTracker, TrackerState, TrackerUpdate, active_delta};
pub use types::{AngleSet, DateFilter, Landmark, LandmarkFrame, PostureVerdict, Side};

#[cfg(test)]
pub(crate) use angle::tests::neck_frame;

/// Date key format for daily records: "2025-01-15"
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// MediaPipe pose topology indices
pub const LEFT_EAR: usize = 7;
pub const RIGHT_EAR: usize = 8;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;

/// A side counts only when both of its landmarks are more visible than this
pub const MIN_VISIBILITY: f64 = 0.5;
/// Floor for the vertical ear/shoulder extent
pub const MIN_VERTICAL_EXTENT: f64 = 0.001;
/// Angles at or below this are rendered as "Excellent"/"Perfect"
pub const EXCELLENT_ANGLE_DEGREES: f64 = 5.0;

/// Bad-posture sessions must be strictly longer than this to be kept
pub const MIN_SESSION_MS: i64 = 1000;
/// Tick deltas at or above this are gaps, not active time
pub const ACTIVE_GAP_MS: i64 = 5000;

/// Processed frames between throughput log lines
pub const THROUGHPUT_LOG_EVERY: u64 = 30;

pub const CONFIG_KEY: &str = "postureConfig";
pub const HISTORY_KEY: &str = "postureHistory";
pub const TODAY_KEY: &str = "postureStats";

pub const NO_POSE_MESSAGE: &str = "No pose detected";

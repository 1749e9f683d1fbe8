//! Per-frame data types
//!
//! Landmarks come from the upstream pose detector and are never mutated here.

use serde::{Deserialize, Serialize};

use crate::consts::{LEFT_EAR, LEFT_SHOULDER, RIGHT_EAR, RIGHT_SHOULDER};

/// One normalized pose landmark (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }
}

/// Ordered landmark sequence for one detected pose
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Ear and shoulder for one side, or None if the frame is too short
    pub fn side(&self, side: Side) -> Option<(Landmark, Landmark)> {
        let (ear, shoulder) = match side {
            Side::Right => (RIGHT_EAR, RIGHT_SHOULDER),
            Side::Left => (LEFT_EAR, LEFT_SHOULDER),
        };
        Some((*self.landmarks.get(ear)?, *self.landmarks.get(shoulder)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Right,
    Left,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Right, Side::Left];
}

/// Forward-head angle in degrees per visible side
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
}

impl AngleSet {
    pub fn get(&self, side: Side) -> Option<f64> {
        match side {
            Side::Right => self.right,
            Side::Left => self.left,
        }
    }

    pub fn insert(&mut self, side: Side, degrees: f64) {
        match side {
            Side::Right => self.right = Some(degrees),
            Side::Left => self.left = Some(degrees),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, f64)> + '_ {
        Side::ALL
            .into_iter()
            .filter_map(|side| self.get(side).map(|angle| (side, angle)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.right.is_none() && self.left.is_none()
    }

    pub fn has_both(&self) -> bool {
        self.right.is_some() && self.left.is_some()
    }

    /// Mean of the present sides, used as the displayed reference angle
    pub fn average(&self) -> Option<f64> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        Some(self.iter().map(|(_, a)| a).sum::<f64>() / n as f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.iter().map(|(_, a)| a).reduce(f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostureVerdict {
    Good,
    Bad,
}

impl PostureVerdict {
    pub fn is_bad(self) -> bool {
        self == PostureVerdict::Bad
    }
}

/// Inclusive date range for rollups
#[derive(Debug, Clone, Default)]
pub struct DateFilter {
    pub since: Option<chrono::NaiveDate>,
    pub until: Option<chrono::NaiveDate>,
}

impl DateFilter {
    pub fn new(since: Option<chrono::NaiveDate>, until: Option<chrono::NaiveDate>) -> Self {
        Self { since, until }
    }

    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        if let Some(s) = self.since
            && date < s
        {
            return false;
        }
        if let Some(u) = self.until
            && date > u
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame_with(len: usize) -> LandmarkFrame {
        LandmarkFrame::new(
            (0..len)
                .map(|i| Landmark::new(i as f64, 0.0, 1.0))
                .collect(),
        )
    }

    // --- LandmarkFrame ---

    #[test]
    fn side_picks_ear_and_shoulder() {
        let frame = frame_with(33);
        let (ear, shoulder) = frame.side(Side::Right).unwrap();
        assert_eq!(ear.x, 8.0);
        assert_eq!(shoulder.x, 12.0);
        let (ear, shoulder) = frame.side(Side::Left).unwrap();
        assert_eq!(ear.x, 7.0);
        assert_eq!(shoulder.x, 11.0);
    }

    #[test]
    fn side_none_for_short_frame() {
        assert!(frame_with(12).side(Side::Right).is_none());
        assert!(frame_with(12).side(Side::Left).is_some());
        assert!(frame_with(0).side(Side::Left).is_none());
    }

    #[test]
    fn frame_deserializes_from_array_ignoring_z() {
        let json = r#"[{"x":0.5,"y":0.25,"z":-0.1,"visibility":0.9},{"x":0.1,"y":0.2}]"#;
        let frame: LandmarkFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.landmarks.len(), 2);
        assert_eq!(frame.landmarks[0], Landmark::new(0.5, 0.25, 0.9));
        assert_eq!(frame.landmarks[1].visibility, 0.0);
    }

    // --- AngleSet ---

    #[test]
    fn angle_set_average_and_len() {
        let mut set = AngleSet::default();
        assert!(set.is_empty());
        assert_eq!(set.average(), None);

        set.insert(Side::Right, 10.0);
        assert_eq!(set.len(), 1);
        assert_eq!(set.average(), Some(10.0));
        assert!(!set.has_both());

        set.insert(Side::Left, 12.0);
        assert_eq!(set.len(), 2);
        assert_eq!(set.average(), Some(11.0));
        assert_eq!(set.max(), Some(12.0));
        assert!(set.has_both());
    }

    #[test]
    fn angle_set_serializes_present_sides_only() {
        let set = AngleSet {
            right: Some(30.0),
            left: None,
        };
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"{"right":30.0}"#);
    }

    // --- DateFilter ---

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn date_filter_no_bounds() {
        let f = DateFilter::new(None, None);
        assert!(f.contains(d(2020, 1, 1)));
        assert!(f.contains(d(2099, 12, 31)));
    }

    #[test]
    fn date_filter_both_bounds_inclusive() {
        let f = DateFilter::new(Some(d(2026, 3, 1)), Some(d(2026, 3, 31)));
        assert!(!f.contains(d(2026, 2, 28)));
        assert!(f.contains(d(2026, 3, 1)));
        assert!(f.contains(d(2026, 3, 31)));
        assert!(!f.contains(d(2026, 4, 1)));
    }
}

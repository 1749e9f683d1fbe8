//! Forward-head angle from ear/shoulder landmarks
//!
//! 0° means the ear sits directly above the shoulder; larger angles mean the
//! head is further forward.

use crate::consts::{MIN_VERTICAL_EXTENT, MIN_VISIBILITY};
use crate::core::types::{AngleSet, Landmark, LandmarkFrame, Side};
use crate::error::{PostureError, PostureResult};

/// Angle for one ear/shoulder pair, ignoring visibility
pub fn side_angle(ear: Landmark, shoulder: Landmark) -> f64 {
    let dx = ear.x - shoulder.x;
    // y grows downward, so this is how far the ear sits above the shoulder
    let dy = shoulder.y - ear.y;
    dx.abs().atan2(dy.max(MIN_VERTICAL_EXTENT)).to_degrees()
}

fn usable(ear: Landmark, shoulder: Landmark) -> bool {
    ear.visibility.min(shoulder.visibility) > MIN_VISIBILITY
        && [ear.x, ear.y, shoulder.x, shoulder.y]
            .iter()
            .all(|v| v.is_finite())
}

/// Angles for every side whose landmarks are both clearly visible
pub fn compute_angles(frame: &LandmarkFrame) -> PostureResult<AngleSet> {
    let mut angles = AngleSet::default();
    for side in Side::ALL {
        if let Some((ear, shoulder)) = frame.side(side)
            && usable(ear, shoulder)
        {
            angles.insert(side, side_angle(ear, shoulder));
        }
    }

    if angles.is_empty() {
        return Err(PostureError::NoAngleAvailable);
    }
    Ok(angles)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::consts::{LEFT_EAR, LEFT_SHOULDER, RIGHT_EAR, RIGHT_SHOULDER};

    /// 33-point frame with only the four neck landmarks populated
    pub(crate) fn neck_frame(
        right: (Landmark, Landmark),
        left: (Landmark, Landmark),
    ) -> LandmarkFrame {
        let mut landmarks = vec![Landmark::default(); 33];
        landmarks[RIGHT_EAR] = right.0;
        landmarks[RIGHT_SHOULDER] = right.1;
        landmarks[LEFT_EAR] = left.0;
        landmarks[LEFT_SHOULDER] = left.1;
        LandmarkFrame::new(landmarks)
    }

    fn lm(x: f64, y: f64, v: f64) -> Landmark {
        Landmark::new(x, y, v)
    }

    #[test]
    fn ear_straight_above_is_zero() {
        assert_eq!(side_angle(lm(0.5, 0.3, 1.0), lm(0.5, 0.6, 1.0)), 0.0);
    }

    #[test]
    fn equal_offsets_give_45_degrees() {
        let angle = side_angle(lm(0.6, 0.4, 1.0), lm(0.5, 0.5, 1.0));
        assert!((angle - 45.0).abs() < 1e-9);
    }

    #[test]
    fn direction_of_lean_does_not_matter() {
        let forward = side_angle(lm(0.6, 0.4, 1.0), lm(0.5, 0.5, 1.0));
        let backward = side_angle(lm(0.4, 0.4, 1.0), lm(0.5, 0.5, 1.0));
        assert_eq!(forward, backward);
    }

    #[test]
    fn ear_below_shoulder_stays_below_180() {
        let angle = side_angle(lm(0.6, 0.9, 1.0), lm(0.5, 0.5, 1.0));
        assert!(angle < 180.0);
        assert!(angle > 89.0);
        // fully level and coincident
        let angle = side_angle(lm(0.5, 0.5, 1.0), lm(0.5, 0.5, 1.0));
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn angles_stay_in_range_over_a_grid() {
        let steps = [-1.0, -0.5, -0.001, 0.0, 0.001, 0.25, 0.5, 1.0, 2.0];
        for ex in steps {
            for ey in steps {
                let angle = side_angle(lm(ex, ey, 1.0), lm(0.0, 0.0, 1.0));
                assert!((0.0..180.0).contains(&angle), "{ex},{ey} -> {angle}");
            }
        }
    }

    #[test]
    fn both_sides_visible() {
        let frame = neck_frame(
            (lm(0.5, 0.3, 0.9), lm(0.5, 0.6, 0.9)),
            (lm(0.6, 0.4, 0.9), lm(0.5, 0.5, 0.9)),
        );
        let angles = compute_angles(&frame).unwrap();
        assert_eq!(angles.right, Some(0.0));
        assert!((angles.left.unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn low_visibility_side_is_dropped() {
        let frame = neck_frame(
            (lm(0.5, 0.3, 0.9), lm(0.5, 0.6, 0.5)),
            (lm(0.6, 0.4, 0.9), lm(0.5, 0.5, 0.51)),
        );
        let angles = compute_angles(&frame).unwrap();
        assert_eq!(angles.right, None);
        assert!(angles.left.is_some());
    }

    #[test]
    fn no_visible_side_fails() {
        let frame = neck_frame(
            (lm(0.5, 0.3, 0.5), lm(0.5, 0.6, 0.9)),
            (lm(0.6, 0.4, 0.2), lm(0.5, 0.5, 0.1)),
        );
        assert!(matches!(
            compute_angles(&frame),
            Err(PostureError::NoAngleAvailable)
        ));
    }

    #[test]
    fn short_frame_fails() {
        let frame = LandmarkFrame::new(vec![lm(0.5, 0.5, 1.0); 5]);
        assert!(matches!(
            compute_angles(&frame),
            Err(PostureError::NoAngleAvailable)
        ));
    }

    #[test]
    fn non_finite_side_is_dropped() {
        let frame = neck_frame(
            (lm(f64::NAN, 0.3, 0.9), lm(0.5, 0.6, 0.9)),
            (lm(0.5, 0.3, 0.9), lm(0.5, 0.6, 0.9)),
        );
        let angles = compute_angles(&frame).unwrap();
        assert_eq!(angles.right, None);
        assert_eq!(angles.left, Some(0.0));
    }
}

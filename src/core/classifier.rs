//! Good/bad verdicts and the status lines shown for them

use crate::consts::EXCELLENT_ANGLE_DEGREES;
use crate::core::types::{AngleSet, PostureVerdict};
use crate::error::{PostureError, PostureResult};
use crate::utils::format_degrees;

/// Bad as soon as any visible side leans further than `threshold`
pub fn classify(angles: &AngleSet, threshold: f64) -> PostureResult<PostureVerdict> {
    if angles.is_empty() {
        return Err(PostureError::NoAngleAvailable);
    }
    if angles.iter().any(|(_, angle)| angle > threshold) {
        Ok(PostureVerdict::Bad)
    } else {
        Ok(PostureVerdict::Good)
    }
}

/// Headline status, e.g. "Good Posture - 11.0° forward"
pub fn status_text(angles: &AngleSet, verdict: PostureVerdict) -> String {
    let reference = angles.average().unwrap_or_default();
    match verdict {
        PostureVerdict::Good if reference <= EXCELLENT_ANGLE_DEGREES => {
            "Excellent Posture!".to_string()
        }
        PostureVerdict::Good => format!("Good Posture - {} forward", format_degrees(reference)),
        PostureVerdict::Bad if angles.has_both() => format!(
            "Bad Posture - {} forward. Pull your head back!",
            format_degrees(reference)
        ),
        PostureVerdict::Bad => format!(
            "Bad Posture - {} forward. Straighten your neck!",
            format_degrees(reference)
        ),
    }
}

/// Detail line, e.g. "Head Position: 11.0° forward (Good) | R: 10.0°, L: 12.0°"
///
/// The Good/Bad tag compares the averaged angle with the threshold, so it can
/// disagree with the verdict when only one side is over.
pub fn angle_summary(angles: &AngleSet, threshold: f64) -> String {
    let Some(reference) = angles.average() else {
        return "Head Position: unknown".to_string();
    };

    let mut text = String::from("Head Position: ");
    if reference <= EXCELLENT_ANGLE_DEGREES {
        text.push_str(&format!("Perfect ({} forward)", format_degrees(reference)));
    } else {
        let tag = if reference <= threshold { "Good" } else { "Bad" };
        text.push_str(&format!("{} forward ({tag})", format_degrees(reference)));
    }

    match (angles.right, angles.left) {
        (Some(r), Some(l)) => text.push_str(&format!(
            " | R: {}, L: {}",
            format_degrees(r),
            format_degrees(l)
        )),
        (Some(_), None) => text.push_str(" (Right side)"),
        (None, Some(_)) => text.push_str(" (Left side)"),
        (None, None) => {}
    }
    text
}

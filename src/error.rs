use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostureError {
    #[error("No clear view of neck angle")]
    NoAngleAvailable,

    #[error("Input unavailable: {reason}")]
    InputUnavailable { reason: String },

    #[error("Failed to read \"{key}\" from storage: {reason}")]
    StorageRead { key: String, reason: String },

    #[error("Failed to write \"{key}\" to storage: {reason}")]
    StorageWrite { key: String, reason: String },

    #[error("Error playing sound: {0}")]
    Playback(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },
}

pub type PostureResult<T> = Result<T, PostureError>;

impl PostureError {
    pub fn input_unavailable(reason: impl Into<String>) -> Self {
        PostureError::InputUnavailable {
            reason: reason.into(),
        }
    }

    /// Only input failures are meant to reach the user; everything else is
    /// logged and absorbed.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, PostureError::InputUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_angle_display() {
        assert_eq!(
            PostureError::NoAngleAvailable.to_string(),
            "No clear view of neck angle"
        );
    }

    #[test]
    fn input_unavailable_display() {
        let e = PostureError::input_unavailable("camera permission denied");
        assert_eq!(e.to_string(), "Input unavailable: camera permission denied");
    }

    #[test]
    fn storage_read_display() {
        let e = PostureError::StorageRead {
            key: "postureHistory".to_string(),
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            e.to_string(),
            r#"Failed to read "postureHistory" from storage: expected value at line 1 column 1"#
        );
    }

    #[test]
    fn timezone_display() {
        let e = PostureError::InvalidTimezone {
            input: "Mars/Olympus".to_string(),
        };
        assert_eq!(e.to_string(), "Invalid timezone: Mars/Olympus");
    }

    #[test]
    fn only_input_errors_are_user_facing() {
        assert!(PostureError::input_unavailable("denied").is_user_facing());
        assert!(!PostureError::NoAngleAvailable.is_user_facing());
        assert!(!PostureError::Playback("device busy".into()).is_user_facing());
        assert!(
            !PostureError::StorageWrite {
                key: "k".into(),
                reason: "disk full".into()
            }
            .is_user_facing()
        );
    }
}

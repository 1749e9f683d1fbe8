use chrono::{Local, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::consts::DATE_FORMAT;
use crate::error::PostureError;

/// Zone that decides which calendar day a timestamp is booked under
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Timezone {
    #[default]
    Local,
    Named(Tz),
}

impl Timezone {
    /// `None`, "" and "local" mean the system zone; "utc"/"z" and IANA names
    /// are looked up in the tz database
    pub fn parse(value: Option<&str>) -> Result<Self, PostureError> {
        let name = value.map(str::trim).unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "" | "local" => Ok(Timezone::Local),
            "utc" | "z" => Ok(Timezone::Named(chrono_tz::UTC)),
            _ => name
                .parse::<Tz>()
                .map(Timezone::Named)
                .map_err(|_| PostureError::InvalidTimezone {
                    input: name.to_string(),
                }),
        }
    }

    /// Calendar date of a millisecond timestamp in this zone
    pub fn date_of(self, timestamp_ms: i64) -> NaiveDate {
        let instant = Utc
            .timestamp_millis_opt(timestamp_ms)
            .single()
            .unwrap_or_default();
        match self {
            Timezone::Local => instant.with_timezone(&Local).date_naive(),
            Timezone::Named(tz) => instant.with_timezone(&tz).date_naive(),
        }
    }

    /// Storage key ("YYYY-MM-DD") for the day containing `timestamp_ms`
    pub fn date_key(self, timestamp_ms: i64) -> String {
        self.date_of(timestamp_ms).format(DATE_FORMAT).to_string()
    }
}

pub mod date;
pub mod format;
pub mod timezone;

pub use date::parse_date_key;
pub use format::{format_degrees, format_duration_ms};
pub use timezone::Timezone;

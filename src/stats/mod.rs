//! Statistics layer: persisted daily records, history and rollups

mod aggregator;
mod store;
mod types;

pub use aggregator::{Period, StatsAggregator};
pub use store::{FileStore, KvStore, MemoryStore};
pub use types::{DailyStats, DailySummary, HistoricalStore, PeriodStats, Rollup, Session, percentage};

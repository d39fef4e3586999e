mod history;
mod history_config;

pub use history::{History, HistoryEntry, Reconciliation};
pub use history_config::{HistoryConfig, WireMode};

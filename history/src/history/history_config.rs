//! # `HistoryConfig` – per-replica history settings
//!
//! Set once when the `History` is created and never mutated afterwards.

/// How update and destruct changes are written to the wire
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WireMode {
    /// Old values are written alongside new ones, so a received commit stays
    /// exactly invertible on the receiver.
    #[default]
    Full,
    /// Old values are omitted. The receiver substitutes `Default` values and
    /// marks the commit with this mode, so rolling it back there restores
    /// defaults and logs a warning.
    Compact,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryConfig {
    /// *Upper bound on the length of the commit chain.*
    /// When set, the oldest entries are dropped after every append.
    /// Once anything was dropped the root id no longer counts as a known
    /// base, since the state it refers to can no longer be rolled back to.
    pub max_commits: Option<usize>,
    /// *Encoding used for outgoing commits.* Defaults to `WireMode::Full`.
    pub wire_mode: WireMode,
}

impl HistoryConfig {
    pub fn bounded(max_commits: usize) -> Self {
        Self {
            max_commits: Some(max_commits),
            ..Self::default()
        }
    }
}

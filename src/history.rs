use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub player_name: String,
    pub probability: f64,
    pub timestamp: DateTime<Local>,
}

/// Append-only log of saved predictions. Session-scoped: owned by the app
/// state, gone when the process exits. No capacity bound, no dedup, no
/// removal.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, player_name: &str, probability: f64, timestamp: DateTime<Local>) {
        self.entries.push(HistoryEntry {
            player_name: player_name.to_string(),
            probability,
            timestamp,
        });
    }

    /// Entries in insertion order.
    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

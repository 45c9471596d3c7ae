use crate::types::Record;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which records a section keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Inactive,
}

/// Active/inactive filter on a status column
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordFilter {
    pub column: String,
    pub mode: FilterMode,
}

const ACTIVE_VALUES: &[&str] = &["y", "yes", "true", "1", "x", "active", "current"];

impl RecordFilter {
    pub fn new(column: impl Into<String>, mode: FilterMode) -> Self {
        Self {
            column: column.into(),
            mode,
        }
    }

    /// Whether a record counts as active. A missing status means active.
    pub fn is_active(&self, record: &Record) -> bool {
        match record.get(&self.column) {
            None => true,
            Some(value) => {
                let value = value.trim().to_lowercase();
                ACTIVE_VALUES.contains(&value.as_str())
            }
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self.mode {
            FilterMode::All => true,
            FilterMode::Active => self.is_active(record),
            FilterMode::Inactive => !self.is_active(record),
        }
    }

    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        let before = records.len();
        let kept: Vec<Record> = records.into_iter().filter(|r| self.matches(r)).collect();
        log::debug!(
            "Filter {:?} on '{}' kept {} of {} records",
            self.mode,
            self.column,
            kept.len(),
            before
        );
        kept
    }
}

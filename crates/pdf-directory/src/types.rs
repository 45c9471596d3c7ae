use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
    #[error("Unsupported input file: {0}")]
    UnsupportedInput(PathBuf),
    #[error("Image error for {path}: {message}")]
    Image { path: PathBuf, message: String },
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("PDF structure error: {0}")]
    PdfObject(#[from] lopdf::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Table of contents needs {needed} pages but only {reserved} are reserved")]
    TocOverflow { needed: usize, reserved: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// One spreadsheet row, keyed by header name.
///
/// Blank cells are never stored, so "absent" and "empty" mean the same thing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value. Blank values remove the column.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.fields.remove(&column);
        } else {
            self.fields.insert(column, value);
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Value of a column, `None` when missing or blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Value of a column, empty string when missing.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn has(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A titled group of records rendered as one run of pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: Option<String>,
    pub records: Vec<Record>,
}

impl Section {
    pub fn new(title: Option<String>, records: Vec<Record>) -> Self {
        Self { title, records }
    }
}

/// Page counts for a directory, computed without rendering anything
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryStatistics {
    pub records: usize,
    pub front_matter_pages: usize,
    pub pages_per_section: Vec<usize>,
    pub total_pages: usize,
    pub page_width_in: f32,
    pub page_height_in: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_absent() {
        let mut record = Record::new().with("phone", "  ").with("email", "a@b.org");
        assert_eq!(record.get("phone"), None);
        assert_eq!(record.text("phone"), "");
        assert_eq!(record.get("email"), Some("a@b.org"));

        record.set("email", "");
        assert!(!record.has("email"));
        assert!(record.is_empty());
    }
}

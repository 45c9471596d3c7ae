//! Spreadsheet input
//!
//! Rows are read from a workbook sheet (xlsx/xls/ods) or a CSV file. The first
//! row holds the column names; every following row becomes a [`Record`].

use crate::types::{DirectoryError, Record, Result};
use calamine::{Data, DataType, Reader, Sheets};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Kind of input file, picked from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Workbook,
    Csv,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(InputKind::Workbook),
            Some("csv") => Ok(InputKind::Csv),
            _ => Err(DirectoryError::UnsupportedInput(path.to_path_buf())),
        }
    }
}

/// Load records from `path`.
///
/// `sheet` picks a workbook sheet by name; `None` reads the first sheet.
/// It is ignored for CSV input.
pub async fn load_records(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Vec<Record>> {
    let path = path.as_ref().to_owned();
    let kind = InputKind::from_path(&path)?;
    let sheet = sheet.map(str::to_owned);

    let bytes = tokio::fs::read(&path).await?;

    let records = tokio::task::spawn_blocking(move || match kind {
        InputKind::Csv => parse_csv(&bytes),
        InputKind::Workbook => parse_workbook(bytes, sheet.as_deref()),
    })
    .await??;

    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// List the sheet names of a workbook
pub async fn sheet_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref().to_owned();
    if InputKind::from_path(&path)? != InputKind::Workbook {
        return Err(DirectoryError::UnsupportedInput(path));
    }
    let bytes = tokio::fs::read(&path).await?;
    let names = tokio::task::spawn_blocking(move || {
        let workbook = open_workbook(bytes)?;
        Ok::<_, DirectoryError>(workbook.sheet_names())
    })
    .await??;
    Ok(names)
}

fn open_workbook(bytes: Vec<u8>) -> Result<Sheets<Cursor<Vec<u8>>>> {
    Ok(calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?)
}

pub(crate) fn parse_workbook(bytes: Vec<u8>, sheet: Option<&str>) -> Result<Vec<Record>> {
    let mut workbook = open_workbook(bytes)?;
    let names = workbook.sheet_names();

    let name = match sheet {
        Some(name) => {
            if !names.iter().any(|n| n == name) {
                return Err(DirectoryError::SheetNotFound(name.to_string()));
            }
            name.to_string()
        }
        None => names
            .first()
            .cloned()
            .ok_or_else(|| DirectoryError::SheetNotFound("<first sheet>".to_string()))?,
    };

    let range = workbook.worksheet_range(&name)?;
    let mut rows = range.rows();

    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(cell_text).collect();
    warn_duplicate_headers(&headers);

    let records = rows
        .map(|row| build_record(&headers, row.iter().map(cell_text)))
        .filter(|record| !record.is_empty())
        .collect();
    Ok(records)
}

pub(crate) fn parse_csv(bytes: &[u8]) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    warn_duplicate_headers(&headers);

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let record = build_record(&headers, row.iter().map(|v| v.trim().to_string()));
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

fn build_record(headers: &[String], values: impl Iterator<Item = String>) -> Record {
    let mut record = Record::new();
    for (header, value) in headers.iter().zip(values) {
        if header.is_empty() {
            continue;
        }
        record.set(header.clone(), value);
    }
    record
}

fn warn_duplicate_headers(headers: &[String]) {
    for (i, header) in headers.iter().enumerate() {
        if !header.is_empty() && headers[..i].contains(header) {
            log::warn!("Duplicate column '{}', the later one wins", header);
        }
    }
}

/// Text form of a workbook cell.
///
/// Integral numbers lose their decimal point so that phone numbers stored as
/// numbers come out as digits.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == chrono::NaiveTime::MIN => dt.date().to_string(),
            Some(dt) => dt.to_string(),
            None => String::new(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

/// Resolve a relative path against a base directory
pub(crate) fn resolve_path(base: Option<&Path>, path: &Path) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_numbers() {
        assert_eq!(cell_text(&Data::Float(5551234567.0)), "5551234567");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("  Ann  ".into())), "Ann");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
    }

    #[test]
    fn test_input_kind_from_extension() {
        assert_eq!(
            InputKind::from_path(Path::new("info.XLSX")).unwrap(),
            InputKind::Workbook
        );
        assert_eq!(
            InputKind::from_path(Path::new("info.csv")).unwrap(),
            InputKind::Csv
        );
        assert!(InputKind::from_path(Path::new("info.txt")).is_err());
        assert!(InputKind::from_path(Path::new("info")).is_err());
    }

    #[test]
    fn test_parse_csv_skips_blank_rows() {
        let data = "key,english_name,phone\nsmith,The Smiths,555\n,,\njones, The Joneses ,\n";
        let records = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("key"), Some("smith"));
        assert_eq!(records[1].get("english_name"), Some("The Joneses"));
        assert_eq!(records[1].get("phone"), None);
    }

    #[test]
    fn test_parse_csv_short_rows() {
        let data = "key,english_name,email\nsmith,The Smiths\n";
        let records = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].has("email"));
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/data");
        assert_eq!(
            resolve_path(Some(base), Path::new("pictures")),
            PathBuf::from("/data/pictures")
        );
        assert_eq!(
            resolve_path(Some(base), Path::new("/abs/pictures")),
            PathBuf::from("/abs/pictures")
        );
        assert_eq!(
            resolve_path(None, Path::new("pictures")),
            PathBuf::from("pictures")
        );
    }
}

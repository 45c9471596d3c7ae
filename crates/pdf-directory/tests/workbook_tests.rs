use pdf_directory::*;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workbook with a members sheet, a previous-members sheet, and an empty sheet
fn write_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("info.xlsx");
    let mut workbook = Workbook::new();
    let date = Format::new().set_num_format("yyyy-mm-dd");

    let current = workbook.add_worksheet();
    current.set_name("info_current").unwrap();
    current.write_string(0, 0, "  key ").unwrap();
    current.write_string(0, 1, "english_name").unwrap();
    current.write_string(0, 2, "phone").unwrap();
    current.write_string(0, 3, "joined").unwrap();
    current.write_string(0, 4, "english_name").unwrap();
    current.write_string(1, 0, "smith").unwrap();
    current.write_string(1, 1, "Smith").unwrap();
    current.write_number(1, 2, 5551234567.0).unwrap();
    current
        .write_datetime_with_format(1, 3, ExcelDateTime::from_ymd(2019, 9, 1).unwrap(), &date)
        .unwrap();
    current.write_string(1, 4, "The Smiths").unwrap();
    current.write_string(2, 0, "lee").unwrap();
    current.write_string(2, 4, "The Lees").unwrap();

    let previous = workbook.add_worksheet();
    previous.set_name("info_previous").unwrap();
    previous.write_string(0, 0, "key").unwrap();
    previous.write_string(0, 1, "english_name").unwrap();
    previous.write_string(1, 0, "park").unwrap();
    previous.write_string(1, 1, "The Parks").unwrap();

    workbook.add_worksheet().set_name("empty").unwrap();

    workbook.save(&path).unwrap();
    path
}

#[tokio::test]
async fn test_load_records_from_named_sheet() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path());

    let records = load_records(&path, Some("info_current")).await.unwrap();
    assert_eq!(records.len(), 2);

    let smith = &records[0];
    assert_eq!(smith.get("key"), Some("smith"));
    assert_eq!(smith.get("phone"), Some("5551234567"));
    assert_eq!(smith.get("joined"), Some("2019-09-01"));
    // the later of two same-named columns wins
    assert_eq!(smith.get("english_name"), Some("The Smiths"));
    assert_eq!(records[1].get("english_name"), Some("The Lees"));
}

#[tokio::test]
async fn test_first_sheet_is_the_default() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path());

    let records = load_records(&path, None).await.unwrap();
    assert_eq!(records[0].get("key"), Some("smith"));
}

#[tokio::test]
async fn test_empty_sheet_has_no_records() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path());

    assert!(load_records(&path, Some("empty")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_sheet_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path());

    match load_records(&path, Some("info_future")).await {
        Err(DirectoryError::SheetNotFound(name)) => assert_eq!(name, "info_future"),
        other => panic!("Expected SheetNotFound, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_sheet_names_in_order() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path());

    assert_eq!(
        sheet_names(&path).await.unwrap(),
        vec!["info_current", "info_previous", "empty"]
    );
}

#[tokio::test]
async fn test_load_sections_reads_one_sheet_each() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path());
    let options = DirectoryOptions::default();

    let sections = load_sections(&path, &options).await.unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].records.len(), 2);
    assert_eq!(sections[1].records[0].get("english_name"), Some("The Parks"));
    assert_eq!(
        sections[1].title.as_deref(),
        Some("Previous Members/Adherence")
    );
}

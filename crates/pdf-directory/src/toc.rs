//! Table of contents and document outline
//!
//! Every section contributes a level-0 entry and every record a level-1
//! entry. The same entries drive the printed contents pages and the PDF
//! bookmarks.

use crate::options::DirectoryOptions;
use crate::stats::{item_page, section_start_pages};
use crate::types::*;

/// Width of a contents line before the page number, in characters
const TOC_LINE_WIDTH: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub level: usize,
    pub name: String,
    /// 1-based page number
    pub page: usize,
}

/// Collect outline entries for all sections
pub fn build_outline(sections: &[Section], options: &DirectoryOptions) -> Vec<OutlineEntry> {
    let starts = section_start_pages(sections, options);
    let mut outline = Vec::new();

    for (section, start) in sections.iter().zip(starts) {
        if let Some(title) = &section.title {
            outline.push(OutlineEntry {
                level: 0,
                name: title.clone(),
                page: start,
            });
        }
        for (i, record) in section.records.iter().enumerate() {
            match record.get(&options.name_column) {
                Some(name) => outline.push(OutlineEntry {
                    level: 1,
                    name: name.to_string(),
                    page: item_page(start, i, options),
                }),
                None => log::warn!(
                    "Record {} of {:?} has no '{}', left out of the contents",
                    i + 1,
                    section.title,
                    options.name_column
                ),
            }
        }
    }

    outline
}

/// Render one contents line: indent, name, dot leader, page number
pub fn format_toc_line(entry: &OutlineEntry) -> String {
    let indent = " ".repeat(entry.level * 2);
    let dots = TOC_LINE_WIDTH
        .saturating_sub(entry.level * 2)
        .saturating_sub(entry.name.chars().count());
    format!("{} {} {} {}", indent, entry.name, ".".repeat(dots), entry.page)
}

/// A contents line placed on a reserved page
#[derive(Debug, Clone, PartialEq)]
pub struct TocLine {
    /// Index into the reserved pages, 0 is the cover
    pub page_offset: usize,
    /// Top of the line cell, inches from the top of the page
    pub top_in: f32,
    pub text: String,
    /// 1-based page the line points at
    pub page: usize,
}

/// Vertical extent of the contents area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TocArea {
    /// Where the first line goes on the cover
    pub first_top_in: f32,
    /// Where lines start on every following page
    pub top_margin_in: f32,
    pub bottom_margin_in: f32,
    pub page_height_in: f32,
    pub line_height_in: f32,
}

/// Flow contents lines over the reserved pages.
///
/// Fails with [`DirectoryError::TocOverflow`] when the lines need more pages
/// than are reserved.
pub fn layout_toc(entries: &[OutlineEntry], area: TocArea, reserved: usize) -> Result<Vec<TocLine>> {
    let break_at = area.page_height_in - area.bottom_margin_in;
    let mut page_offset = 0;
    let mut top = area.first_top_in;
    let mut lines = Vec::with_capacity(entries.len());

    for entry in entries {
        if top + area.line_height_in > break_at {
            page_offset += 1;
            top = area.top_margin_in;
        }
        lines.push(TocLine {
            page_offset,
            top_in: top,
            text: format_toc_line(entry),
            page: entry.page,
        });
        top += area.line_height_in;
    }

    let needed = page_offset + 1;
    if needed > reserved {
        return Err(DirectoryError::TocOverflow { needed, reserved });
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: usize, name: &str, page: usize) -> OutlineEntry {
        OutlineEntry {
            level,
            name: name.to_string(),
            page,
        }
    }

    #[test]
    fn test_format_toc_line() {
        let line = format_toc_line(&entry(1, "The Smiths", 3));
        assert_eq!(line, format!("   The Smiths {} 3", ".".repeat(36)));

        let line = format_toc_line(&entry(0, "Members", 3));
        assert_eq!(line, format!(" Members {} 3", ".".repeat(41)));
    }

    #[test]
    fn test_format_toc_line_long_name() {
        let name = "x".repeat(60);
        let line = format_toc_line(&entry(1, &name, 12));
        assert_eq!(line, format!("   {}  12", name));
    }

    #[test]
    fn test_build_outline_pages() {
        let options = DirectoryOptions::default();
        let current = Section::new(
            Some("Current".into()),
            (0..4)
                .map(|i| Record::new().with("english_name", format!("F{}", i)))
                .collect(),
        );
        let previous = Section::new(
            Some("Previous".into()),
            vec![
                Record::new().with("english_name", "P0"),
                Record::new().with("key", "nameless"),
            ],
        );

        let outline = build_outline(&[current, previous], &options);
        let pages: Vec<(usize, &str, usize)> = outline
            .iter()
            .map(|e| (e.level, e.name.as_str(), e.page))
            .collect();
        assert_eq!(
            pages,
            vec![
                (0, "Current", 3),
                (1, "F0", 3),
                (1, "F1", 3),
                (1, "F2", 3),
                (1, "F3", 4),
                (0, "Previous", 5),
                (1, "P0", 5),
            ]
        );
    }

    fn area() -> TocArea {
        TocArea {
            first_top_in: 0.5,
            top_margin_in: 0.4,
            bottom_margin_in: 0.3,
            page_height_in: 2.0,
            line_height_in: 0.25,
        }
    }

    #[test]
    fn test_layout_toc_breaks_pages() {
        let entries: Vec<OutlineEntry> = (0..9).map(|i| entry(1, "F", i)).collect();
        let lines = layout_toc(&entries, area(), 2).unwrap();

        // the cover fits 4 lines below the title, the next page 5
        let offsets: Vec<usize> = lines.iter().map(|l| l.page_offset).collect();
        assert_eq!(offsets, vec![0, 0, 0, 0, 1, 1, 1, 1, 1]);
        assert!((lines[3].top_in - 1.25).abs() < 1e-5);
        assert!((lines[4].top_in - 0.4).abs() < 1e-5);
        assert_eq!(lines[7].page, 7);
    }

    #[test]
    fn test_layout_toc_overflow() {
        let entries: Vec<OutlineEntry> = (0..10).map(|i| entry(1, "F", i)).collect();
        match layout_toc(&entries, area(), 2) {
            Err(DirectoryError::TocOverflow { needed, reserved }) => {
                assert_eq!(needed, 3);
                assert_eq!(reserved, 2);
            }
            other => panic!("Expected TocOverflow, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_toc_empty() {
        assert!(layout_toc(&[], area(), 1).unwrap().is_empty());
    }
}

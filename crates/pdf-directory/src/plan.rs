//! Page plan
//!
//! Everything about a directory that is decided before drawing: the page each
//! card lands on and where, the running header and footer text, the contents
//! lines and the areas that link them to their pages.

use crate::layout::{ItemPlacement, place_item, section_page_count};
use crate::navigation::PageLink;
use crate::options::{DirectoryOptions, POINTS_PER_INCH};
use crate::template::Align;
use crate::text::{FontBook, TextBox, layout_text_box};
use crate::toc::{OutlineEntry, TocArea, TocLine, build_outline, layout_toc};
use crate::types::*;
use printpdf::PdfDocument;

/// fpdf-style default page margin (1 cm), used by the cover and contents
pub(crate) const PAGE_MARGIN_IN: f32 = 1.0 / 2.54;
/// Contents stop this far above the bottom edge
const TOC_BOTTOM_MARGIN_IN: f32 = 0.3;
/// Gap between the cover title and the first contents line
const TOC_GAP_IN: f32 = 0.1;
/// Cover title position
const TITLE_TOP_IN: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Cover,
    /// Reserved page after the cover that only holds contents lines
    Contents,
    Section,
}

/// A card scheduled on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedItem {
    /// Index into the sections
    pub section: usize,
    /// Index into the section's records
    pub record: usize,
    pub placement: ItemPlacement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// 1-based page number
    pub number: usize,
    pub kind: PageKind,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub items: Vec<PlannedItem>,
}

impl PagePlan {
    fn new(number: usize, kind: PageKind) -> Self {
        Self {
            number,
            kind,
            header: None,
            footer: None,
            items: Vec::new(),
        }
    }
}

/// The laid-out directory, ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryDocument {
    pub page_width_in: f32,
    pub page_height_in: f32,
    /// Lines the cover title wraps to
    pub title_lines: usize,
    /// First page (1-based) of every section
    pub section_starts: Vec<usize>,
    pub outline: Vec<OutlineEntry>,
    pub toc_lines: Vec<TocLine>,
    pub links: Vec<PageLink>,
    pub pages: Vec<PagePlan>,
}

impl DirectoryDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Contents lines drawn on the 1-based page `number`
    pub fn toc_lines_on(&self, number: usize) -> impl Iterator<Item = &TocLine> {
        self.toc_lines
            .iter()
            .filter(move |line| line.page_offset + 1 == number)
    }
}

/// Lay out the directory without drawing it.
///
/// Configured fonts are read to measure the cover title; nothing else is
/// loaded.
pub fn build_document(sections: &[Section], options: &DirectoryOptions) -> Result<DirectoryDocument> {
    options.validate()?;
    let mut scratch = PdfDocument::new(&options.title);
    let fonts = FontBook::load(&mut scratch, &options.font_paths());
    plan_document(sections, options, &fonts)
}

pub(crate) fn plan_document(
    sections: &[Section],
    options: &DirectoryOptions,
    fonts: &FontBook,
) -> Result<DirectoryDocument> {
    let title_lines = {
        let font = fonts.resolve(Some(options.title_font.as_str()));
        let size = options.title_font_size_pt;
        layout_text_box(
            &options.title,
            size,
            cover_title_box(options),
            Align::Center,
            Some(true),
            |s| font.measure(s, size),
        )
        .len()
    };

    let outline = build_outline(sections, options);
    let mut pages = vec![PagePlan::new(1, PageKind::Cover)];
    let mut toc_lines = Vec::new();
    let mut links = Vec::new();

    if options.generate_toc {
        let area = TocArea {
            first_top_in: TITLE_TOP_IN
                + title_lines as f32 * options.title_font_size_pt / POINTS_PER_INCH
                + TOC_GAP_IN,
            top_margin_in: PAGE_MARGIN_IN,
            bottom_margin_in: TOC_BOTTOM_MARGIN_IN,
            page_height_in: options.page_height_in(),
            line_height_in: options.toc_font_size_pt / POINTS_PER_INCH,
        };
        toc_lines = layout_toc(&outline, area, options.toc_pages)?;
        links = toc_lines
            .iter()
            .map(|line| toc_link(line, area, options))
            .collect();
        for number in 2..=options.toc_pages {
            pages.push(PagePlan::new(number, PageKind::Contents));
        }
    }

    let mut section_starts = Vec::with_capacity(sections.len());
    for (s, section) in sections.iter().enumerate() {
        let first = pages.len();
        section_starts.push(first + 1);

        for _ in 0..section_page_count(section.records.len(), options.items_per_page) {
            let number = pages.len() + 1;
            let mut page = PagePlan::new(number, PageKind::Section);
            page.header = section.title.clone().filter(|_| options.generate_header);
            page.footer = options
                .generate_page_numbers
                .then(|| format!("Page {}", number));
            pages.push(page);
        }

        for record in 0..section.records.len() {
            let placement = place_item(record, options);
            pages[first + placement.page_in_section]
                .items
                .push(PlannedItem {
                    section: s,
                    record,
                    placement,
                });
        }
    }

    log::debug!(
        "Planned {} pages, {} contents lines",
        pages.len(),
        toc_lines.len()
    );

    Ok(DirectoryDocument {
        page_width_in: options.page_width_in(),
        page_height_in: options.page_height_in(),
        title_lines,
        section_starts,
        outline,
        toc_lines,
        links,
        pages,
    })
}

/// Box the cover title wraps in, in points
pub(crate) fn cover_title_box(options: &DirectoryOptions) -> TextBox {
    TextBox {
        x: PAGE_MARGIN_IN * POINTS_PER_INCH,
        top: TITLE_TOP_IN * POINTS_PER_INCH,
        width: (options.page_width_in() - 2.0 * PAGE_MARGIN_IN) * POINTS_PER_INCH,
        line_height: options.title_font_size_pt,
    }
}

/// Link covering the full width of a contents line
fn toc_link(line: &TocLine, area: TocArea, options: &DirectoryOptions) -> PageLink {
    let top = (area.page_height_in - line.top_in) * POINTS_PER_INCH;
    let bottom = top - area.line_height_in * POINTS_PER_INCH;
    PageLink {
        page: line.page_offset + 1,
        rect: [
            PAGE_MARGIN_IN * POINTS_PER_INCH,
            bottom,
            (options.page_width_in() - PAGE_MARGIN_IN) * POINTS_PER_INCH,
            top,
        ],
        target: line.page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, n: usize) -> Section {
        let records = (0..n)
            .map(|i| Record::new().with("english_name", format!("{} {}", title, i)))
            .collect();
        Section::new(Some(title.to_string()), records)
    }

    #[test]
    fn test_plan_pages_and_items() {
        let options = DirectoryOptions::default();
        let plan = build_document(&[section("Current", 4), section("Previous", 0)], &options).unwrap();

        let kinds: Vec<PageKind> = plan.pages.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PageKind::Cover,
                PageKind::Contents,
                PageKind::Section,
                PageKind::Section,
                PageKind::Section,
            ]
        );
        assert_eq!(plan.section_starts, vec![3, 5]);
        assert_eq!(plan.pages[2].items.len(), 3);
        assert_eq!(plan.pages[3].items.len(), 1);
        assert!(plan.pages[4].items.is_empty());
        assert_eq!(plan.pages[3].items[0].record, 3);
        assert_eq!(plan.pages[4].header.as_deref(), Some("Previous"));
        assert_eq!(plan.pages[4].footer.as_deref(), Some("Page 5"));
    }

    #[test]
    fn test_plan_swaps_sides_on_alternate_pages() {
        let options = DirectoryOptions {
            items_per_page: 1,
            ..Default::default()
        };
        let plan = build_document(&[section("Current", 3)], &options).unwrap();

        let reversed: Vec<bool> = plan.pages[2..]
            .iter()
            .map(|p| p.items[0].placement.reversed)
            .collect();
        assert_eq!(reversed, vec![false, true, false]);
    }

    #[test]
    fn test_plan_without_bands_or_toc() {
        let options = DirectoryOptions {
            generate_toc: false,
            generate_header: false,
            generate_page_numbers: false,
            ..Default::default()
        };
        let plan = build_document(&[section("Current", 1)], &options).unwrap();

        assert_eq!(plan.page_count(), 2);
        assert!(plan.toc_lines.is_empty());
        assert!(plan.links.is_empty());
        assert_eq!(plan.pages[1].header, None);
        assert_eq!(plan.pages[1].footer, None);
    }

    #[test]
    fn test_contents_links_point_at_entries() {
        let options = DirectoryOptions::default();
        let plan = build_document(&[section("Current", 4)], &options).unwrap();

        assert_eq!(plan.links.len(), plan.outline.len());
        for (link, entry) in plan.links.iter().zip(&plan.outline) {
            assert_eq!(link.target, entry.page);
            assert!(link.rect[1] < link.rect[3]);
        }
        assert_eq!(plan.toc_lines_on(1).count(), 5);
    }
}

//! Directory PDF generation
//!
//! Page order: a cover with the title, the contents flowing from the cover
//! over the reserved pages, then every section starting on a fresh page.
//! Within a section each page carries the section header, the page number
//! footer and up to `items_per_page` cards.
//!
//! Bookmarks and contents links are written after saving, see `navigation`.

use crate::images::{ImageStore, resolve_image};
use crate::layout::{ItemPlacement, fit_image};
use crate::navigation::add_navigation;
use crate::options::{DirectoryOptions, POINTS_PER_INCH};
use crate::plan::{DirectoryDocument, PAGE_MARGIN_IN, PagePlan, cover_title_box, plan_document};
use crate::records::{InputKind, load_records};
use crate::template::{Align, Content, ElementKind, bind};
use crate::text::{FontBook, ResolvedFont, TextBox, layout_text_box};
use crate::types::*;
use printpdf::{BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Load every configured section from `input`.
///
/// Workbooks are read once per section sheet; CSV input has a single table,
/// which every section reads.
pub async fn load_sections(
    input: impl AsRef<Path>,
    options: &DirectoryOptions,
) -> Result<Vec<Section>> {
    let input = input.as_ref();
    let kind = InputKind::from_path(input)?;

    let csv_records = match kind {
        InputKind::Csv => Some(load_records(input, None).await?),
        InputKind::Workbook => None,
    };

    let mut sections = Vec::with_capacity(options.sections.len());
    for spec in &options.sections {
        let mut records = match &csv_records {
            Some(records) => records.clone(),
            None => load_records(input, spec.sheet.as_deref()).await?,
        };
        if let Some(filter) = &spec.filter {
            records = filter.apply(records);
        }
        log::info!(
            "Section {:?}: {} records",
            spec.title.as_deref().unwrap_or("<untitled>"),
            records.len()
        );
        sections.push(Section::new(spec.title.clone(), records));
    }
    Ok(sections)
}

/// Render the directory and write it to `output_path`
pub async fn generate_pdf(
    sections: &[Section],
    options: &DirectoryOptions,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    let sections = sections.to_vec();
    let options = options.clone();
    let output_path = output_path.as_ref().to_owned();

    let bytes =
        tokio::task::spawn_blocking(move || render_pdf_bytes(&sections, &options)).await??;

    tokio::fs::write(&output_path, bytes).await?;
    log::info!("Wrote {}", output_path.display());

    Ok(())
}

/// Render the directory to PDF bytes
pub fn render_pdf_bytes(sections: &[Section], options: &DirectoryOptions) -> Result<Vec<u8>> {
    options.validate()?;

    let mut doc = PdfDocument::new(&options.title);
    let fonts = FontBook::load(&mut doc, &options.font_paths());
    let plan = plan_document(sections, options, &fonts)?;

    let mut renderer = Renderer::new(options, doc, fonts);
    let pages = plan
        .pages
        .iter()
        .map(|page| renderer.render_page(page, &plan, sections))
        .collect::<Result<Vec<_>>>()?;
    let bytes = renderer.finish(pages);

    add_navigation(&bytes, &plan.outline, &plan.links)
}

struct Renderer<'a> {
    options: &'a DirectoryOptions,
    doc: PdfDocument,
    fonts: FontBook,
    images: ImageStore,
    page_width_pt: f32,
    page_height_pt: f32,
    image_dir: PathBuf,
    default_image: PathBuf,
    icons: BTreeMap<String, PathBuf>,
}

impl<'a> Renderer<'a> {
    fn new(options: &'a DirectoryOptions, doc: PdfDocument, fonts: FontBook) -> Self {
        let icons = options
            .icons
            .iter()
            .map(|(column, path)| (column.clone(), options.resolve(path)))
            .collect();

        Self {
            options,
            doc,
            fonts,
            images: ImageStore::new(),
            page_width_pt: options.page_width_in() * POINTS_PER_INCH,
            page_height_pt: options.page_height_in() * POINTS_PER_INCH,
            image_dir: options.resolve(&options.image_dir),
            default_image: options.resolve(&options.default_image),
            icons,
        }
    }

    fn render_page(
        &mut self,
        page: &PagePlan,
        plan: &DirectoryDocument,
        sections: &[Section],
    ) -> Result<Vec<Op>> {
        let mut ops = Vec::new();

        if page.number == 1 {
            ops.extend(self.cover_title());
        }

        let toc_size = self.options.toc_font_size_pt;
        let courier = ResolvedFont::Builtin(BuiltinFont::Courier);
        let x = PAGE_MARGIN_IN * POINTS_PER_INCH;
        for line in plan.toc_lines_on(page.number) {
            log::debug!("Contents: {}", line.text);
            let baseline = line.top_in * POINTS_PER_INCH + 0.5 * toc_size + 0.3 * toc_size;
            ops.extend(courier.write_ops(&line.text, toc_size, x, self.page_height_pt - baseline));
        }

        ops.extend(self.running_text(page));

        for item in &page.items {
            let record = &sections[item.section].records[item.record];
            log::debug!(
                "Rendering {} on page {}",
                record.text(&self.options.name_column),
                page.number
            );
            ops.extend(self.render_item(&item.placement, record)?);
        }

        Ok(ops)
    }

    fn cover_title(&self) -> Vec<Op> {
        let options = self.options;
        let font = self.fonts.resolve(Some(options.title_font.as_str()));
        let (ops, _) = text_ops(
            &font,
            &options.title,
            options.title_font_size_pt,
            cover_title_box(options),
            Align::Center,
            Some(true),
            self.page_height_pt,
        );
        ops
    }

    /// Section header and page number footer
    fn running_text(&self, page: &PagePlan) -> Vec<Op> {
        let options = self.options;
        let size = options.header_font_size_pt;
        let font = self.fonts.resolve(Some(options.header_font.as_str()));
        let mut ops = Vec::new();

        if let Some(title) = &page.header {
            let band = options.header_height_in * POINTS_PER_INCH;
            let bounds = TextBox {
                x: 0.0,
                top: 0.2 * band,
                width: self.page_width_pt,
                line_height: band,
            };
            let (header, _) = text_ops(
                &font,
                title,
                size,
                bounds,
                Align::Center,
                None,
                self.page_height_pt,
            );
            ops.extend(header);
        }

        if let Some(footer) = &page.footer {
            let band = options.footer_height_in * POINTS_PER_INCH;
            let bounds = TextBox {
                x: 0.0,
                top: self.page_height_pt - 1.2 * band,
                width: self.page_width_pt,
                line_height: band,
            };
            let (footer, _) = text_ops(
                &font,
                footer,
                size,
                bounds,
                Align::Center,
                None,
                self.page_height_pt,
            );
            ops.extend(footer);
        }

        ops
    }

    fn render_item(&mut self, placement: &ItemPlacement, record: &Record) -> Result<Vec<Op>> {
        let options = self.options;
        let scale = options.item_scale;
        let (info_x, info_y) = placement.info_origin;
        let mut ops = Vec::new();

        for bound in bind(&options.elements, record, &self.icons) {
            let element = bound.element;
            let x = (info_x + element.x1 * scale) * POINTS_PER_INCH;
            let top = (info_y + element.y1 * scale) * POINTS_PER_INCH;
            let width = element.width() * scale * POINTS_PER_INCH;
            let height = element.height() * scale * POINTS_PER_INCH;

            match (element.kind, bound.content) {
                (ElementKind::Text, Content::Text(text)) => {
                    let size = element.size_pt * scale;
                    let font = self.fonts.resolve(element.font.as_deref());
                    let bounds = TextBox {
                        x,
                        top,
                        width,
                        line_height: height,
                    };
                    let (text, _) = text_ops(
                        &font,
                        &text,
                        size,
                        bounds,
                        element.align,
                        element.multiline,
                        self.page_height_pt,
                    );
                    ops.extend(text);
                }
                (_, Content::Image(path)) => {
                    let icon = self.images.get_or_load(&mut self.doc, &path)?;
                    ops.push(icon.place(x, self.page_height_pt - top - height, width, height));
                }
                (ElementKind::Image, Content::Text(_)) => {}
            }
        }

        let key = record.text(&options.key_column);
        let photo_path = resolve_image(
            key,
            &self.image_dir,
            &options.image_extensions,
            &self.default_image,
        );
        let photo = self.images.get_or_load(&mut self.doc, &photo_path)?;
        let fit = fit_image(photo.width_px, photo.height_px, options);
        let (w_in, h_in) = fit.size_in(photo.width_px, photo.height_px);
        let (image_x, image_y) = placement.image_origin;
        ops.push(photo.place(
            image_x * POINTS_PER_INCH,
            self.page_height_pt - (image_y + h_in) * POINTS_PER_INCH,
            w_in * POINTS_PER_INCH,
            h_in * POINTS_PER_INCH,
        ));

        Ok(ops)
    }

    fn finish(mut self, pages: Vec<Vec<Op>>) -> Vec<u8> {
        let width = Mm(self.options.page_width_in() * 25.4);
        let height = Mm(self.options.page_height_in() * 25.4);
        let page_count = pages.len();
        self.doc.pages = pages
            .into_iter()
            .map(|ops| PdfPage::new(width, height, ops))
            .collect();

        log::info!(
            "Rendered {} pages with {} embedded images",
            page_count,
            self.images.len()
        );

        let mut warnings = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        for warning in &warnings {
            log::debug!("printpdf: {:?}", warning);
        }
        bytes
    }
}

/// Lay out a text box and turn it into drawing operations.
///
/// Returns the operations and the number of lines used.
fn text_ops(
    font: &ResolvedFont<'_>,
    text: &str,
    size_pt: f32,
    bounds: TextBox,
    align: Align,
    multiline: Option<bool>,
    page_height_pt: f32,
) -> (Vec<Op>, usize) {
    let lines = layout_text_box(text, size_pt, bounds, align, multiline, |s| {
        font.measure(s, size_pt)
    });
    let count = lines.len();
    let ops = lines
        .into_iter()
        .flat_map(|line| font.write_ops(&line.text, size_pt, line.x, page_height_pt - line.baseline))
        .collect();
    (ops, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_ops_counts_lines() {
        let font = ResolvedFont::Builtin(BuiltinFont::Helvetica);
        let bounds = TextBox {
            x: 0.0,
            top: 0.0,
            width: 40.0,
            line_height: 10.0,
        };
        let (ops, lines) = text_ops(
            &font,
            "alpha beta gamma",
            8.0,
            bounds,
            Align::Left,
            Some(true),
            100.0,
        );
        assert_eq!(lines, 3);
        assert_eq!(ops.len(), 15);
    }
}

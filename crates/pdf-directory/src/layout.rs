//! Card placement
//!
//! Every card is split into an info half and a photo half. Which half sits on
//! the left depends on the page: with a symmetric layout the halves swap on
//! alternate pages so facing pages mirror each other, and a reversed layout
//! flips the whole scheme.
//!
//! All positions are in inches, measured from the top-left corner of the page.

use crate::options::DirectoryOptions;

/// Where one card lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPlacement {
    /// Page index counted from the first page of the section
    pub page_in_section: usize,
    /// Position of the card on its page
    pub slot: usize,
    /// Photo on the left, info on the right
    pub reversed: bool,
    pub info_origin: (f32, f32),
    pub image_origin: (f32, f32),
}

/// Whether the photo goes on the left for a page of a section
pub fn is_reversed(page_in_section: usize, symmetric: bool, reverse: bool) -> bool {
    let even_page = page_in_section % 2 == 0;
    (even_page && symmetric) ^ reverse
}

/// Whether the item at `index` opens a new page
pub fn starts_page(index: usize, items_per_page: usize) -> bool {
    index % items_per_page == 0
}

/// Compute the placement of the item at `index` within its section
pub fn place_item(index: usize, options: &DirectoryOptions) -> ItemPlacement {
    let per_page = options.items_per_page;
    let slot = index % per_page;
    let page_in_section = index / per_page;
    let reversed = is_reversed(
        page_in_section,
        options.symmetric_layout,
        options.reverse_layout,
    );

    let margin = options.image_margin_in;
    let (image_x, info_x) = if reversed {
        (margin, margin * 2.0 + options.image_width_in)
    } else {
        (options.info_width_in + margin, 0.0)
    };

    let band_top = options.header_band_in() + options.item_height_in * slot as f32;

    ItemPlacement {
        page_in_section,
        slot,
        reversed,
        info_origin: (info_x, band_top),
        image_origin: (image_x, band_top + margin),
    }
}

/// How a photo is scaled into its half of the card
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageFit {
    /// Fixed width in inches, height follows the aspect ratio
    Width(f32),
    /// Fixed height in inches, width follows the aspect ratio
    Height(f32),
}

impl ImageFit {
    /// Resolve both dimensions for an image of the given pixel size
    pub fn size_in(self, width_px: u32, height_px: u32) -> (f32, f32) {
        let w = width_px.max(1) as f32;
        let h = height_px.max(1) as f32;
        match self {
            ImageFit::Width(width) => (width, width * h / w),
            ImageFit::Height(height) => (height * w / h, height),
        }
    }
}

/// Landscape photos fit the photo width, everything else fits the card height
pub fn fit_image(width_px: u32, height_px: u32, options: &DirectoryOptions) -> ImageFit {
    let margin = options.image_margin_in * 2.0;
    if width_px > height_px {
        ImageFit::Width(options.item_scale * (options.image_width_in - margin))
    } else {
        ImageFit::Height(options.item_scale * (options.item_height_in - margin))
    }
}

/// Pages a section of `records` items occupies. An empty section still gets
/// one page for its header.
pub fn section_page_count(records: usize, items_per_page: usize) -> usize {
    records.div_ceil(items_per_page.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5
    }

    #[test]
    fn test_is_reversed_truth_table() {
        // symmetric only: reversed on even pages
        assert!(is_reversed(0, true, false));
        assert!(!is_reversed(1, true, false));
        // reverse only: reversed everywhere
        assert!(is_reversed(0, false, true));
        assert!(is_reversed(1, false, true));
        // both: odd pages reversed
        assert!(!is_reversed(0, true, true));
        assert!(is_reversed(1, true, true));
        // neither
        assert!(!is_reversed(0, false, false));
        assert!(!is_reversed(3, false, false));
    }

    #[test]
    fn test_place_first_item_default_options() {
        let options = DirectoryOptions::default();
        let p = place_item(0, &options);
        assert_eq!(p.slot, 0);
        assert_eq!(p.page_in_section, 0);
        // symmetric ^ reverse on an even page
        assert!(!p.reversed);
        assert!(close(p.info_origin, (0.0, 0.2)));
        assert!(close(p.image_origin, (2.1, 0.3)));
    }

    #[test]
    fn test_place_item_on_second_page() {
        let options = DirectoryOptions::default();
        let p = place_item(4, &options);
        assert_eq!(p.slot, 1);
        assert_eq!(p.page_in_section, 1);
        assert!(p.reversed);
        assert!(close(p.info_origin, (2.2, 2.2)));
        assert!(close(p.image_origin, (0.1, 2.3)));
    }

    #[test]
    fn test_place_item_without_header() {
        let options = DirectoryOptions {
            generate_header: false,
            symmetric_layout: false,
            reverse_layout: false,
            ..Default::default()
        };
        let p = place_item(2, &options);
        assert!(close(p.info_origin, (0.0, 4.0)));
        assert!(close(p.image_origin, (2.1, 4.1)));
    }

    #[test]
    fn test_starts_page() {
        assert!(starts_page(0, 3));
        assert!(!starts_page(2, 3));
        assert!(starts_page(3, 3));
        assert!(starts_page(5, 1));
    }

    #[test]
    fn test_fit_image_landscape_and_portrait() {
        let options = DirectoryOptions::default();

        let fit = fit_image(400, 300, &options);
        assert!(matches!(fit, ImageFit::Width(w) if (w - 1.8).abs() < 1e-5));
        let (w, h) = fit.size_in(400, 300);
        assert!((w - 1.8).abs() < 1e-5 && (h - 1.35).abs() < 1e-5);

        let fit = fit_image(300, 400, &options);
        assert!(matches!(fit, ImageFit::Height(h) if (h - 1.8).abs() < 1e-5));
        let (w, h) = fit.size_in(300, 400);
        assert!((w - 1.35).abs() < 1e-5 && (h - 1.8).abs() < 1e-5);

        // square images fit by height
        assert!(matches!(fit_image(500, 500, &options), ImageFit::Height(_)));
    }

    #[test]
    fn test_fit_image_scale() {
        let options = DirectoryOptions {
            item_scale: 0.5,
            ..Default::default()
        };
        let fit = fit_image(10, 20, &options);
        assert!(matches!(fit, ImageFit::Height(h) if (h - 0.9).abs() < 1e-5));
    }

    #[test]
    fn test_section_page_count() {
        assert_eq!(section_page_count(0, 3), 1);
        assert_eq!(section_page_count(3, 3), 1);
        assert_eq!(section_page_count(4, 3), 2);
        assert_eq!(section_page_count(7, 1), 7);
    }
}

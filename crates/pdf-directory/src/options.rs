use crate::filter::RecordFilter;
use crate::records::resolve_path;
use crate::template::{Element, default_elements};
use crate::types::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementSystem {
    Inches,
    Millimeters,
    Points,
}

impl MeasurementSystem {
    pub fn name(&self) -> &'static str {
        match self {
            MeasurementSystem::Inches => "in",
            MeasurementSystem::Millimeters => "mm",
            MeasurementSystem::Points => "pt",
        }
    }

    pub fn to_inches(&self, value: f32) -> f32 {
        match self {
            MeasurementSystem::Inches => value,
            MeasurementSystem::Millimeters => value / 25.4,
            MeasurementSystem::Points => value / POINTS_PER_INCH,
        }
    }

    pub fn from_inches(&self, value: f32) -> f32 {
        match self {
            MeasurementSystem::Inches => value,
            MeasurementSystem::Millimeters => value * 25.4,
            MeasurementSystem::Points => value * POINTS_PER_INCH,
        }
    }
}

impl std::str::FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "in" | "inch" | "inches" => Ok(MeasurementSystem::Inches),
            "mm" | "millimeters" => Ok(MeasurementSystem::Millimeters),
            "pt" | "points" => Ok(MeasurementSystem::Points),
            other => Err(format!("Unknown unit '{}', expected in, mm or pt", other)),
        }
    }
}

/// One run of pages: which sheet it reads and how it is titled
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SectionSpec {
    pub title: Option<String>,
    /// Workbook sheet; `None` reads the first sheet
    pub sheet: Option<String>,
    pub filter: Option<RecordFilter>,
}

impl SectionSpec {
    pub fn new(title: &str, sheet: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            sheet: Some(sheet.to_string()),
            filter: None,
        }
    }
}

/// Full directory configuration. Lengths are in inches.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DirectoryOptions {
    // Cover
    pub title: String,
    pub title_font: String,
    pub title_font_size_pt: f32,

    // Card geometry
    pub items_per_page: usize,
    pub info_width_in: f32,
    pub image_width_in: f32,
    pub image_margin_in: f32,
    pub item_height_in: f32,
    pub header_height_in: f32,
    pub footer_height_in: f32,
    pub item_scale: f32,

    // Toggles
    pub generate_toc: bool,
    pub toc_pages: usize,
    pub generate_page_numbers: bool,
    pub generate_header: bool,
    pub symmetric_layout: bool,
    pub reverse_layout: bool,

    // Running text
    pub header_font: String,
    pub header_font_size_pt: f32,
    pub toc_font_size_pt: f32,

    // Columns
    pub key_column: String,
    pub name_column: String,

    // Assets
    pub image_dir: PathBuf,
    pub default_image: PathBuf,
    pub image_extensions: Vec<String>,
    pub icons: BTreeMap<String, PathBuf>,
    pub fonts: BTreeMap<String, PathBuf>,

    pub elements: Vec<Element>,
    pub sections: Vec<SectionSpec>,

    /// Directory relative asset paths are resolved against
    #[cfg_attr(feature = "serde", serde(skip))]
    pub base_dir: Option<PathBuf>,
}

impl Default for DirectoryOptions {
    fn default() -> Self {
        let icon_dir = PathBuf::from("icons");
        let icons = ["email", "children", "address", "phone"]
            .iter()
            .map(|name| (name.to_string(), icon_dir.join(format!("{}.png", name))))
            .collect();
        let fonts = [("hp", "HPSimplified_Rg.ttf"), ("kaiti", "simkai.ttf")]
            .iter()
            .map(|(name, file)| (name.to_string(), PathBuf::from(file)))
            .collect();

        Self {
            title: "Directory".to_string(),
            title_font: "hp".to_string(),
            title_font_size_pt: 15.0,
            items_per_page: 3,
            info_width_in: 2.0,
            image_width_in: 2.0,
            image_margin_in: 0.1,
            item_height_in: 2.0,
            header_height_in: 0.2,
            footer_height_in: 0.2,
            item_scale: 1.0,
            generate_toc: true,
            toc_pages: 2,
            generate_page_numbers: true,
            generate_header: true,
            symmetric_layout: true,
            reverse_layout: true,
            header_font: "hp".to_string(),
            header_font_size_pt: 8.0,
            toc_font_size_pt: 7.0,
            key_column: "key".to_string(),
            name_column: "english_name".to_string(),
            image_dir: PathBuf::from("pictures"),
            default_image: icon_dir.join("anonymous.jpg"),
            image_extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            icons,
            fonts,
            elements: default_elements(),
            sections: vec![
                SectionSpec::new("Current Members/Adherence", "info_current"),
                SectionSpec::new("Previous Members/Adherence", "info_previous"),
            ],
            base_dir: None,
        }
    }
}

impl DirectoryOptions {
    /// Load options from JSON file
    ///
    /// Relative asset paths in the file are taken relative to the file.
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mut options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| DirectoryError::Config(format!("Failed to parse config: {}", e)))?;
        options.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);
        log::debug!("Loaded configuration from {}", path.display());
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DirectoryError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.items_per_page == 0 {
            return Err(DirectoryError::Config(
                "Items per page must be at least 1".to_string(),
            ));
        }

        let lengths = [
            ("info width", self.info_width_in),
            ("image width", self.image_width_in),
            ("item height", self.item_height_in),
            ("item scale", self.item_scale),
        ];
        for (label, value) in lengths {
            if value.is_nan() || value <= 0.0 {
                return Err(DirectoryError::Config(format!(
                    "{} must be positive, got {}",
                    label, value
                )));
            }
        }

        if self.image_margin_in < 0.0
            || self.image_margin_in * 2.0 >= self.image_width_in.min(self.item_height_in)
        {
            return Err(DirectoryError::Config(format!(
                "Image margin {} leaves no room for the image",
                self.image_margin_in
            )));
        }

        if self.header_height_in < 0.0 || self.footer_height_in < 0.0 {
            return Err(DirectoryError::Config(
                "Header and footer heights cannot be negative".to_string(),
            ));
        }

        if self.sections.is_empty() {
            return Err(DirectoryError::Config("No sections specified".to_string()));
        }

        if self.generate_toc && self.toc_pages == 0 {
            return Err(DirectoryError::Config(
                "Table of contents needs at least one reserved page".to_string(),
            ));
        }

        for element in &self.elements {
            if element.x2 < element.x1 || element.y2 < element.y1 {
                return Err(DirectoryError::Config(format!(
                    "Element '{}' has an inverted box",
                    element.name
                )));
            }
        }

        Ok(())
    }

    pub fn page_width_in(&self) -> f32 {
        self.info_width_in + self.image_width_in
    }

    /// Header band height, zero when the header is off
    pub fn header_band_in(&self) -> f32 {
        if self.generate_header {
            self.header_height_in
        } else {
            0.0
        }
    }

    /// Footer band height, zero when page numbers are off
    pub fn footer_band_in(&self) -> f32 {
        if self.generate_page_numbers {
            self.footer_height_in
        } else {
            0.0
        }
    }

    pub fn page_height_in(&self) -> f32 {
        self.item_height_in * self.items_per_page as f32
            + self.header_band_in()
            + self.footer_band_in()
    }

    /// Pages before the first section
    pub fn front_matter_pages(&self) -> usize {
        if self.generate_toc {
            self.toc_pages.max(1)
        } else {
            1
        }
    }

    /// Resolve an asset path against the configuration's directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_path(self.base_dir.as_deref(), path)
    }

    /// Configured font files, resolved against the configuration's directory
    pub fn font_paths(&self) -> BTreeMap<String, PathBuf> {
        self.fonts
            .iter()
            .map(|(name, path)| (name.clone(), self.resolve(path)))
            .collect()
    }
}

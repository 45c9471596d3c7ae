//! Card template
//!
//! A template is a flat list of boxed elements positioned relative to the
//! info area of a card. Text elements show the record column of the same
//! name; image elements named `<column>_icon` show the icon for `<column>`
//! whenever that column has a value.

use crate::types::Record;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const ICON_SUFFIX: &str = "_icon";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementKind {
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A boxed element of the card template. Coordinates are in inches.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Element {
    pub name: String,
    pub kind: ElementKind,
    pub font: Option<String>,
    pub size_pt: f32,
    pub align: Align,
    /// `Some(true)` wraps, `Some(false)` trims to the box, `None` writes one
    /// unclipped line.
    pub multiline: Option<bool>,
    pub x1: f32,
    pub x2: f32,
    pub y1: f32,
    pub y2: f32,
}

impl Element {
    pub fn text(name: &str, font: &str, size_pt: f32, x: (f32, f32), y: (f32, f32)) -> Self {
        Self {
            name: name.to_string(),
            kind: ElementKind::Text,
            font: Some(font.to_string()),
            size_pt,
            align: Align::Left,
            multiline: Some(true),
            x1: x.0,
            x2: x.1,
            y1: y.0,
            y2: y.1,
        }
    }

    pub fn image(name: &str, x: (f32, f32), y: (f32, f32)) -> Self {
        Self {
            name: name.to_string(),
            kind: ElementKind::Image,
            font: None,
            size_pt: 7.0,
            align: Align::Left,
            multiline: None,
            x1: x.0,
            x2: x.1,
            y1: y.0,
            y2: y.1,
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Column whose presence turns on this icon
    pub fn icon_column(&self) -> Option<&str> {
        self.name.strip_suffix(ICON_SUFFIX)
    }
}

/// The stock directory card: names, children, address, phone and email,
/// with an icon in front of each contact line.
pub fn default_elements() -> Vec<Element> {
    const TEXT_X: (f32, f32) = (0.2, 1.8);
    const ICON_X: (f32, f32) = (0.05, 0.2);

    vec![
        Element::text("english_name", "hp", 9.0, TEXT_X, (0.1, 0.2)),
        Element::text("chinese_name", "kaiti", 7.0, TEXT_X, (0.40, 0.45)),
        Element::text("children", "hp", 7.0, TEXT_X, (0.55, 0.7)),
        Element::image("children_icon", ICON_X, (0.55, 0.7)),
        Element::text("children_chinese", "kaiti", 7.0, TEXT_X, (0.70, 0.9)),
        Element::text("address", "hp", 7.0, TEXT_X, (0.85, 1.0)),
        Element::image("address_icon", ICON_X, (0.85, 1.0)),
        Element::text("phone", "hp", 7.0, TEXT_X, (1.15, 1.3)),
        Element::image("phone_icon", ICON_X, (1.15, 1.3)),
        Element::text("email", "hp", 7.0, TEXT_X, (1.6, 1.75)),
        Element::image("email_icon", ICON_X, (1.6, 1.75)),
    ]
}

/// What an element shows for a particular record
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Image(PathBuf),
}

/// An element paired with the content it shows for one record
#[derive(Debug, Clone, PartialEq)]
pub struct BoundElement<'a> {
    pub element: &'a Element,
    pub content: Content,
}

/// Fill the template from a record.
///
/// Elements without content for this record are left out.
pub fn bind<'a>(
    elements: &'a [Element],
    record: &Record,
    icons: &BTreeMap<String, PathBuf>,
) -> Vec<BoundElement<'a>> {
    let mut bound = Vec::new();
    for element in elements {
        let content = match element.kind {
            ElementKind::Text => record
                .get(&element.name)
                .map(|value| Content::Text(value.to_string())),
            ElementKind::Image => element
                .icon_column()
                .filter(|column| record.has(column))
                .and_then(|column| icons.get(column))
                .map(|path| Content::Image(path.clone())),
        };
        if let Some(content) = content {
            bound.push(BoundElement { element, content });
        }
    }
    bound
}

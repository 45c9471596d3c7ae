//! Photo lookup and image embedding

use crate::types::{DirectoryError, Result};
use printpdf::{
    Op, PdfDocument, Pt, RawImage, RawImageData, RawImageFormat, XObjectId, XObjectTransform,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Find the photo for a record key.
///
/// A key without an extension is looked up in `image_dir` under each of
/// `extensions` in turn. A key with an extension is used as a path, first as
/// given and then inside `image_dir`. Anything not found falls back to
/// `default`.
pub fn resolve_image(key: &str, image_dir: &Path, extensions: &[String], default: &Path) -> PathBuf {
    let key = key.trim();
    if key.is_empty() {
        return default.to_path_buf();
    }

    let key_path = Path::new(key);
    let candidates: Vec<PathBuf> = if key_path.extension().is_none() {
        extensions
            .iter()
            .map(|ext| image_dir.join(format!("{}.{}", key, ext)))
            .collect()
    } else {
        vec![key_path.to_path_buf(), image_dir.join(key_path)]
    };

    match candidates.into_iter().find(|p| p.is_file()) {
        Some(path) => path,
        None => {
            log::debug!("No image for key '{}', using default", key);
            default.to_path_buf()
        }
    }
}

/// An image registered in the document
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub id: XObjectId,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Draw the image stretched to `width_pt` x `height_pt` with its
    /// bottom-left corner at `(x_pt, y_pt)`
    pub fn place(&self, x_pt: f32, y_pt: f32, width_pt: f32, height_pt: f32) -> Op {
        Op::UseXobject {
            id: self.id.clone(),
            transform: XObjectTransform {
                translate_x: Some(Pt(x_pt)),
                translate_y: Some(Pt(y_pt)),
                rotate: None,
                scale_x: Some(width_pt / self.width_px.max(1) as f32),
                scale_y: Some(height_pt / self.height_px.max(1) as f32),
                // one pixel per point, so the scale maps pixels straight to points
                dpi: Some(72.0),
            },
        }
    }
}

/// Decodes each image file once and keeps its XObject id
#[derive(Default)]
pub struct ImageStore {
    cache: HashMap<PathBuf, LoadedImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn get_or_load(&mut self, doc: &mut PdfDocument, path: &Path) -> Result<LoadedImage> {
        if let Some(image) = self.cache.get(path) {
            return Ok(image.clone());
        }

        let raw = decode_image(path)?;
        let loaded = LoadedImage {
            width_px: raw.width as u32,
            height_px: raw.height as u32,
            id: doc.add_image(&raw),
        };
        log::debug!(
            "Embedded image {} ({}x{})",
            path.display(),
            loaded.width_px,
            loaded.height_px
        );
        self.cache.insert(path.to_path_buf(), loaded.clone());
        Ok(loaded)
    }
}

/// Pixel size of an image file without decoding it
pub fn image_size(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path).map_err(|e| DirectoryError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn decode_image(path: &Path) -> Result<RawImage> {
    let decoded = image::open(path).map_err(|e| DirectoryError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let width = decoded.width() as usize;
    let height = decoded.height() as usize;

    let (pixels, data_format) = if decoded.color().has_alpha() {
        (decoded.to_rgba8().into_raw(), RawImageFormat::RGBA8)
    } else {
        (decoded.to_rgb8().into_raw(), RawImageFormat::RGB8)
    };

    Ok(RawImage {
        pixels: RawImageData::U8(pixels),
        width,
        height,
        data_format,
        tag: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec!["png".into(), "jpg".into(), "jpeg".into()]
    }

    fn write_png(path: &Path, w: u32, h: u32) {
        image::RgbImage::new(w, h).save(path).unwrap();
    }

    #[test]
    fn test_resolve_image_by_extension_order() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("anonymous.png");
        std::fs::write(dir.path().join("smith.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("smith.jpeg"), b"x").unwrap();

        let found = resolve_image("smith", dir.path(), &exts(), &default);
        assert_eq!(found, dir.path().join("smith.jpg"));
    }

    #[test]
    fn test_resolve_image_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("anonymous.png");

        assert_eq!(resolve_image("nobody", dir.path(), &exts(), &default), default);
        assert_eq!(resolve_image("  ", dir.path(), &exts(), &default), default);
    }

    #[test]
    fn test_resolve_image_with_extension() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("anonymous.png");
        std::fs::write(dir.path().join("family.png"), b"x").unwrap();

        let found = resolve_image("family.png", dir.path(), &exts(), &default);
        assert_eq!(found, dir.path().join("family.png"));

        let absolute = dir.path().join("family.png");
        let found = resolve_image(absolute.to_str().unwrap(), Path::new("elsewhere"), &exts(), &default);
        assert_eq!(found, absolute);
    }

    #[test]
    fn test_image_store_caches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        write_png(&path, 4, 2);

        let mut doc = PdfDocument::new("images");
        let mut store = ImageStore::new();
        let first = store.get_or_load(&mut doc, &path).unwrap();
        let second = store.get_or_load(&mut doc, &path).unwrap();

        assert_eq!((first.width_px, first.height_px), (4, 2));
        assert_eq!(first.id, second.id);
        assert_eq!(store.len(), 1);
        assert_eq!(image_size(&path).unwrap(), (4, 2));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let mut doc = PdfDocument::new("images");
        let mut store = ImageStore::new();
        let err = store
            .get_or_load(&mut doc, Path::new("/nonexistent/photo.png"))
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Image { .. }));
    }
}

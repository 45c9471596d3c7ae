//! Outline and contents links
//!
//! Written into the saved file with lopdf so the bookmarks keep the order of
//! the directory instead of being regrouped by page.

use crate::toc::OutlineEntry;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, text_string};

/// A clickable area on one page that jumps to another page
#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    /// 1-based page carrying the link
    pub page: usize,
    /// Lower-left x, lower-left y, upper-right x, upper-right y in points
    pub rect: [f32; 4],
    /// 1-based page the link jumps to
    pub target: usize,
}

/// Add the outline and link annotations to a saved PDF
pub fn add_navigation(bytes: &[u8], outline: &[OutlineEntry], links: &[PageLink]) -> Result<Vec<u8>> {
    if outline.is_empty() && links.is_empty() {
        return Ok(bytes.to_vec());
    }

    let mut doc = Document::load_mem(bytes)?;
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    write_outline(&mut doc, &page_ids, outline)?;
    for link in links {
        write_link(&mut doc, &page_ids, link)?;
    }

    let mut out = Vec::with_capacity(bytes.len());
    doc.save_to(&mut out)?;
    log::debug!(
        "Wrote {} bookmarks and {} contents links",
        outline.len(),
        links.len()
    );
    Ok(out)
}

fn destination(page_ids: &[ObjectId], page: usize) -> Result<Object> {
    let page_id = page
        .checked_sub(1)
        .and_then(|index| page_ids.get(index))
        .ok_or_else(|| DirectoryError::Pdf(format!("Link target page {} does not exist", page)))?;
    Ok(Object::Array(vec![
        Object::Reference(*page_id),
        Object::Name(b"XYZ".to_vec()),
        Object::Null,
        Object::Null,
        Object::Null,
    ]))
}

/// Flat outline, one item per entry, in entry order
fn write_outline(doc: &mut Document, page_ids: &[ObjectId], outline: &[OutlineEntry]) -> Result<()> {
    let root_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = outline.iter().map(|_| doc.new_object_id()).collect();
    let (Some(&first), Some(&last)) = (item_ids.first(), item_ids.last()) else {
        return Ok(());
    };

    for (i, entry) in outline.iter().enumerate() {
        let mut item = Dictionary::new();
        item.set("Title", text_string(&entry.name));
        item.set("Parent", Object::Reference(root_id));
        item.set("Dest", destination(page_ids, entry.page)?);
        if i > 0 {
            item.set("Prev", Object::Reference(item_ids[i - 1]));
        }
        if let Some(&next) = item_ids.get(i + 1) {
            item.set("Next", Object::Reference(next));
        }
        doc.set_object(item_ids[i], item);
    }

    let mut root = Dictionary::new();
    root.set("Type", Object::Name(b"Outlines".to_vec()));
    root.set("First", Object::Reference(first));
    root.set("Last", Object::Reference(last));
    root.set("Count", Object::Integer(outline.len() as i64));
    doc.set_object(root_id, root);

    let catalog = doc.catalog_mut()?;
    catalog.set("Outlines", Object::Reference(root_id));
    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));
    Ok(())
}

fn write_link(doc: &mut Document, page_ids: &[ObjectId], link: &PageLink) -> Result<()> {
    let page_id = link
        .page
        .checked_sub(1)
        .and_then(|index| page_ids.get(index))
        .copied()
        .ok_or_else(|| DirectoryError::Pdf(format!("Link source page {} does not exist", link.page)))?;

    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(b"Link".to_vec()));
    annot.set(
        "Rect",
        Object::Array(link.rect.iter().map(|&v| Object::Real(v)).collect()),
    );
    annot.set(
        "Border",
        Object::Array(vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)]),
    );
    annot.set("Dest", destination(page_ids, link.target)?);
    let annot_id = doc.add_object(annot);

    let page = doc.get_dictionary_mut(page_id)?;
    match page.get_mut(b"Annots") {
        Ok(Object::Array(annots)) => annots.push(Object::Reference(annot_id)),
        _ => page.set("Annots", Object::Array(vec![Object::Reference(annot_id)])),
    }
    Ok(())
}

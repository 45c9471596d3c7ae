use crate::layout::section_page_count;
use crate::options::DirectoryOptions;
use crate::types::*;

/// First page number (1-based) of every section
pub fn section_start_pages(sections: &[Section], options: &DirectoryOptions) -> Vec<usize> {
    let mut next = options.front_matter_pages() + 1;
    let mut starts = Vec::with_capacity(sections.len());
    for section in sections {
        starts.push(next);
        next += section_page_count(section.records.len(), options.items_per_page);
    }
    starts
}

/// Page number (1-based) of the item at `index` in a section starting at `start`
pub fn item_page(start: usize, index: usize, options: &DirectoryOptions) -> usize {
    start + index / options.items_per_page
}

/// Calculate page counts without rendering
pub fn calculate_statistics(
    sections: &[Section],
    options: &DirectoryOptions,
) -> Result<DirectoryStatistics> {
    options.validate()?;

    let pages_per_section: Vec<usize> = sections
        .iter()
        .map(|s| section_page_count(s.records.len(), options.items_per_page))
        .collect();
    let front_matter_pages = options.front_matter_pages();

    Ok(DirectoryStatistics {
        records: sections.iter().map(|s| s.records.len()).sum(),
        front_matter_pages,
        total_pages: front_matter_pages + pages_per_section.iter().sum::<usize>(),
        pages_per_section,
        page_width_in: options.page_width_in(),
        page_height_in: options.page_height_in(),
    })
}

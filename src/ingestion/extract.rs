//! Per-page plain-text extraction from PDF documents.

use tracing::{error, info, warn};

use crate::types::{DocumentSource, PageMap};

/// Extracts the plain text of every page of a PDF.
///
/// Returns a mapping of zero-based page index to page text. Pages with no
/// extractable text are kept in the map (the chunker skips them later);
/// a document that cannot be opened or parsed at all yields an empty map and
/// an error log, never a crash.
pub fn extract_pages(source: &DocumentSource) -> PageMap {
    info!(doc_id = %source.id, path = %source.path.display(), "extracting text");

    let pages = match pdf_extract::extract_text_by_pages(&source.path) {
        Ok(pages) => pages,
        Err(err) => {
            error!(
                doc_id = %source.id,
                file = source.filename(),
                error = %err,
                "text extraction failed"
            );
            return PageMap::new();
        }
    };

    let map: PageMap = pages.into_iter().enumerate().collect();
    for (page_index, text) in &map {
        if text.trim().is_empty() {
            warn!(
                doc_id = %source.id,
                page = page_index + 1,
                "page has no extractable text"
            );
        }
    }

    info!(doc_id = %source.id, pages = map.len(), "finished text extraction");
    map
}

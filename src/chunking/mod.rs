//! Page-wise chunking and chunk identity assignment.
//!
//! [`chunk_pages`] turns a document's extracted [`PageMap`] into an ordered
//! list of [`DocumentChunk`] values. Pages are split independently, so a
//! chunk never spans two pages; each chunk carries the one-based page number
//! it came from. Chunk ids use a single running counter for the whole
//! document, `"{doc_id}_chunk_{n}"`, contiguous from zero no matter how many
//! pages were skipped for being empty.

pub mod splitter;

pub use splitter::RecursiveSplitter;

use serde_json::json;
use tracing::{debug, info};

use crate::types::{DocumentChunk, PageMap};

/// Splits every non-empty page of a document and materializes chunks.
///
/// Pages whose text is empty or whitespace-only are skipped without
/// consuming a sequence number. A document with zero non-empty pages yields
/// an empty vec; this step cannot fail on valid input.
pub fn chunk_pages(
    pages: &PageMap,
    doc_id: &str,
    splitter: &RecursiveSplitter,
) -> Vec<DocumentChunk> {
    info!(
        doc_id,
        chunk_size = splitter.chunk_size(),
        chunk_overlap = splitter.chunk_overlap(),
        "chunking document"
    );

    let mut chunks = Vec::new();
    let mut sequence = 0usize;

    for (page_index, text) in pages {
        if text.trim().is_empty() {
            debug!(doc_id, page = page_index + 1, "skipping empty page");
            continue;
        }

        for segment in splitter.split(text) {
            chunks.push(DocumentChunk {
                doc_id: doc_id.to_string(),
                chunk_id: format!("{doc_id}_chunk_{sequence}"),
                text: segment,
                metadata: json!({ "page_number": page_index + 1 }),
            });
            sequence += 1;
        }
    }

    info!(doc_id, total = chunks.len(), "finished chunking document");
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(entries: &[(usize, &str)]) -> PageMap {
        entries
            .iter()
            .map(|(i, t)| (*i, t.to_string()))
            .collect()
    }

    #[test]
    fn chunk_ids_are_contiguous_across_pages() {
        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        let pages = pages(&[(0, "first page"), (1, "second page"), (2, "third page")]);
        let chunks = chunk_pages(&pages, "report", &splitter);

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_id, format!("report_chunk_{i}"));
            assert_eq!(chunk.doc_id, "report");
        }
    }

    #[test]
    fn empty_pages_do_not_consume_sequence_numbers() {
        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        let pages = pages(&[(0, "content"), (1, "   \n \t "), (2, ""), (3, "more content")]);
        let chunks = chunk_pages(&pages, "doc", &splitter);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_id, "doc_chunk_0");
        assert_eq!(chunks[1].chunk_id, "doc_chunk_1");
        assert_eq!(chunks[0].page_number(), Some(1));
        assert_eq!(chunks[1].page_number(), Some(4));
    }

    #[test]
    fn page_numbers_are_one_based() {
        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        let pages = pages(&[(0, "page one text")]);
        let chunks = chunk_pages(&pages, "doc", &splitter);
        assert_eq!(chunks[0].page_number(), Some(1));
    }

    #[test]
    fn document_with_no_extractable_text_yields_no_chunks() {
        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        let pages = pages(&[(0, ""), (1, "  ")]);
        assert!(chunk_pages(&pages, "doc", &splitter).is_empty());
    }

    #[test]
    fn word_chunks_and_ids_for_a_single_page() {
        let splitter = RecursiveSplitter::new(9, 0).unwrap();
        let pages = pages(&[(0, "AAAA BBBB CCCC")]);
        let chunks = chunk_pages(&pages, "x", &splitter);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["AAAA", "BBBB", "CCCC"]);
        let ids: Vec<&str> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["x_chunk_0", "x_chunk_1", "x_chunk_2"]);
        assert!(chunks.iter().all(|c| c.page_number() == Some(1)));
    }

    #[test]
    fn multi_page_document_is_page_major_ordered() {
        let splitter = RecursiveSplitter::new(9, 0).unwrap();
        let pages = pages(&[(0, "AAAA BBBB"), (1, "CCCC DDDD")]);
        let chunks = chunk_pages(&pages, "doc", &splitter);

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].page_number(), Some(1));
        assert_eq!(chunks[1].page_number(), Some(1));
        assert_eq!(chunks[2].page_number(), Some(2));
        assert_eq!(chunks[3].page_number(), Some(2));
        assert_eq!(chunks[3].chunk_id, "doc_chunk_3");
    }
}

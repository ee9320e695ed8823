//! Document discovery and text extraction.
//!
//! * [`load_documents`] — recursive directory scan producing one
//!   [`DocumentSource`] per PDF found.
//! * [`extract`] — per-page plain-text extraction from a source document.
//!
//! Both sides fail soft: an unreadable directory or a broken document is
//! logged and yields an empty result, so one bad input never aborts a batch.

pub mod extract;

pub use extract::extract_pages;

use std::path::Path;

use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::types::DocumentSource;

/// Scans `dir` recursively for PDF files and builds document sources.
///
/// The document id is the filename stem. Results are sorted by path so
/// repeated runs ingest in a stable order. A missing or unreadable directory
/// is logged and yields an empty list.
pub fn load_documents(dir: impl AsRef<Path>) -> Vec<DocumentSource> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        error!(dir = %dir.display(), "source directory not found or not a directory");
        return Vec::new();
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_pdf(path) {
            continue;
        }
        match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => sources.push(DocumentSource::new(stem, path)),
            None => warn!(path = %path.display(), "skipping file with unusable name"),
        }
    }
    sources.sort_by(|a, b| a.path.cmp(&b.path));

    info!(count = sources.len(), dir = %dir.display(), "discovered PDF documents");
    sources
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_directory_yields_empty_list() {
        assert!(load_documents("/definitely/not/here").is_empty());
    }

    #[test]
    fn discovery_is_recursive_and_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b_report.pdf"), b"").unwrap();
        fs::write(dir.path().join("nested/a_report.PDF"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let sources = load_documents(dir.path());
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].id, "b_report");
        assert_eq!(sources[1].id, "a_report");
    }

    #[test]
    fn document_id_is_the_filename_stem() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("annual_audit_2023.pdf"), b"").unwrap();
        let sources = load_documents(dir.path());
        assert_eq!(sources[0].id, "annual_audit_2023");
    }
}

//! Document reader: load a PDF from local storage and flatten its text.
//!
//! lopdf is synchronous and CPU-bound on large documents, so the async
//! entry point [`read_document`] runs the parse on the blocking pool.
//! The `%PDF` magic bytes are checked first so a renamed text file gives a
//! meaningful error instead of a parser failure deep inside lopdf.

use crate::error::AnalyzerError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read every page of the PDF at `path` (async wrapper around [`read_pdf`]).
pub async fn read_document(path: &Path) -> Result<String, AnalyzerError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_pdf(&path))
        .await
        .map_err(|e| AnalyzerError::Internal(format!("PDF reader task panicked: {}", e)))?
}

/// Read every page of the PDF at `path` and join their text.
///
/// Pages are visited in page-number order. Within a page, doubled newlines
/// are collapsed to one; each page ends with a newline.
pub fn read_pdf(path: &Path) -> Result<String, AnalyzerError> {
    if !path.exists() {
        return Err(AnalyzerError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    check_magic(path)?;

    let doc = lopdf::Document::load(path).map_err(|e| AnalyzerError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for (page_num, _) in pages {
        match doc.extract_text(&[page_num]) {
            Ok(text) => texts.push(text),
            Err(e) => {
                // Unsupported font encodings yield no text; keep the page slot.
                warn!("{}: page {} has no extractable text: {}", path.display(), page_num, e);
                texts.push(String::new());
            }
        }
    }

    let text = join_pages(texts);
    debug!("Read {} chars from {}", text.len(), path.display());
    Ok(text)
}

/// Concatenate page texts, collapsing `"\n\n"` to `"\n"` and terminating
/// each page with a newline.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut full = String::new();
    for page in pages {
        full.push_str(&page.as_ref().replace("\n\n", "\n"));
        full.push('\n');
    }
    full
}

fn check_magic(path: &Path) -> Result<(), AnalyzerError> {
    let not_found = || AnalyzerError::FileNotFound {
        path: PathBuf::from(path),
    };
    let mut f = std::fs::File::open(path).map_err(|_| not_found())?;
    let mut magic = [0u8; 4];
    if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
        return Err(AnalyzerError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

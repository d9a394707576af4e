//! PDF text extraction.
//!
//! Turns uploaded or on-disk PDF bytes into a [`Document`] with one page per
//! PDF page, numbered from 1. Extraction never panics; callers get an
//! [`ExtractError`] and decide whether to skip the file or reject the request.

use std::path::Path;

use manual_qa_core::models::Document;

#[derive(Debug)]
pub enum ExtractError {
    /// The file name does not end in `.pdf`.
    NotPdf(String),
    /// The PDF parser rejected the bytes.
    Pdf(String),
    /// Parsed, but no page carries any text (scanned images, empty file).
    Empty(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::NotPdf(_) => write!(f, "Only PDF files are supported"),
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Empty(name) => write!(f, "{} contains no extractable text", name),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Case-insensitive `.pdf` extension check.
pub fn is_pdf_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Extract the text of every page, in order.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Build a [`Document`] named `name` from PDF bytes.
pub fn document_from_pdf(name: &str, bytes: &[u8]) -> Result<Document, ExtractError> {
    if !is_pdf_name(name) {
        return Err(ExtractError::NotPdf(name.to_string()));
    }

    let pages = extract_pdf_pages(bytes)?;
    let document = pages
        .into_iter()
        .enumerate()
        .fold(Document::new(name), |doc, (i, text)| {
            doc.with_page(i as u32 + 1, text)
        });

    if document.pages.is_empty() || document.is_blank() {
        return Err(ExtractError::Empty(name.to_string()));
    }
    Ok(document)
}

/// Read and extract a PDF from disk. The document is named by its file name.
pub fn document_from_path(path: &Path) -> anyhow::Result<Document> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    if !is_pdf_name(&name) {
        return Err(ExtractError::NotPdf(name).into());
    }
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    Ok(document_from_pdf(&name, &bytes)?)
}

use crate::{AnalyzeError, Page};
use lopdf::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not extract page {page}: {message}")]
pub struct ExtractError {
    pub page: usize,
    pub message: String,
}

/// A paged document that can report its length and hand out raw page text.
///
/// `page_text` is only called with indices below `page_count`.
pub trait PageSource {
    fn page_count(&self) -> usize;
    fn page_text(&self, index: usize) -> Result<String, ExtractError>;
}

/// PDF document loaded with lopdf.
pub struct PdfSource {
    path: PathBuf,
    doc: Document,
    // lopdf page numbers are 1-based and may be sparse
    page_numbers: Vec<u32>,
}

impl PdfSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AnalyzeError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(AnalyzeError::SourceNotFound(path));
        }
        let doc = Document::load(&path)
            .map_err(|e| AnalyzeError::Pdf { path: path.clone(), message: e.to_string() })?;
        let page_numbers = doc.get_pages().keys().copied().collect();
        Ok(Self { path, doc, page_numbers })
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl PageSource for PdfSource {
    fn page_count(&self) -> usize { self.page_numbers.len() }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        debug_assert!(index < self.page_numbers.len(), "page {index} out of range");
        let number = self.page_numbers[index];
        self.doc
            .extract_text(&[number])
            .map_err(|e| ExtractError { page: index, message: e.to_string() })
    }
}

/// In-memory pages; an `Err` entry simulates a page the extractor could not read.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<Result<String, String>>,
}

impl MemorySource {
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { pages: pages.into_iter().map(|p| Ok(p.into())).collect() }
    }

    pub fn push_failed(&mut self, message: impl Into<String>) {
        self.pages.push(Err(message.into()));
    }
}

impl PageSource for MemorySource {
    fn page_count(&self) -> usize { self.pages.len() }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        self.pages[index]
            .clone()
            .map_err(|message| ExtractError { page: index, message })
    }
}

/// Materialize every page up front. A page that fails to extract becomes an
/// empty page so the rest of the document is still counted.
pub fn extract_pages(source: &dyn PageSource) -> Vec<Page> {
    let total = source.page_count();
    let mut pages = Vec::with_capacity(total);
    let mut failed = 0usize;
    for index in 0..total {
        match source.page_text(index) {
            Ok(text) => pages.push(Page::new(index, text)),
            Err(err) => {
                tracing::warn!(page = index, error = %err, "page extraction failed, counting it as empty");
                failed += 1;
                pages.push(Page::empty(index));
            }
        }
    }
    tracing::info!(pages = total, failed, "extracted page text");
    pages
}

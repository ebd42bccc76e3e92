use crate::tokenizer::compose;

/// Text extracted from one page of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    index: usize,
    text: String,
    paragraphs: Vec<String>,
}

impl Page {
    /// `index` is zero-based. Paragraphs are the non-blank lines of `text`, trimmed.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let raw: String = text.into();
        let text = compose(&raw).into_owned();
        let paragraphs = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self { index, text, paragraphs }
    }

    pub fn empty(index: usize) -> Self { Self::new(index, String::new()) }

    pub fn index(&self) -> usize { self.index }

    pub fn text(&self) -> &str { &self.text }

    pub fn paragraphs(&self) -> &[String] { &self.paragraphs }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_skip_blank_lines() {
        let page = Page::new(2, "  primera línea \n\n   \nsegunda\r\n");
        assert_eq!(page.index(), 2);
        assert_eq!(page.paragraphs(), &["primera línea".to_string(), "segunda".to_string()]);
    }

    #[test]
    fn empty_page_has_no_paragraphs() {
        assert!(Page::empty(0).paragraphs().is_empty());
    }
}

use crate::tokenizer::{normalize, tokenize_with_offsets};
use crate::{FrequencyTable, Page};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hard cap on words in a phrase query.
pub const MAX_QUERY_TERMS: usize = 3;
/// A following term must sit at most this many positions after the previous one.
pub const MAX_TERM_DISTANCE: usize = 3;
/// Tokens this short (in characters) are dropped by the common-word filter.
pub const MIN_UNCOMMON_LEN: usize = 3;

const SNIPPET_BEFORE: usize = 80;
const SNIPPET_AFTER: usize = 160;

lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "el","la","de","que","y","a","en","un","ser","se","no","haber","por","con","su","para",
            "como","estar","tener","le","lo","todo","pero","más","hacer","o","poder","decir","este",
            "ir","otro","ese","si","me","ya","ver","porque","dar","cuando","él","muy","sin","vez",
            "mucho","saber","qué","sobre","mi","alguno","mismo","yo","también","hasta","año","dos",
            "querer","entre","así","primero","desde","grande","eso","ni","nos","llegar","pasar",
            "tiempo","ella","sí","día","uno","bien","poco","deber","entonces","poner","cosa","tanto",
            "hombre","parecer","nuestro","tan","donde","ahora","parte","después","vida","quedar",
            "siempre","creer","hablar","llevar","dejar","nada","cada","seguir","menos","nuevo",
            "encontrar","algo","solo","salir","volver","tomar","conocer","vivir","sentir","tratar",
            "mirar","contar","empezar","esperar","buscar","existir","entrar","trabajar","escribir",
            "perder","producir","ocurrir"
        ];
        words.iter().copied().collect()
    };
}

/// True for stop-words and tokens shorter than [`MIN_UNCOMMON_LEN`].
pub fn is_common(token: &str) -> bool {
    STOPWORDS.contains(token) || token.chars().count() < MIN_UNCOMMON_LEN
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopK {
    All,
    Limit(usize),
}

impl TopK {
    fn limit(self) -> usize {
        match self {
            TopK::All => usize::MAX,
            TopK::Limit(n) => n,
        }
    }
}

impl Default for TopK {
    fn default() -> Self { TopK::Limit(10) }
}

impl FromStr for TopK {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(TopK::All);
        }
        match s.parse::<usize>() {
            Ok(0) => Err("top-k must be positive".into()),
            Ok(n) => Ok(TopK::Limit(n)),
            Err(_) => Err(format!("expected a positive number or \"all\", got {s:?}")),
        }
    }
}

impl fmt::Display for TopK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopK::All => f.write_str("all"),
            TopK::Limit(n) => write!(f, "{n}"),
        }
    }
}

/// Most frequent tokens, ties in first-encountered order.
///
/// With `exclude_common` the ranking is computed over a filtered view; the
/// table itself is left untouched.
pub fn top_k(table: &FrequencyTable, k: TopK, exclude_common: bool) -> Vec<(String, u64)> {
    table
        .ranked()
        .into_iter()
        .filter(|(token, _)| !exclude_common || !is_common(token))
        .take(k.limit())
        .map(|(token, count)| (token.to_string(), count))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query contains no searchable words")]
    Empty,
    #[error("query has {0} words, at most {MAX_QUERY_TERMS} are allowed")]
    TooManyTerms(usize),
}

/// One to three normalized words searched in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    /// Normalize `raw` with the corpus tokenizer and validate the word count.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let terms = normalize(raw);
        match terms.len() {
            0 => Err(QueryError::Empty),
            n if n > MAX_QUERY_TERMS => Err(QueryError::TooManyTerms(n)),
            _ => Ok(Self { terms }),
        }
    }

    pub fn terms(&self) -> &[String] { &self.terms }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub page: usize,
    /// 1-based within the page.
    pub paragraph: usize,
    pub snippet: String,
}

/// Index of the first token where `terms` match in order, each following term
/// within [`MAX_TERM_DISTANCE`] positions of the previous one.
///
/// Every candidate inside a window is tried, so an earlier occurrence of a
/// term does not hide a later one that lets the rest of the phrase fit.
pub fn find_match<T: AsRef<str>>(tokens: &[T], terms: &[T]) -> Option<usize> {
    let (first, rest) = terms.split_first()?;
    (0..tokens.len()).find(|&start| tokens[start].as_ref() == first.as_ref() && follows(tokens, start, rest))
}

fn follows<T: AsRef<str>>(tokens: &[T], prev: usize, rest: &[T]) -> bool {
    let Some((term, rest)) = rest.split_first() else {
        return true;
    };
    let window_end = (prev + MAX_TERM_DISTANCE).min(tokens.len().saturating_sub(1));
    (prev + 1..=window_end).any(|i| tokens[i].as_ref() == term.as_ref() && follows(tokens, i, rest))
}

/// Every paragraph of every page where `query` matches, in document order.
pub fn search(pages: &[Page], query: &SearchQuery) -> Vec<SearchHit> {
    let terms: Vec<&str> = query.terms.iter().map(String::as_str).collect();
    let mut hits = Vec::new();
    for page in pages {
        for (i, paragraph) in page.paragraphs().iter().enumerate() {
            let tokens = tokenize_with_offsets(paragraph);
            let words: Vec<&str> = tokens.iter().map(|(t, _)| t.as_str()).collect();
            if let Some(start) = find_match(&words, &terms) {
                hits.push(SearchHit {
                    page: page.index(),
                    paragraph: i + 1,
                    snippet: snippet(paragraph, tokens[start].1),
                });
            }
        }
    }
    tracing::debug!(terms = ?query.terms, hits = hits.len(), "phrase search finished");
    hits
}

/// Window of the paragraph around byte offset `at`, in whole characters.
fn snippet(text: &str, at: usize) -> String {
    let before = text[..at].chars().count();
    let start_char = before.saturating_sub(SNIPPET_BEFORE);
    let mut out = String::new();
    if start_char > 0 {
        out.push_str("...");
    }
    let window: String = text.chars().skip(start_char).take(SNIPPET_BEFORE + SNIPPET_AFTER).collect();
    let truncated = start_char + window.chars().count() < text.chars().count();
    out.push_str(&window);
    if truncated {
        out.push_str("...");
    }
    out
}

use pagefreq_core::query::{find_match, is_common, MAX_QUERY_TERMS};
use pagefreq_core::{search, top_k, FrequencyTable, Page, QueryError, SearchQuery, TopK};

fn toks(s: &str) -> Vec<&str> { s.split_whitespace().collect() }

#[test]
fn top_k_ties_keep_insertion_order() {
    let table = FrequencyTable::from_counts([("a", 5), ("b", 5), ("c", 3)]);
    assert_eq!(top_k(&table, TopK::Limit(2), false), vec![("a".to_string(), 5), ("b".to_string(), 5)]);

    let reversed = FrequencyTable::from_counts([("b", 5), ("a", 5), ("c", 3)]);
    assert_eq!(top_k(&reversed, TopK::Limit(2), false), vec![("b".to_string(), 5), ("a".to_string(), 5)]);
}

#[test]
fn top_k_all_returns_everything() {
    let table = FrequencyTable::from_counts([("x", 1), ("y", 4), ("z", 2)]);
    let all = top_k(&table, TopK::All, false);
    assert_eq!(all, vec![("y".to_string(), 4), ("z".to_string(), 2), ("x".to_string(), 1)]);
    assert_eq!(top_k(&table, TopK::Limit(10), false).len(), 3);
}

#[test]
fn stop_words_and_short_tokens_are_excluded() {
    let table = FrequencyTable::from_counts([("el", 10), ("dato", 3), ("de", 7)]);
    assert_eq!(top_k(&table, TopK::All, true), vec![("dato".to_string(), 3)]);
    // the filter is a view; the table keeps everything
    assert_eq!(table.get("el"), Some(10));
    assert_eq!(top_k(&table, TopK::All, false).len(), 3);
}

#[test]
fn common_word_rules() {
    assert!(is_common("también"));
    assert!(is_common("xy"));
    assert!(is_common("ñu"));
    assert!(!is_common("ñus"));
    assert!(!is_common("datos"));
}

#[test]
fn ties_in_document_follow_first_occurrence() {
    use pagefreq_core::pipeline::{count_batch, AlphabetNormalizer};
    let pages = vec![Page::new(0, "zeta alfa"), Page::new(1, "alfa zeta beta")];
    let batch = pagefreq_core::Batch { id: 0, pages: &pages };
    let table = count_batch(batch, &AlphabetNormalizer, |_| {}).unwrap();
    let ranked = top_k(&table, TopK::All, false);
    assert_eq!(
        ranked,
        vec![("zeta".to_string(), 2), ("alfa".to_string(), 2), ("beta".to_string(), 1)]
    );
}

#[test]
fn proximity_within_three_positions() {
    assert_eq!(find_match(&toks("uno x y dos z tres"), &toks("uno dos tres")), Some(0));
}

#[test]
fn proximity_gap_of_four_fails() {
    assert_eq!(find_match(&toks("uno a b c z tres"), &toks("uno z tres")), None);
}

#[test]
fn single_term_is_containment() {
    assert_eq!(find_match(&toks("a b c datos"), &toks("datos")), Some(3));
    assert_eq!(find_match(&toks("a b c"), &toks("datos")), None);
}

#[test]
fn query_accepts_up_to_three_words() {
    let q = SearchQuery::parse("Análisis de DATOS").unwrap();
    assert_eq!(q.terms(), &["análisis", "de", "datos"]);
    assert_eq!(q.terms().len(), MAX_QUERY_TERMS);
}

#[test]
fn query_rejects_four_words() {
    assert_eq!(SearchQuery::parse("uno dos tres cuatro"), Err(QueryError::TooManyTerms(4)));
}

#[test]
fn query_rejects_blank_input() {
    assert_eq!(SearchQuery::parse("   "), Err(QueryError::Empty));
    assert_eq!(SearchQuery::parse("123 ?!"), Err(QueryError::Empty));
}

#[test]
fn search_reports_page_and_paragraph() {
    let pages = vec![
        Page::new(0, "Introducción\nEl análisis exploratorio de datos es clave."),
        Page::new(1, ""),
        Page::new(2, "Nada aquí.\n\nOtro análisis rápido de los datos.\nanálisis sin nada"),
    ];
    let q = SearchQuery::parse("análisis datos").unwrap();
    let hits = search(&pages, &q);
    let positions: Vec<(usize, usize)> = hits.iter().map(|h| (h.page, h.paragraph)).collect();
    // page 2 paragraph 2 puts "datos" four positions after "análisis"
    assert_eq!(positions, vec![(0, 2)]);
    assert!(hits[0].snippet.contains("análisis exploratorio"));
}

#[test]
fn search_one_hit_per_paragraph() {
    let pages = vec![Page::new(0, "datos datos datos\notra línea\nmás datos")];
    let q = SearchQuery::parse("DATOS").unwrap();
    let hits = search(&pages, &q);
    let positions: Vec<(usize, usize)> = hits.iter().map(|h| (h.page, h.paragraph)).collect();
    assert_eq!(positions, vec![(0, 1), (0, 3)]);
}

#[test]
fn repeated_middle_term_does_not_block_match() {
    assert_eq!(find_match(&toks("a b b x x c"), &toks("a b c")), Some(0));

    let pages = vec![Page::new(0, "Tabla de datos de de varias filas prueba")];
    let q = SearchQuery::parse("datos de prueba").unwrap();
    let hits = search(&pages, &q);
    assert_eq!(hits.len(), 1);
    assert_eq!((hits[0].page, hits[0].paragraph), (0, 1));
}

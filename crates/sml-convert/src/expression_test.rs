use super::*;

fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_tokenize_roundtrips_text() {
    let expr = "(revenue - cost) / NULLIF(orders, 0) * 'x y' + [Measures].[a b]";
    let joined: String = tokenize(expr).iter().map(Token::text).collect();
    assert_eq!(joined, expr);
}

#[test]
fn test_tokenize_kinds() {
    let tokens = tokenize("a+[b c]*'d'");
    assert_eq!(
        tokens,
        vec![
            Token::Ident("a"),
            Token::Other("+"),
            Token::Bracketed("[b c]"),
            Token::Other("*"),
            Token::Quoted("'d'"),
        ]
    );
}

#[test]
fn test_substitute_does_not_touch_longer_names() {
    let out = substitute_identifiers(
        "revenue - revenue_adjusted",
        &map(&[("revenue", "[Measures].[revenue]")]),
    );
    assert_eq!(out, "[Measures].[revenue] - revenue_adjusted");
}

#[test]
fn test_substitute_skips_quoted_and_bracketed() {
    let out = substitute_identifiers(
        "orders + 'orders' + [orders]",
        &map(&[("orders", "[Measures].[orders]")]),
    );
    assert_eq!(out, "[Measures].[orders] + 'orders' + [orders]");
}

#[test]
fn test_numbers_are_not_identifiers() {
    assert_eq!(identifiers("2e3 * revenue + 1_000"), vec!["revenue"]);
}

#[test]
fn test_identifiers_are_deduplicated() {
    assert_eq!(identifiers("a * a + b"), vec!["a", "b"]);
}

#[test]
fn test_unterminated_bracket_consumes_rest() {
    let tokens = tokenize("x + [oops");
    assert_eq!(tokens.last(), Some(&Token::Bracketed("[oops")));
}

#[test]
fn test_references_measure_requires_exact_bracket() {
    let expr = "[Measures].[revenue_adjusted] / [Measures].[orders]";
    assert!(references_measure(expr, "orders"));
    assert!(!references_measure(expr, "revenue"));
}

//! Identifier and SQL text helpers

/// Collapse every whitespace run to a single space and trim the ends.
///
/// Used to compare generated SQL expressions independent of formatting.
///
/// # Examples
/// ```
/// use sml_core::ident::normalize_whitespace;
/// assert_eq!(normalize_whitespace("  a \n  +\tb "), "a + b");
/// ```
pub fn normalize_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `s` is a plain unquoted SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
///
/// # Examples
/// ```
/// use sml_core::ident::is_plain_identifier;
/// assert!(is_plain_identifier("order_total"));
/// assert!(!is_plain_identifier("amount * 2"));
/// assert!(!is_plain_identifier("1"));
/// ```
pub fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Upper-case SQL text, leaving single-quoted string literals untouched.
///
/// Doubled quotes inside a literal (`'it''s'`) are treated as part of the
/// literal.
///
/// # Examples
/// ```
/// use sml_core::ident::upper_outside_literals;
/// assert_eq!(
///     upper_outside_literals("case when status = 'done' then amount end"),
///     "CASE WHEN STATUS = 'done' THEN AMOUNT END"
/// );
/// ```
pub fn upper_outside_literals(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_literal = false;
    for c in sql.chars() {
        if c == '\'' {
            in_literal = !in_literal;
            out.push(c);
        } else if in_literal {
            out.push(c);
        } else {
            out.extend(c.to_uppercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace_multiline() {
        assert_eq!(
            normalize_whitespace("CASE WHEN x\n    THEN y\n  ELSE NULL END"),
            "CASE WHEN x THEN y ELSE NULL END"
        );
    }

    #[test]
    fn test_is_plain_identifier_edge_cases() {
        assert!(is_plain_identifier("_hidden"));
        assert!(is_plain_identifier("col1"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("schema.col"));
        assert!(!is_plain_identifier("\"quoted\""));
    }

    #[test]
    fn test_upper_outside_literals_escaped_quote() {
        assert_eq!(
            upper_outside_literals("name = 'it''s' or x"),
            "NAME = 'it''s' OR X"
        );
    }
}

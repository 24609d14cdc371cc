//! Tokenized metric expressions
//!
//! Derived metric expressions are rewritten by swapping identifier tokens,
//! never by substring replacement, so `revenue` cannot match inside
//! `revenue_adjusted`.

use std::collections::HashMap;

/// A lexical piece of an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Ident(&'a str),
    /// `[...]` member reference, kept verbatim
    Bracketed(&'a str),
    /// Single- or double-quoted text, kept verbatim
    Quoted(&'a str),
    /// Anything else (operators, numbers, whitespace)
    Other(&'a str),
}

impl<'a> Token<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Token::Ident(s) | Token::Bracketed(s) | Token::Quoted(s) | Token::Other(s) => s,
        }
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Split an expression into tokens. Concatenating the token texts yields the
/// input unchanged.
pub fn tokenize(expr: &str) -> Vec<Token<'_>> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let c = bytes[i];
        if is_ident_start(c) {
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            tokens.push(Token::Ident(&expr[start..i]));
        } else if c.is_ascii_digit() {
            // numbers like `1e3` or `2_000` must not leak an identifier tail
            while i < bytes.len() && (is_ident_continue(bytes[i]) || bytes[i] == b'.') {
                i += 1;
            }
            tokens.push(Token::Other(&expr[start..i]));
        } else if c == b'[' {
            i = expr[i..].find(']').map_or(bytes.len(), |end| i + end + 1);
            tokens.push(Token::Bracketed(&expr[start..i]));
        } else if c == b'\'' || c == b'"' {
            i += 1;
            while i < bytes.len() && bytes[i] != c {
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            tokens.push(Token::Quoted(&expr[start..i]));
        } else {
            // advance by a whole char so multi-byte text stays on a boundary
            i += expr[i..].chars().next().map_or(1, char::len_utf8);
            tokens.push(Token::Other(&expr[start..i]));
        }
    }
    tokens
}

/// Identifiers appearing in an expression, in order, without duplicates
pub fn identifiers(expr: &str) -> Vec<&str> {
    let mut seen = Vec::new();
    for token in tokenize(expr) {
        if let Token::Ident(name) = token {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
    }
    seen
}

/// Replace whole identifier tokens found in `replacements`
pub fn substitute_identifiers(expr: &str, replacements: &HashMap<String, String>) -> String {
    tokenize(expr)
        .into_iter()
        .map(|token| match token {
            Token::Ident(name) => replacements.get(name).map_or(name, String::as_str),
            other => other.text(),
        })
        .collect()
}

/// MDX member reference to a measure
pub fn measure_ref(name: &str) -> String {
    format!("[Measures].[{}]", name)
}

/// Whether an MDX expression refers to the named measure
pub fn references_measure(expr: &str, name: &str) -> bool {
    expr.contains(&measure_ref(name))
}

#[cfg(test)]
#[path = "expression_test.rs"]
mod tests;

//! Shared serde helpers for the loosely-typed corners of dbt YAML.

use serde::{Deserialize, Deserializer};

/// A scalar that dbt accepts where an expression string is expected
/// (`expr: 1`, `expr: true`).
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarExpr {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<ScalarExpr> for String {
    fn from(value: ScalarExpr) -> Self {
        match value {
            ScalarExpr::Text(s) => s,
            ScalarExpr::Integer(i) => i.to_string(),
            ScalarExpr::Float(f) => f.to_string(),
            ScalarExpr::Bool(b) => b.to_string(),
        }
    }
}

/// Deserialize an optional expression that may be written as any YAML scalar.
pub fn deserialize_expr<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<ScalarExpr> = Option::deserialize(deserializer)?;
    Ok(raw.map(String::from))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Deserialize a filter given either as a single string or as a list.
pub fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<OneOrMany> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

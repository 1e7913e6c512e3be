//! Field helpers shared by the record models
//!
//! Submissions arrive with blank strings where a value is absent and with
//! numeric columns sometimes quoted. Readers go through [`present`] so that
//! `""`, `"   "` and `null` are all treated as missing.

use serde::{Deserialize, Deserializer};

/// Borrow a field's value when it holds non-blank text
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Uppercased copy of a non-blank field
pub fn upper(value: &Option<String>) -> Option<String> {
    present(value).map(str::to_uppercase)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Accept `2`, `"2"` or blank for an integer column
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Int(v)) => i32::try_from(v).ok(),
        Some(NumberOrText::Float(v)) if v.fract() == 0.0 => Some(v as i32),
        Some(NumberOrText::Float(_)) => None,
        Some(NumberOrText::Text(s)) => s.trim().parse::<i32>().ok(),
        None => None,
    })
}

/// Accept `100`, `100.5`, `"100.5"` or blank for an amount column
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Int(v)) => Some(v as f64),
        Some(NumberOrText::Float(v)) => Some(v),
        Some(NumberOrText::Text(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        None => None,
    })
}

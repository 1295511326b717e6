use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AmountParseError;

/// What to do with a quantity or price cell that cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Substitute zero and keep going (best-effort reporting)
    #[default]
    Lenient,
    /// Fail the import, naming the offending row
    Strict,
}

impl NumericPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericPolicy::Lenient => "lenient",
            NumericPolicy::Strict => "strict",
        }
    }
}

/// Parse a currency-formatted amount such as `$1,234.56` or `($40.00)`.
///
/// Currency symbols, thousands separators and whitespace are ignored;
/// accounting-style parentheses mean a negative value.
pub fn parse_amount(text: &str) -> Result<Decimal, AmountParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(AmountParseError::Invalid(text.to_string()));
    }

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| AmountParseError::Invalid(text.to_string()))?;

    Ok(if negative { -value } else { value })
}

//! Month/year token substitution.
//!
//! A `SubstitutionSpec` holds the validated month pair and optional year pair
//! for one batch run. Matching is literal and global: every occurrence of the
//! search token is replaced in a single pass, month first, then year.

use serde::Serialize;

use crate::error::{Error, Result};

/// Glyph that follows the month digits in a month token (`3月`).
pub const MONTH_MARKER: char = '月';

/// A literal search/replacement pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub search: String,
    pub replacement: String,
}

impl TokenPair {
    pub fn month(old: u8, new: u8) -> Self {
        TokenPair {
            search: format!("{}{}", old, MONTH_MARKER),
            replacement: format!("{}{}", new, MONTH_MARKER),
        }
    }

    pub fn year(old: i32, new: i32) -> Self {
        TokenPair {
            search: old.to_string(),
            replacement: new.to_string(),
        }
    }

    /// Replace every occurrence of the search token.
    ///
    /// Returns `None` when the token does not occur, so callers can skip the write.
    pub fn substitute(&self, text: &str) -> Option<String> {
        if self.search.is_empty() || !text.contains(&self.search) {
            return None;
        }
        Some(text.replace(&self.search, &self.replacement))
    }
}

/// Validated substitution parameters for one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionSpec {
    pub old_month: u8,
    pub new_month: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_year: Option<i32>,
}

impl SubstitutionSpec {
    pub fn new(old_month: u8, new_month: u8, years: Option<(i32, i32)>) -> Result<Self> {
        validate_month("from_month", old_month)?;
        validate_month("to_month", new_month)?;

        if old_month == new_month {
            return Err(Error::validation_invalid_argument(
                "to_month",
                "New month must differ from the old month",
                Some(new_month.to_string()),
                None,
            ));
        }

        if let Some((old_year, new_year)) = years {
            if old_year == new_year {
                return Err(Error::validation_invalid_argument(
                    "to_year",
                    "New year must differ from the old year",
                    Some(new_year.to_string()),
                    None,
                ));
            }
        }

        Ok(SubstitutionSpec {
            old_month,
            new_month,
            old_year: years.map(|(old, _)| old),
            new_year: years.map(|(_, new)| new),
        })
    }

    pub fn month_token(&self) -> TokenPair {
        TokenPair::month(self.old_month, self.new_month)
    }

    pub fn year_token(&self) -> Option<TokenPair> {
        match (self.old_year, self.new_year) {
            (Some(old), Some(new)) => Some(TokenPair::year(old, new)),
            _ => None,
        }
    }

    /// Apply the month substitution, then the year substitution, to `text`.
    ///
    /// Each token contributes to the changed flag on its own; the year pass sees
    /// the month-updated text and no further pass is made.
    pub fn apply(&self, text: &str) -> Option<String> {
        let after_month = self.month_token().substitute(text);
        let current = after_month.as_deref().unwrap_or(text);

        let after_year = self
            .year_token()
            .and_then(|token| token.substitute(current));

        after_year.or(after_month)
    }
}

fn validate_month(field: &str, month: u8) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(Error::validation_invalid_argument(
            field,
            "Month must be a number from 1 to 12",
            Some(month.to_string()),
            None,
        ))
    }
}

/// Parse a month typed by the user.
pub fn parse_month(field: &str, input: &str) -> Result<u8> {
    let month = input.trim().parse::<u8>().map_err(|_| {
        Error::validation_invalid_argument(
            field,
            "Month must be a number from 1 to 12",
            Some(input.trim().to_string()),
            None,
        )
    })?;
    validate_month(field, month)?;
    Ok(month)
}

/// Parse a year typed by the user.
pub fn parse_year(field: &str, input: &str) -> Result<i32> {
    input.trim().parse::<i32>().map_err(|_| {
        Error::validation_invalid_argument(
            field,
            "Year must be a whole number",
            Some(input.trim().to_string()),
            None,
        )
    })
}

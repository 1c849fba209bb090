//! Input validation primitives.
//!
//! Provides ergonomic helpers for common validation patterns:
//! - Unwrapping Option values with descriptive errors
//! - Requiring paired options to be given together

use crate::error::{Error, Result};

/// Require an Option to contain a value.
///
/// Replaces the common pattern:
/// ```ignore
/// value.ok_or_else(|| Error::validation_missing_argument(vec!["field".into()]))?
/// ```
pub fn require<T>(opt: Option<T>, field: &str) -> Result<T> {
    opt.ok_or_else(|| Error::validation_missing_argument(vec![field.to_string()]))
}

/// Require two options to be either both present or both absent.
pub fn require_pair<T>(
    first: Option<T>,
    second: Option<T>,
    first_field: &str,
    second_field: &str,
) -> Result<Option<(T, T)>> {
    match (first, second) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(Error::validation_invalid_argument(
            second_field,
            format!("--{} requires --{}", first_field.replace('_', "-"), second_field.replace('_', "-")),
            None,
            None,
        )),
        (None, Some(_)) => Err(Error::validation_invalid_argument(
            first_field,
            format!("--{} requires --{}", second_field.replace('_', "-"), first_field.replace('_', "-")),
            None,
            None,
        )),
    }
}

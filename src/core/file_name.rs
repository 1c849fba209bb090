//! File name transformation.
//!
//! Only the stem is rewritten; the extension (from the last `.`) is kept
//! verbatim, including its case.

use crate::substitution::SubstitutionSpec;

/// Split a file name at its last `.` into `(stem, extension)`.
///
/// The extension keeps its leading dot. A name without a dot has an empty extension.
pub fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) => file_name.split_at(idx),
        None => (file_name, ""),
    }
}

/// Compute the new file name for `file_name` under `spec`.
pub fn transform_name(file_name: &str, spec: &SubstitutionSpec) -> String {
    let (stem, extension) = split_name(file_name);

    let mut new_stem = spec
        .month_token()
        .substitute(stem)
        .unwrap_or_else(|| stem.to_string());

    if let Some(year) = spec.year_token() {
        if let Some(updated) = year.substitute(&new_stem) {
            new_stem = updated;
        }
    }

    format!("{}{}", new_stem, extension)
}

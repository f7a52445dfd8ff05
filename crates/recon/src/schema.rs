//! Column-presence contracts, checked before any row is processed.

use crate::error::ReconError;

/// Which copy of a repeated header name a column resolves to.
///
/// Worksheet headers are searched left to right (`First`). CSV rows are read
/// as name-to-value maps, where a later column overwrites an earlier one of the
/// same name (`Last`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplicates {
    First,
    Last,
}

/// Resolve every `required` column against `actual`, in contract order.
///
/// Matching is exact and case-sensitive. Fails once, naming all missing columns.
pub fn require_columns<S: AsRef<str>>(
    source: &str,
    required: &[&str],
    actual: &[S],
    duplicates: Duplicates,
) -> Result<Vec<usize>, ReconError> {
    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();

    for name in required {
        let is_name = |h: &S| h.as_ref() == *name;
        let found = match duplicates {
            Duplicates::First => actual.iter().position(is_name),
            Duplicates::Last => actual.iter().rposition(is_name),
        };
        match found {
            Some(i) => indices.push(i),
            None => missing.push((*name).to_string()),
        }
    }

    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(ReconError::MissingColumns {
            source: source.to_string(),
            columns: missing,
        })
    }
}

//! Most-active group selection from the inverse index

use super::frequency::InverseIndex;
use std::collections::HashSet;

/// Identifiers in the highest-count bucket. Ties are all returned; an empty
/// index yields an empty set.
pub fn select_most_active(index: &InverseIndex) -> HashSet<String> {
    index
        .last_key_value()
        .map(|(_, identifiers)| identifiers.clone())
        .unwrap_or_default()
}

/// Highest count present in the index, if any
pub fn max_count(index: &InverseIndex) -> Option<usize> {
    index.last_key_value().map(|(count, _)| *count)
}

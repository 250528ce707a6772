//! Narrow safety net for failed address lookups
//!
//! Both helpers are driven purely by configuration. Neither guesses
//! coordinates for queries that do not name a configured marker.

use crate::config::FallbackLocation;

/// First configured fallback whose marker occurs in `query` (ASCII case-insensitive)
pub fn match_fallback<'a>(query: &str, fallbacks: &'a [FallbackLocation]) -> Option<&'a FallbackLocation> {
    let haystack = query.to_ascii_lowercase();
    fallbacks
        .iter()
        .find(|f| haystack.contains(&f.marker.trim().to_ascii_lowercase()))
}

/// Remove obsolete terms (e.g. the former county "Middlesex") from an address
///
/// Returns `None` when no term occurs, so the caller knows a retry would send
/// the same query again.
pub fn strip_terms(query: &str, terms: &[String]) -> Option<String> {
    let mut changed = false;

    let segments: Vec<String> = query
        .split(',')
        .map(|segment| {
            let mut segment = segment.to_string();
            for term in terms {
                if let Some(stripped) = remove_ignore_case(&segment, term.trim()) {
                    segment = stripped;
                    changed = true;
                }
            }
            segment.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|segment| !segment.is_empty())
        .collect();

    if !changed {
        return None;
    }

    Some(segments.join(", "))
}

fn remove_ignore_case(haystack: &str, needle: &str) -> Option<String> {
    if needle.is_empty() {
        return None;
    }

    // ASCII lowercasing keeps byte offsets aligned with the original string.
    let lower = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();

    let mut result = String::with_capacity(haystack.len());
    let mut last = 0;
    let mut found = false;
    for (start, _) in lower.match_indices(&needle) {
        result.push_str(&haystack[last..start]);
        last = start + needle.len();
        found = true;
    }

    if !found {
        return None;
    }
    result.push_str(&haystack[last..]);
    Some(result)
}

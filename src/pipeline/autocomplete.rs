use std::collections::HashSet;

use crate::api::{GeocodeResult, NominatimClient};
use crate::domain::{Suggestion, is_place_like};
use crate::error::Result;

/// Minimum trimmed query length, in characters, before we ask Nominatim.
pub const MIN_QUERY_CHARS: usize = 2;

/// Results requested from each of the two geocoding queries.
pub const RESULTS_PER_QUERY: u32 = 6;

/// Maximum number of suggestions shown.
pub const MAX_SUGGESTIONS: usize = 8;

pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Merge the country-scoped and global result sets into suggestions.
///
/// # Algorithm
/// 1. Keep only `class=place` results of an allowed type
/// 2. Country results first, then global results not already seen (by place id)
/// 3. Truncate to [`MAX_SUGGESTIONS`]
///
/// Results whose coordinates don't parse are dropped.
pub fn merge_suggestions(
    country: Vec<GeocodeResult>,
    global: Vec<GeocodeResult>,
) -> Vec<Suggestion> {
    let mut seen = HashSet::new();

    country
        .iter()
        .chain(global.iter())
        .filter(|p| is_place_like(p))
        .filter(|p| seen.insert(p.place_id))
        .filter_map(|p| match Suggestion::from_result(p) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::debug!(place_id = p.place_id, "skipping suggestion: {e}");
                None
            }
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Query Nominatim twice in parallel (scoped to `country_code`, and
/// globally) and merge the two answers.
pub async fn fetch_suggestions(
    nominatim: &NominatimClient,
    query: &str,
    country_code: &str,
) -> Result<Vec<Suggestion>> {
    let (country, global) = tokio::join!(
        nominatim.search(query, RESULTS_PER_QUERY, Some(country_code)),
        nominatim.search(query, RESULTS_PER_QUERY, None),
    );

    Ok(merge_suggestions(country?, global?))
}

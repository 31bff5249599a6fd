use crate::api::NominatimClient;
use crate::error::Result;

/// Look up the single best match for `query` anywhere in the world.
///
/// Returns `Ok(None)` when Nominatim has no match.
pub async fn find_place(nominatim: &NominatimClient, query: &str) -> Result<Option<(f64, f64)>> {
    let results = nominatim.search(query, 1, None).await?;

    match results.first() {
        Some(place) => Ok(Some(place.coordinates()?)),
        None => Ok(None),
    }
}

use crate::api::{OverpassClient, OverpassResponse, cafe_query};
use crate::domain::CafeFeature;
use crate::error::Result;

/// Resolve every element to a café, in response order.
///
/// Elements without a usable point (a node missing coordinates, or a
/// way/relation without `center`) are skipped.
pub fn collect_cafes(response: &OverpassResponse) -> Vec<CafeFeature> {
    response
        .elements
        .iter()
        .filter_map(|element| {
            let cafe = CafeFeature::from_element(element);
            if cafe.is_none() {
                tracing::debug!(
                    id = element.id,
                    kind = %element.type_,
                    "skipping element without a point"
                );
            }
            cafe
        })
        .collect()
}

/// Fetch cafés within `radius_m` meters of `center`.
pub async fn fetch_cafes(
    overpass: &OverpassClient,
    center: (f64, f64),
    radius_m: u32,
) -> Result<Vec<CafeFeature>> {
    let query = cafe_query(center, radius_m);
    let response = overpass.execute(&query).await?;
    Ok(collect_cafes(&response))
}

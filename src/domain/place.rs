use crate::api::GeocodeResult;
use crate::error::Result;

/// Separator between the region and country parts of a label's second line.
pub const SUB_SEPARATOR: &str = " • ";

/// Nominatim `type` values accepted as suggestions (with `class=place`).
pub const ALLOWED_PLACE_TYPES: [&str; 8] = [
    "city",
    "town",
    "village",
    "suburb",
    "neighbourhood",
    "state",
    "district",
    "county",
];

/// Two-line display label for a place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceLabel {
    /// Primary name (locality)
    pub main: String,
    /// Region and country, possibly empty
    pub sub: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Turn a geocoding result into a `{main, sub}` label.
///
/// `main` is the most specific locality name available, falling back to the
/// first segment of the display name. `sub` joins state (or county, or
/// region) and country, skipping whichever is missing.
pub fn format_place_label(place: &GeocodeResult) -> PlaceLabel {
    let addr = &place.address;

    let main = [
        &addr.city,
        &addr.town,
        &addr.village,
        &addr.suburb,
        &addr.neighbourhood,
    ]
    .into_iter()
    .find_map(non_empty)
    .map(str::to_string)
    .unwrap_or_else(|| {
        place
            .display_name
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string()
    });

    let region = non_empty(&addr.state)
        .or_else(|| non_empty(&addr.county))
        .or_else(|| non_empty(&addr.region));
    let country = non_empty(&addr.country);

    let sub = [region, country]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(SUB_SEPARATOR);

    PlaceLabel { main, sub }
}

/// True if the result is a settlement or administrative area we suggest.
pub fn is_place_like(place: &GeocodeResult) -> bool {
    place.class == "place" && ALLOWED_PLACE_TYPES.contains(&place.type_.as_str())
}

/// One entry of the autocomplete list
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Source place identifier, unique within one suggestion list
    pub place_id: u64,
    pub label: PlaceLabel,
    pub lat: f64,
    pub lon: f64,
}

impl Suggestion {
    pub fn from_result(place: &GeocodeResult) -> Result<Self> {
        let (lat, lon) = place.coordinates()?;
        Ok(Self {
            place_id: place.place_id,
            label: format_place_label(place),
            lat,
            lon,
        })
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

pub mod cafe;
pub mod place;

pub use cafe::{CafeFeature, UNNAMED_CAFE};
pub use place::{PlaceLabel, Suggestion, format_place_label, is_place_like};

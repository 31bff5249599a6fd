//! The three request pipelines behind the widget. Each stage here is free of
//! session state; [`crate::widget::Widget`] applies the results.

pub mod autocomplete;
pub mod cafes;
pub mod search;

pub use autocomplete::{fetch_suggestions, is_searchable, merge_suggestions};
pub use cafes::{collect_cafes, fetch_cafes};
pub use search::find_place;

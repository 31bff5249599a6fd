//! cafemap - Find a place on OpenStreetMap and list the cafés around it

pub mod api;
pub mod config;
pub mod debounce;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod widget;

pub use error::{Error, Result};
pub use session::MapSession;
pub use widget::{PointerTarget, Widget};

pub mod nominatim;
pub mod overpass;

use std::time::Duration;

use crate::error::Result;

pub use nominatim::{Address, GeocodeResult, NominatimClient};
pub use overpass::{Center, Element, OverpassClient, OverpassResponse, cafe_query};

pub const USER_AGENT: &str = concat!("cafemap/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the geocoding and Overpass clients.
pub fn http_client(user_agent: &str, timeout_secs: u64) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

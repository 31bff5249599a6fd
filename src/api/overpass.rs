use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{Error, Result};

pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Amenity tag value matched by [`cafe_query`].
pub const CAFE_AMENITY: &str = "cafe";

/// Server-side cap on returned elements (`out center 40`).
pub const MAX_RESULTS: u32 = 40;

/// Server-enforced query timeout in seconds.
pub const QUERY_TIMEOUT_SECS: u32 = 25;

/// Raw Overpass API response
#[derive(Debug, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// Center point that `out center` attaches to ways and relations
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// A single element from Overpass (node, way or relation)
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

impl Element {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }
}

/// Build the Overpass QL query for cafés within `radius_m` of `center`.
///
/// Matches nodes, ways and relations tagged `amenity=cafe` and asks for
/// center points so that areas come back with a single representative point.
pub fn cafe_query(center: (f64, f64), radius_m: u32) -> String {
    let (lat, lon) = center;
    format!(
        r#"[out:json][timeout:{timeout}];
(
  node["amenity"="{amenity}"](around:{radius},{lat},{lon});
  way["amenity"="{amenity}"](around:{radius},{lat},{lon});
  relation["amenity"="{amenity}"](around:{radius},{lat},{lon});
);
out center {limit};"#,
        timeout = QUERY_TIMEOUT_SECS,
        amenity = CAFE_AMENITY,
        radius = radius_m,
        lat = lat,
        lon = lon,
        limit = MAX_RESULTS,
    )
}

#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: reqwest::Client,
    url: String,
}

impl OverpassClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Execute an Overpass QL query. No retries; a failed query is reported
    /// to the caller as-is.
    pub async fn execute(&self, query: &str) -> Result<OverpassResponse> {
        tracing::debug!(url = %self.url, "overpass query");

        // Overpass expects form-encoded POST data: data=<query>
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| Error::Deserialize {
            context: "overpass response".to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cafe_query() {
        let query = cafe_query((18.52, 73.85), 3000);

        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains(r#"node["amenity"="cafe"](around:3000,18.52,73.85);"#));
        assert!(query.contains(r#"way["amenity"="cafe"](around:3000,18.52,73.85);"#));
        assert!(query.contains(r#"relation["amenity"="cafe"](around:3000,18.52,73.85);"#));
        assert!(query.ends_with("out center 40;"));
    }

    #[test]
    fn test_parse_overpass_response() {
        let json = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 18.52, "lon": 73.85, "tags": {"amenity": "cafe", "name": "Brew House"}},
                {"type": "way", "id": 2, "center": {"lat": 18.53, "lon": 73.86}, "nodes": [3, 4], "tags": {"amenity": "cafe"}}
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.elements.len(), 2);
        assert_eq!(response.elements[0].type_, "node");
        assert_eq!(response.elements[0].tag("name"), Some("Brew House"));
        assert_eq!(
            response.elements[1].center,
            Some(Center {
                lat: 18.53,
                lon: 73.86
            })
        );
        assert_eq!(response.elements[1].tag("name"), None);
    }

    #[test]
    fn test_missing_elements_is_empty() {
        let response: OverpassResponse = serde_json::from_str("{}").unwrap();
        assert!(response.elements.is_empty());
    }
}

use reqwest::header::ACCEPT_LANGUAGE;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Address breakdown returned with `addressdetails=1`.
///
/// Every field is optional; Nominatim only sends the components it knows.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub neighbourhood: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// One record from the Nominatim `/search` endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeocodeResult {
    pub place_id: u64,
    /// Latitude as sent by Nominatim (a decimal string).
    #[serde(default)]
    pub lat: String,
    /// Longitude as sent by Nominatim (a decimal string).
    #[serde(default)]
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub class: String,
    #[serde(rename = "type", default)]
    pub type_: String,
}

impl GeocodeResult {
    /// Parse the string coordinates into `(lat, lon)`.
    pub fn coordinates(&self) -> Result<(f64, f64)> {
        Ok((parse_coordinate(&self.lat)?, parse_coordinate(&self.lon)?))
    }
}

fn parse_coordinate(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidCoordinate {
            value: value.to_string(),
        })
}

/// Thin async wrapper around the Nominatim search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    language: String,
}

impl NominatimClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            language: language.into(),
        }
    }

    /// Search for `query`, returning at most `limit` address-annotated results.
    ///
    /// `country_code` restricts results to one ISO 3166-1 alpha-2 country
    /// (`countrycodes=`); `None` searches globally.
    ///
    /// # Errors
    /// * [`Error::Http`] on transport failure
    /// * [`Error::UnexpectedStatus`] on a non-2xx response
    /// * [`Error::Deserialize`] if the body is not a JSON array of results
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        country_code: Option<&str>,
    ) -> Result<Vec<GeocodeResult>> {
        let limit = limit.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("format", "json"),
            ("addressdetails", "1"),
            ("limit", limit.as_str()),
        ];
        if let Some(code) = country_code {
            params.push(("countrycodes", code));
        }
        params.push(("q", query));

        tracing::debug!(query, limit = %limit, country = ?country_code, "nominatim search");

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .header(ACCEPT_LANGUAGE, &self.language)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url: self.base_url.clone(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| Error::Deserialize {
            context: format!("nominatim search \"{query}\""),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nominatim_response() {
        let json = r#"[{
            "place_id": 240109189,
            "lat": "18.5213738",
            "lon": "73.8545071",
            "display_name": "Pune, Pune City, Pune District, Maharashtra, 411001, India",
            "class": "place",
            "type": "city",
            "importance": 0.72,
            "address": {"city": "Pune", "state": "Maharashtra", "country": "India", "country_code": "in"}
        }]"#;
        let results: Vec<GeocodeResult> = serde_json::from_str(json).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].place_id, 240109189);
        assert_eq!(results[0].class, "place");
        assert_eq!(results[0].type_, "city");
        assert_eq!(results[0].address.city.as_deref(), Some("Pune"));
        assert_eq!(results[0].address.town, None);

        let (lat, lon) = results[0].coordinates().unwrap();
        assert!((lat - 18.5213738).abs() < 1e-9);
        assert!((lon - 73.8545071).abs() < 1e-9);
    }

    #[test]
    fn test_missing_address_defaults_to_empty() {
        let json = r#"[{"place_id": 1, "lat": "1.0", "lon": "2.0", "display_name": "Somewhere"}]"#;
        let results: Vec<GeocodeResult> = serde_json::from_str(json).unwrap();

        assert_eq!(results[0].address, Address::default());
        assert_eq!(results[0].class, "");
    }

    #[test]
    fn test_invalid_coordinate() {
        let result = GeocodeResult {
            lat: "north".to_string(),
            lon: "73.85".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            result.coordinates(),
            Err(Error::InvalidCoordinate { .. })
        ));
    }
}

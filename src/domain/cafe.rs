use crate::api::Element;

/// Popup and list name used when an element has no `name` tag.
pub const UNNAMED_CAFE: &str = "Unnamed café";

/// A café resolved to a single point
#[derive(Debug, Clone, PartialEq)]
pub struct CafeFeature {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

impl CafeFeature {
    /// Resolve an Overpass element into a café.
    ///
    /// Nodes use their own coordinates; ways and relations use the `center`
    /// computed by `out center`. Returns `None` when neither is available.
    pub fn from_element(element: &Element) -> Option<Self> {
        let (lat, lon) = if element.type_ == "node" {
            (element.lat?, element.lon?)
        } else {
            let center = element.center?;
            (center.lat, center.lon)
        };

        let name = element
            .tag("name")
            .filter(|n| !n.is_empty())
            .unwrap_or(UNNAMED_CAFE)
            .to_string();

        Some(Self {
            id: element.id,
            lat,
            lon,
            name,
        })
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Center;
    use std::collections::HashMap;

    fn element(
        type_: &str,
        lat: Option<f64>,
        lon: Option<f64>,
        center: Option<Center>,
    ) -> Element {
        Element {
            type_: type_.to_string(),
            id: 7,
            lat,
            lon,
            center,
            tags: None,
        }
    }

    #[test]
    fn test_node_uses_own_coordinates() {
        let mut el = element("node", Some(18.52), Some(73.85), None);
        el.tags = Some(HashMap::from([(
            "name".to_string(),
            "Brew House".to_string(),
        )]));

        let cafe = CafeFeature::from_element(&el).unwrap();
        assert_eq!(cafe.coordinates(), (18.52, 73.85));
        assert_eq!(cafe.name, "Brew House");
        assert_eq!(cafe.id, 7);
    }

    #[test]
    fn test_way_uses_center() {
        let el = element(
            "way",
            None,
            None,
            Some(Center {
                lat: 18.53,
                lon: 73.86,
            }),
        );

        let cafe = CafeFeature::from_element(&el).unwrap();
        assert_eq!(cafe.coordinates(), (18.53, 73.86));
        assert_eq!(cafe.name, UNNAMED_CAFE);
    }

    #[test]
    fn test_missing_geometry_is_skipped() {
        assert!(CafeFeature::from_element(&element("relation", None, None, None)).is_none());
        assert!(CafeFeature::from_element(&element("node", Some(1.0), None, None)).is_none());
    }
}

//! In-memory model of the map widget: viewport, café marker layer, the
//! suggestion dropdown and the café list.
//!
//! A `MapSession` is created once at startup and handed to every pipeline.
//! Front-ends render it; pipelines mutate it. Lists are always cleared in
//! full before they are repopulated.

use crate::domain::{CafeFeature, Suggestion};

/// Zoom used when centering on a searched place.
pub const PLACE_ZOOM: u8 = 14;
/// Zoom used when a café is picked from the list.
pub const CAFE_ZOOM: u8 = 17;

pub const LOADING_MESSAGE: &str = "Loading cafés…";
pub const EMPTY_MESSAGE: &str = "No cafés found nearby.";
pub const ERROR_MESSAGE: &str = "Error loading cafés. Try again in a moment.";
pub const NOT_FOUND_NOTICE: &str = "Could not find that area.";

/// Map center and zoom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// (lat, lon) in WGS84
    pub center: (f64, f64),
    pub zoom: u8,
}

impl Viewport {
    pub fn new(center: (f64, f64), zoom: u8) -> Self {
        Self { center, zoom }
    }

    /// OpenStreetMap permalink for this view.
    pub fn osm_url(&self) -> String {
        let (lat, lon) = self.center;
        format!(
            "https://www.openstreetmap.org/#map={}/{:.5}/{:.5}",
            self.zoom, lat, lon
        )
    }
}

/// Marker image and its anchor offsets, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerIcon {
    pub url: &'static str,
    pub size: (u32, u32),
    /// Point of the icon that sits on the marker location
    pub anchor: (i32, i32),
    /// Popup position relative to the anchor
    pub popup_anchor: (i32, i32),
}

pub const COFFEE_ICON: MarkerIcon = MarkerIcon {
    url: "coffee.svg",
    size: (32, 32),
    anchor: (16, 32),
    popup_anchor: (0, -28),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: (f64, f64),
    pub icon: MarkerIcon,
    pub popup: String,
    pub popup_open: bool,
}

/// Layer holding the café markers. Only one popup is open at a time.
#[derive(Debug, Default, Clone)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    next_id: usize,
}

impl MarkerLayer {
    pub fn add(&mut self, position: (f64, f64), icon: MarkerIcon, popup: String) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.push(Marker {
            id,
            position,
            icon,
            popup,
            popup_open: false,
        });
        id
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Open the popup of `id`, closing any other. Returns false if the
    /// marker is no longer on the layer.
    pub fn open_popup(&mut self, id: MarkerId) -> bool {
        if !self.markers.iter().any(|m| m.id == id) {
            return false;
        }
        for marker in &mut self.markers {
            marker.popup_open = marker.id == id;
        }
        true
    }

    pub fn open(&self) -> Option<&Marker> {
        self.markers.iter().find(|m| m.popup_open)
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Autocomplete dropdown
#[derive(Debug, Default, Clone)]
pub struct SuggestionList {
    entries: Vec<Suggestion>,
    visible: bool,
}

impl SuggestionList {
    pub fn clear(&mut self) {
        self.entries.clear();
        self.visible = false;
    }

    /// Replace the entries and show the list.
    pub fn show(&mut self, entries: Vec<Suggestion>) {
        self.clear();
        self.visible = !entries.is_empty();
        self.entries = entries;
    }

    pub fn entries(&self) -> &[Suggestion] {
        &self.entries
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// A row in the café list
#[derive(Debug, Clone, PartialEq)]
pub enum CafeListEntry {
    Cafe {
        name: String,
        position: (f64, f64),
        marker: MarkerId,
    },
    /// Placeholder or status line (loading, empty, error)
    Message(String),
}

#[derive(Debug, Clone)]
pub struct MapSession {
    pub viewport: Viewport,
    pub markers: MarkerLayer,
    pub suggestions: SuggestionList,
    pub cafe_list: Vec<CafeListEntry>,
    /// Current text of the search field
    pub input: String,
    notices: Vec<String>,
}

impl MapSession {
    pub fn new(start: Viewport) -> Self {
        Self {
            viewport: start,
            markers: MarkerLayer::default(),
            suggestions: SuggestionList::default(),
            cafe_list: Vec::new(),
            input: String::new(),
            notices: Vec::new(),
        }
    }

    pub fn set_view(&mut self, center: (f64, f64), zoom: u8) {
        self.viewport = Viewport::new(center, zoom);
    }

    /// Remove every marker and list row.
    pub fn clear_cafes(&mut self) {
        self.markers.clear();
        self.cafe_list.clear();
    }

    /// Replace the café list with a single status line and no markers.
    pub fn show_cafe_message(&mut self, message: &str) {
        self.clear_cafes();
        self.cafe_list.push(CafeListEntry::Message(message.to_string()));
    }

    /// Replace the markers and list with `cafes`, in order.
    ///
    /// An empty slice shows the "no cafés" message instead.
    pub fn show_cafes(&mut self, cafes: &[CafeFeature]) {
        self.clear_cafes();

        if cafes.is_empty() {
            self.show_cafe_message(EMPTY_MESSAGE);
            return;
        }

        for cafe in cafes {
            let position = cafe.coordinates();
            let marker = self.markers.add(position, COFFEE_ICON, cafe.name.clone());
            self.cafe_list.push(CafeListEntry::Cafe {
                name: cafe.name.clone(),
                position,
                marker,
            });
        }
    }

    /// Queue a blocking notice for the user (an alert in a browser).
    pub fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    /// Take all pending notices.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cafe(id: u64, name: &str) -> CafeFeature {
        CafeFeature {
            id,
            lat: 18.5 + id as f64 * 0.001,
            lon: 73.8,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_show_cafes_replaces_previous() {
        let mut session = MapSession::new(Viewport::new((0.0, 0.0), 5));
        session.show_cafes(&[cafe(1, "A"), cafe(2, "B")]);
        session.show_cafes(&[cafe(3, "C")]);

        assert_eq!(session.markers.len(), 1);
        assert_eq!(session.cafe_list.len(), 1);
        assert_eq!(session.markers.markers()[0].popup, "C");
    }

    #[test]
    fn test_show_empty_cafes() {
        let mut session = MapSession::new(Viewport::new((0.0, 0.0), 5));
        session.show_cafes(&[cafe(1, "A")]);
        session.show_cafes(&[]);

        assert!(session.markers.is_empty());
        assert_eq!(
            session.cafe_list,
            vec![CafeListEntry::Message(EMPTY_MESSAGE.to_string())]
        );
    }

    #[test]
    fn test_single_open_popup() {
        let mut layer = MarkerLayer::default();
        let a = layer.add((1.0, 1.0), COFFEE_ICON, "A".to_string());
        let b = layer.add((2.0, 2.0), COFFEE_ICON, "B".to_string());

        assert!(layer.open_popup(a));
        assert!(layer.open_popup(b));
        assert_eq!(layer.open().map(|m| m.id), Some(b));

        layer.clear();
        assert!(!layer.open_popup(a));
    }

    #[test]
    fn test_suggestion_list_visibility() {
        let mut list = SuggestionList::default();
        list.show(Vec::new());
        assert!(!list.is_visible());

        list.show(vec![Suggestion {
            place_id: 1,
            label: crate::domain::PlaceLabel {
                main: "Pune".to_string(),
                sub: String::new(),
            },
            lat: 18.5,
            lon: 73.8,
        }]);
        assert!(list.is_visible());

        list.clear();
        assert!(!list.is_visible());
        assert!(list.entries().is_empty());
    }

    #[test]
    fn test_notices_are_drained() {
        let mut session = MapSession::new(Viewport::new((0.0, 0.0), 5));
        session.notify(NOT_FOUND_NOTICE);

        assert_eq!(session.take_notices(), vec![NOT_FOUND_NOTICE.to_string()]);
        assert!(session.take_notices().is_empty());
    }

    #[test]
    fn test_osm_url() {
        let view = Viewport::new((18.52, 73.85), PLACE_ZOOM);
        assert_eq!(
            view.osm_url(),
            "https://www.openstreetmap.org/#map=14/18.52000/73.85000"
        );
    }
}

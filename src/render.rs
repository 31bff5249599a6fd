//! Plain-text rendering of a [`MapSession`] for the terminal front-end.

use std::fmt::Write;

use crate::session::{CafeListEntry, MapSession};

/// Numbered suggestion list, or an empty string when it is hidden.
pub fn render_suggestions(session: &MapSession) -> String {
    let mut out = String::new();
    if !session.suggestions.is_visible() {
        return out;
    }

    for (i, suggestion) in session.suggestions.entries().iter().enumerate() {
        let label = &suggestion.label;
        if label.sub.is_empty() {
            let _ = writeln!(out, "  {:>2}. {}", i + 1, label.main);
        } else {
            let _ = writeln!(out, "  {:>2}. {}  {}", i + 1, label.main, label.sub);
        }
    }
    out
}

/// Viewport line followed by the numbered café list.
pub fn render_cafes(session: &MapSession) -> String {
    let mut out = String::new();
    let view = &session.viewport;
    let (lat, lon) = view.center;

    let _ = writeln!(
        out,
        "Map: ({:.4}, {:.4}) zoom {} | {} markers",
        lat,
        lon,
        view.zoom,
        session.markers.len()
    );
    let _ = writeln!(out, "     {}", view.osm_url());

    let mut number = 0;
    for entry in &session.cafe_list {
        match entry {
            CafeListEntry::Cafe {
                name,
                position,
                marker,
            } => {
                number += 1;
                let open = session
                    .markers
                    .get(*marker)
                    .is_some_and(|m| m.popup_open);
                let _ = writeln!(
                    out,
                    "  {:>2}. {}{} ({:.5}, {:.5})",
                    number,
                    if open { "* " } else { "" },
                    name,
                    position.0,
                    position.1
                );
            }
            CafeListEntry::Message(message) => {
                let _ = writeln!(out, "  {}", message);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CafeFeature, PlaceLabel, Suggestion};
    use crate::session::{EMPTY_MESSAGE, Viewport};

    #[test]
    fn test_render_suggestions() {
        let mut session = MapSession::new(Viewport::new((0.0, 0.0), 5));
        assert_eq!(render_suggestions(&session), "");

        session.suggestions.show(vec![
            Suggestion {
                place_id: 1,
                label: PlaceLabel {
                    main: "Pune".to_string(),
                    sub: "Maharashtra • India".to_string(),
                },
                lat: 18.5,
                lon: 73.8,
            },
            Suggestion {
                place_id: 2,
                label: PlaceLabel {
                    main: "Punta".to_string(),
                    sub: String::new(),
                },
                lat: 1.0,
                lon: 2.0,
            },
        ]);

        assert_eq!(
            render_suggestions(&session),
            "   1. Pune  Maharashtra • India\n   2. Punta\n"
        );
    }

    #[test]
    fn test_render_cafes() {
        let mut session = MapSession::new(Viewport::new((18.52, 73.85), 14));
        session.show_cafes(&[CafeFeature {
            id: 1,
            lat: 18.52,
            lon: 73.85,
            name: "Brew House".to_string(),
        }]);

        let out = render_cafes(&session);
        assert!(out.starts_with("Map: (18.5200, 73.8500) zoom 14 | 1 markers\n"));
        assert!(out.contains("   1. Brew House (18.52000, 73.85000)\n"));

        session.show_cafes(&[]);
        assert!(render_cafes(&session).ends_with(&format!("  {EMPTY_MESSAGE}\n")));
    }
}

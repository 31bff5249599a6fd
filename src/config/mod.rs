use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::{USER_AGENT, nominatim::NOMINATIM_URL, overpass::OVERPASS_URL};
use crate::error::{Error, Result};

/// Default café search radius in meters
pub const DEFAULT_RADIUS: u32 = 3000;

/// Initial view: all of India, zoomed out
pub const DEFAULT_START: (f64, f64) = (22.5937, 78.9629);
pub const DEFAULT_START_ZOOM: u8 = 5;

fn default_nominatim_url() -> String {
    NOMINATIM_URL.to_string()
}
fn default_overpass_url() -> String {
    OVERPASS_URL.to_string()
}
fn default_country_code() -> String {
    "in".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_radius() -> u32 {
    DEFAULT_RADIUS
}
fn default_debounce_ms() -> u64 {
    250
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    USER_AGENT.to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StartView {
    #[serde(default = "default_start_lat")]
    pub lat: f64,
    #[serde(default = "default_start_lon")]
    pub lon: f64,
    #[serde(default = "default_start_zoom")]
    pub zoom: u8,
    /// Load cafés around the start view when the widget opens
    #[serde(default = "default_true")]
    pub load_on_start: bool,
}

fn default_start_lat() -> f64 {
    DEFAULT_START.0
}
fn default_start_lon() -> f64 {
    DEFAULT_START.1
}
fn default_start_zoom() -> u8 {
    DEFAULT_START_ZOOM
}

impl Default for StartView {
    fn default() -> Self {
        Self {
            lat: default_start_lat(),
            lon: default_start_lon(),
            zoom: default_start_zoom(),
            load_on_start: true,
        }
    }
}

/// Settings for the widget, read from `cafemap.toml`.
///
/// Every key is optional.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    /// Country preferred by autocomplete (ISO 3166-1 alpha-2)
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// `Accept-Language` sent to Nominatim
    #[serde(default = "default_language")]
    pub language: String,
    /// Café search radius in meters
    #[serde(default = "default_radius")]
    pub radius: u32,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub start: StartView,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            overpass_url: default_overpass_url(),
            country_code: default_country_code(),
            language: default_language(),
            radius: default_radius(),
            debounce_ms: default_debounce_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            start: StartView::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read settings from an explicit path, which must exist.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// Settings from `explicit` if given, otherwise from the first config
    /// file found in the search paths, otherwise the defaults.
    ///
    /// An explicit file must exist and parse. A searched file that fails to
    /// parse is skipped with a warning.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }

        let found = search_paths()
            .into_iter()
            .filter(|path| path.is_file())
            .find_map(|path| match Self::from_path(&path) {
                Ok(settings) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    Some(settings)
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "ignoring config file: {e}");
                    None
                }
            });
        Ok(found.unwrap_or_default())
    }
}

/// Working directory first, then the platform config dir, then home.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("cafemap.toml"), PathBuf::from(".cafemap.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.extend([dir.join("cafemap/config.toml"), dir.join("cafemap.toml")]);
    }
    if let Some(home) = dirs::home_dir() {
        paths.extend([home.join(".cafemap.toml"), home.join(".config/cafemap/config.toml")]);
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.radius, 3000);
        assert_eq!(settings.country_code, "in");
        assert_eq!(settings.start.zoom, 5);
        assert!(settings.start.load_on_start);
    }

    #[test]
    fn test_partial_config() {
        let settings = Settings::from_toml(
            r#"
country_code = "de"
radius = 1500

[start]
lat = 52.52
lon = 13.405
load_on_start = false
"#,
        )
        .unwrap();

        assert_eq!(settings.country_code, "de");
        assert_eq!(settings.radius, 1500);
        assert_eq!(settings.start.lat, 52.52);
        assert_eq!(settings.start.zoom, DEFAULT_START_ZOOM);
        assert!(!settings.start.load_on_start);
        assert_eq!(settings.overpass_url, OVERPASS_URL);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Settings::from_toml("radius = \"far\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debounce_ms = 100").unwrap();

        let settings = Settings::from_path(file.path()).unwrap();
        assert_eq!(settings.debounce_ms, 100);

        let missing = file.path().with_extension("missing");
        assert!(Settings::from_path(&missing).is_err());
    }

    #[test]
    fn test_resolve_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "radius = 800").unwrap();

        let settings = Settings::resolve(Some(file.path())).unwrap();
        assert_eq!(settings.radius, 800);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            Settings::resolve(Some(&missing)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_search_paths_start_in_working_dir() {
        let paths = search_paths();
        assert_eq!(paths[0], PathBuf::from("cafemap.toml"));
        assert_eq!(paths[1], PathBuf::from(".cafemap.toml"));
        assert!(paths.iter().skip(2).all(|p| p.is_absolute()));
    }
}

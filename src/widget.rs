//! Event entry points of the café map: text input, form submit, clicks.
//!
//! Pipelines never cancel each other's requests. Instead each request is
//! tagged with a sequence number and a response is applied only if no newer
//! request was issued for the same pipeline since.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;

use crate::api::{NominatimClient, OverpassClient, http_client};
use crate::config::Settings;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::pipeline::{fetch_cafes, fetch_suggestions, find_place, is_searchable};
use crate::session::{
    CAFE_ZOOM, CafeListEntry, ERROR_MESSAGE, LOADING_MESSAGE, MapSession, NOT_FOUND_NOTICE,
    PLACE_ZOOM, Viewport,
};

/// Where a pointer interaction landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    SearchInput,
    SuggestionList,
    Elsewhere,
}

pub struct Widget {
    nominatim: NominatimClient,
    overpass: OverpassClient,
    settings: Settings,
    session: Mutex<MapSession>,
    debouncer: Debouncer<String>,
    autocomplete_seq: AtomicU64,
    cafe_seq: AtomicU64,
    changes: watch::Sender<u64>,
}

impl Widget {
    /// Build a widget with HTTP clients configured from `settings`.
    pub fn new(settings: Settings) -> Result<Arc<Self>> {
        let client = http_client(&settings.user_agent, settings.timeout_secs)?;
        let nominatim = NominatimClient::new(
            client.clone(),
            settings.nominatim_url.clone(),
            settings.language.clone(),
        );
        let overpass = OverpassClient::new(client, settings.overpass_url.clone());
        Ok(Self::with_clients(settings, nominatim, overpass))
    }

    pub fn with_clients(
        settings: Settings,
        nominatim: NominatimClient,
        overpass: OverpassClient,
    ) -> Arc<Self> {
        let start = Viewport::new((settings.start.lat, settings.start.lon), settings.start.zoom);
        let delay = Duration::from_millis(settings.debounce_ms);

        Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let debouncer = Debouncer::new(delay, move |query: String| {
                let widget = weak.clone();
                async move {
                    if let Some(widget) = widget.upgrade() {
                        widget.autocomplete(&query).await;
                    }
                }
            });

            Self {
                nominatim,
                overpass,
                settings,
                session: Mutex::new(MapSession::new(start)),
                debouncer,
                autocomplete_seq: AtomicU64::new(0),
                cafe_seq: AtomicU64::new(0),
                changes: watch::Sender::new(0),
            }
        })
    }

    /// Lock the session. Never hold the guard across an `.await`.
    pub fn session(&self) -> MutexGuard<'_, MapSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current session state, for rendering.
    pub fn snapshot(&self) -> MapSession {
        self.session().clone()
    }

    /// Receiver that is marked changed after every visible session update.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Apply `f` to the session, then wake subscribers.
    fn update<R>(&self, f: impl FnOnce(&mut MapSession) -> R) -> R {
        let result = f(&mut self.session());
        self.changes.send_modify(|version| *version += 1);
        result
    }

    /// Load cafés around the start view if configured to.
    pub async fn open(&self) {
        if self.settings.start.load_on_start {
            let center = self.session().viewport.center;
            self.load_cafes(center).await;
        }
    }

    /// The search field changed.
    ///
    /// Short queries clear the suggestions right away; anything else is
    /// debounced and then autocompleted.
    pub fn on_input(&self, text: &str) {
        self.session().input = text.to_string();

        if is_searchable(text) {
            self.debouncer.call(text.trim().to_string());
        } else {
            self.debouncer.cancel();
            self.clear_suggestions();
        }
    }

    /// Run the autocomplete pipeline for `query` now, without debouncing.
    pub async fn autocomplete(&self, query: &str) {
        let query = query.trim();
        if !is_searchable(query) {
            self.clear_suggestions();
            return;
        }

        let seq = next_seq(&self.autocomplete_seq);
        let result = fetch_suggestions(&self.nominatim, query, &self.settings.country_code).await;

        if !is_latest(&self.autocomplete_seq, seq) {
            tracing::debug!(query, seq, "discarding stale autocomplete response");
            return;
        }

        match result {
            Ok(suggestions) => {
                tracing::debug!(query, count = suggestions.len(), "autocomplete");
                self.update(|s| s.suggestions.show(suggestions));
            }
            Err(e) => {
                tracing::warn!(query, "autocomplete error: {e}");
                self.update(|s| s.suggestions.clear());
            }
        }
    }

    /// Hide and empty the suggestion list. Any autocomplete response still
    /// in flight is discarded when it arrives.
    pub fn clear_suggestions(&self) {
        self.autocomplete_seq.fetch_add(1, Ordering::SeqCst);
        self.update(|s| s.suggestions.clear());
    }

    /// A click somewhere on the page. Anything outside the input and the
    /// suggestion list dismisses the suggestions.
    pub fn on_pointer(&self, target: PointerTarget) {
        if target == PointerTarget::Elsewhere {
            self.clear_suggestions();
        }
    }

    /// Click on the suggestion at `index`. Returns false if there is none.
    pub async fn select_suggestion(&self, index: usize) -> bool {
        let picked = {
            let mut session = self.session();
            let Some(picked) = session.suggestions.entries().get(index).cloned() else {
                return false;
            };
            session.input = picked.label.main.clone();
            picked
        };

        self.clear_suggestions();
        self.focus_and_search(picked.coordinates()).await;
        true
    }

    /// Form submission: geocode the current input and search around it.
    pub async fn submit(&self) {
        let query = self.session().input.trim().to_string();
        if query.is_empty() {
            return;
        }

        match find_place(&self.nominatim, &query).await {
            Ok(Some(center)) => self.focus_and_search(center).await,
            Ok(None) => {
                tracing::info!(query, "no match");
                self.update(|s| s.notify(NOT_FOUND_NOTICE));
            }
            Err(e) => {
                tracing::warn!(query, "search error: {e}");
            }
        }
    }

    /// Center the map on `center` and load the cafés around it.
    pub async fn focus_and_search(&self, center: (f64, f64)) {
        self.update(|s| s.set_view(center, PLACE_ZOOM));
        self.load_cafes(center).await;
    }

    /// Replace the café markers and list with the cafés around `center`.
    pub async fn load_cafes(&self, center: (f64, f64)) {
        let seq = next_seq(&self.cafe_seq);
        self.update(|s| s.show_cafe_message(LOADING_MESSAGE));

        let result = fetch_cafes(&self.overpass, center, self.settings.radius).await;

        if !is_latest(&self.cafe_seq, seq) {
            tracing::debug!(seq, "discarding stale cafe response");
            return;
        }

        match result {
            Ok(cafes) => {
                tracing::info!(
                    count = cafes.len(),
                    lat = center.0,
                    lon = center.1,
                    "loaded cafes"
                );
                self.update(|s| s.show_cafes(&cafes));
            }
            Err(e) => {
                tracing::warn!("overpass error: {e}");
                self.update(|s| s.show_cafe_message(ERROR_MESSAGE));
            }
        }
    }

    /// Click on the café list row at `index`: zoom in on it and open its
    /// popup. Status rows and out-of-range indices do nothing.
    pub fn select_cafe(&self, index: usize) -> bool {
        let Some(CafeListEntry::Cafe {
            position, marker, ..
        }) = self.session().cafe_list.get(index).cloned()
        else {
            return false;
        };

        self.update(|s| {
            s.set_view(position, CAFE_ZOOM);
            s.markers.open_popup(marker)
        })
    }
}

fn next_seq(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

fn is_latest(counter: &AtomicU64, seq: u64) -> bool {
    counter.load(Ordering::SeqCst) == seq
}

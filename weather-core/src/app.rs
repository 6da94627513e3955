//! Input tracking and lookup orchestration.
//!
//! [`WeatherApp`] owns the application state and drives the flow
//! keystroke → suggestions → submit/select → weather → storage. Every state
//! change is followed by a [`View::render`] call with a snapshot of the state.

use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use tracing::{debug, error, info, warn};

use crate::{
    error::LookupError,
    model::{Suggestion, WeatherRecord},
    provider::WeatherProvider,
    storage::{KeyValueStore, WeatherCache},
};

/// Queries shorter than this (in characters) never reach the network.
pub const MIN_QUERY_CHARS: usize = 3;

/// The notification shown for any failed weather lookup.
pub const CITY_NOT_FOUND: &str = "City not found";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Text currently in the search field.
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    /// Most recent successful lookup.
    pub weather: Option<WeatherRecord>,
    /// Bumped every time `weather` is replaced, even by an identical record.
    pub revision: u64,
}

/// Presentation layer: draws state and shows blocking notifications.
pub trait View: Send + Sync {
    fn render(&self, state: &AppState);
    fn alert(&self, message: &str);
}

pub struct WeatherApp<P, S, V> {
    provider: P,
    cache: WeatherCache<S>,
    view: V,
    state: Mutex<AppState>,
    /// Id of the latest suggestion request; responses carrying an older id are dropped.
    suggestion_seq: AtomicU64,
    initialized: AtomicBool,
}

impl<P, S, V> WeatherApp<P, S, V>
where
    P: WeatherProvider,
    S: KeyValueStore,
    V: View,
{
    pub fn new(provider: P, store: S, view: V) -> Self {
        Self {
            provider,
            cache: WeatherCache::new(store),
            view,
            state: Mutex::new(AppState::default()),
            suggestion_seq: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        self.cache.store()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.lock().clone()
    }

    /// Restore the last stored record and draw the first frame. Runs once.
    pub fn init(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let restored = self.cache.restore();
        let snapshot = {
            let mut state = self.lock();
            // A lookup that finished before init is fresher than what is stored.
            if state.weather.is_none() {
                if let Some(record) = restored {
                    info!(city = %record.city, "Restored last weather result");
                    state.weather = Some(record);
                    state.revision += 1;
                }
            }
            if let Some(record) = &state.weather {
                self.persist(record);
            }
            state.clone()
        };

        self.view.render(&snapshot);
    }

    /// A text-input event: `text` is the full field value, not a delta.
    pub async fn input(&self, text: &str) -> Result<(), LookupError> {
        self.update(|state| state.query = text.to_string());
        self.fetch_suggestions(text).await
    }

    /// Refresh the suggestion list for `query`.
    ///
    /// Short queries clear the list without a request. Failures leave the
    /// list as it was; the error is returned for the caller to log, never shown.
    pub async fn fetch_suggestions(&self, query: &str) -> Result<(), LookupError> {
        if query.chars().count() < MIN_QUERY_CHARS {
            self.clear_suggestions();
            return Ok(());
        }

        let id = self.suggestion_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let found = match self.provider.find_cities(query).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, query, "Error fetching city suggestions");
                return Err(LookupError::Suggestions(e));
            }
        };

        let snapshot = {
            let mut state = self.lock();
            if self.suggestion_seq.load(Ordering::SeqCst) != id {
                debug!(query, id, "Discarding stale suggestions");
                return Ok(());
            }
            state.suggestions = found;
            state.clone()
        };

        self.view.render(&snapshot);
        Ok(())
    }

    /// Look up current conditions and make them the displayed record.
    ///
    /// An empty `city` does nothing. On failure the user is alerted once and
    /// the previous record stays in place.
    pub async fn fetch_weather(&self, city: &str, country: &str) -> Result<(), LookupError> {
        if city.is_empty() {
            return Ok(());
        }

        match self.provider.current_weather(city, country).await {
            Ok(record) => {
                info!(city = %record.city, country = %record.country, "Weather updated");
                self.replace_weather(record);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, city, country, "Weather lookup failed");
                self.view.alert(CITY_NOT_FOUND);
                Err(LookupError::Weather(e))
            }
        }
    }

    /// Form submission: look up the raw query text with no country filter.
    pub async fn submit(&self) -> Result<(), LookupError> {
        let query = self.lock().query.clone();
        let result = self.fetch_weather(&query, "").await;
        self.clear_suggestions();
        result
    }

    /// A suggestion was picked: it becomes the query and is looked up with its country.
    pub async fn select(&self, suggestion: &Suggestion) -> Result<(), LookupError> {
        self.update(|state| state.query = suggestion.name.clone());
        let result = self.fetch_weather(&suggestion.name, &suggestion.country).await;
        self.clear_suggestions();
        result
    }

    /// Empty the list and invalidate any suggestion request still in flight.
    fn clear_suggestions(&self) {
        self.suggestion_seq.fetch_add(1, Ordering::SeqCst);
        self.update(|state| state.suggestions.clear());
    }

    /// Storage and state change under one lock so they never disagree.
    fn replace_weather(&self, record: WeatherRecord) {
        let snapshot = {
            let mut state = self.lock();
            self.persist(&record);
            state.weather = Some(record);
            state.revision += 1;
            state.clone()
        };
        self.view.render(&snapshot);
    }

    fn persist(&self, record: &WeatherRecord) {
        if let Err(e) = self.cache.persist(record) {
            error!(error = %e, "Failed to store weather result");
        }
    }

    fn update(&self, f: impl FnOnce(&mut AppState)) {
        let snapshot = {
            let mut state = self.lock();
            f(&mut state);
            state.clone()
        };
        self.view.render(&snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

//! Core library for the `weather` city lookup.
//!
//! This crate defines:
//! - The OpenWeather client (autocomplete + current conditions)
//! - Persistence of the last weather result
//! - The application state and its input/submit/select flow
//! - Configuration & credentials handling
//!
//! It is used by `weather-cli`, but any front end implementing [`View`] can drive it.

pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod storage;

pub use app::{AppState, View, WeatherApp};
pub use config::Config;
pub use error::{LookupError, ProviderError, StorageError};
pub use model::{CurrentConditions, Suggestion, WeatherRecord};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use storage::{FileStore, KeyValueStore, MemoryStore, WeatherCache};

use crate::{Config, Suggestion, WeatherRecord, error::ProviderError};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Remote source of city suggestions and current conditions.
///
/// "Search/disambiguate" and "fetch current conditions" are separate
/// operations; nothing is cached between them.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Cities matching `query`, in the order the API returned them.
    async fn find_cities(&self, query: &str) -> Result<Vec<Suggestion>, ProviderError>;

    /// Current conditions for `city`. An empty `country` means "best match".
    async fn current_weather(&self, city: &str, country: &str)
    -> Result<WeatherRecord, ProviderError>;
}

/// Construct the OpenWeather provider from config.
///
/// `api_key_override` (CLI flag or environment) wins over the config file.
pub fn provider_from_config(
    config: &Config,
    api_key_override: Option<&str>,
) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.resolve_api_key(api_key_override).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for OpenWeather.\n\
                 Hint: run `weather configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    let provider = match config.base_url.as_deref() {
        Some(base) => OpenWeatherProvider::with_base_url(api_key.to_owned(), base),
        None => OpenWeatherProvider::new(api_key.to_owned()),
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg, None).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("Hint: run `weather configure`"));
    }

    #[test]
    fn provider_from_config_uses_configured_base_url() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            base_url: Some("http://127.0.0.1:9999/".into()),
            ..Config::default()
        };

        let provider = provider_from_config(&cfg, None).expect("key is configured");
        assert_eq!(provider.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn override_key_is_enough_without_config() {
        let provider = provider_from_config(&Config::default(), Some("FLAG_KEY"));
        assert!(provider.is_ok());
    }
}

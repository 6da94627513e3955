use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::ProviderError,
    model::{CurrentConditions, Suggestion, WeatherRecord},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http: Client::new() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        q: &str,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, q, "OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(&[("q", q), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwFindEntry {
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwFindResponse {
    #[serde(default)]
    list: Vec<OwFindEntry>,
}

/// Main category and description of the first reported condition.
fn first_condition(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.main.clone(), w.description.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string()))
}

impl From<OwCurrentResponse> for WeatherRecord {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (condition, description) = first_condition(&parsed.weather);

        WeatherRecord {
            city: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            condition,
            description,
            observed_at: parsed.dt.and_then(unix_to_utc),
        }
    }
}

impl From<OwFindEntry> for Suggestion {
    fn from(entry: OwFindEntry) -> Self {
        let (condition, description) = first_condition(&entry.weather);
        let conditions = entry.main.map(|main| CurrentConditions {
            temperature_c: main.temp,
            humidity_pct: main.humidity,
            condition,
            description,
        });

        Suggestion { name: entry.name, country: entry.sys.country, conditions }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn find_cities(&self, query: &str) -> Result<Vec<Suggestion>, ProviderError> {
        let parsed: OwFindResponse = self.get_json("find", query).await?;
        Ok(parsed.list.into_iter().map(Suggestion::from).collect())
    }

    async fn current_weather(
        &self,
        city: &str,
        country: &str,
    ) -> Result<WeatherRecord, ProviderError> {
        // An empty country still sends the trailing comma: "London,".
        let q = format!("{city},{country}");
        let parsed: OwCurrentResponse = self.get_json("weather", &q).await?;
        Ok(parsed.into())
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

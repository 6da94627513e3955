use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions for one city, as returned by the weather endpoint.
///
/// This is also the shape written to durable storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    /// Main condition category, e.g. "Clouds" or "Rain".
    pub condition: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherRecord {
    /// Static asset path of the icon for this record's condition category.
    pub fn icon_path(&self) -> String {
        format!("/{}.png", self.condition)
    }
}

/// Conditions payload nested in every find-endpoint entry. Kept, not displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub condition: String,
    pub description: String,
}

/// A candidate city returned by the autocomplete lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub conditions: Option<CurrentConditions>,
}

impl Suggestion {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self { name: name.into(), country: country.into(), conditions: None }
    }
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.name, self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clouds() -> WeatherRecord {
        WeatherRecord {
            city: "London".into(),
            country: "GB".into(),
            temperature_c: 15.2,
            humidity_pct: 70,
            condition: "Clouds".into(),
            description: "overcast clouds".into(),
            observed_at: None,
        }
    }

    #[test]
    fn icon_path_follows_condition_category() {
        assert_eq!(clouds().icon_path(), "/Clouds.png");

        let rain = WeatherRecord { condition: "Rain".into(), ..clouds() };
        assert_eq!(rain.icon_path(), "/Rain.png");
    }

    #[test]
    fn record_without_observation_time_still_parses() {
        let json = r#"{"city":"London","country":"GB","temperature_c":15.2,"humidity_pct":70,
            "condition":"Clouds","description":"overcast clouds"}"#;
        let parsed: WeatherRecord = serde_json::from_str(json).expect("stored record parses");
        assert_eq!(parsed, clouds());
    }

    #[test]
    fn suggestion_displays_name_and_country() {
        assert_eq!(Suggestion::new("Paris", "FR").to_string(), "Paris, FR");
    }
}

//! Terminal presentation of the app state.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use weather_core::{AppState, View, WeatherRecord};

/// Prints the weather card for every new lookup result, even one identical
/// to the last. Suggestions are shown by the interactive prompt, not here.
#[derive(Debug, Default)]
pub struct TerminalView {
    shown_revision: AtomicU64,
}

impl TerminalView {
    /// The card to print for `state`, if its record has not been printed yet.
    fn fresh_card(&self, state: &AppState) -> Option<String> {
        let record = state.weather.as_ref()?;
        let previous = self.shown_revision.swap(state.revision, Ordering::SeqCst);
        (previous != state.revision).then(|| format_record(record))
    }
}

impl View for TerminalView {
    fn render(&self, state: &AppState) {
        if let Some(card) = self.fresh_card(state) {
            println!("{card}");
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

pub fn format_record(record: &WeatherRecord) -> String {
    let mut out = format!(
        "[{icon}]\n{temp}°C\n{city}\n  Humidity:    {humidity}%\n  Country:     {country}\n  Description: {description}",
        icon = record.icon_path(),
        temp = record.temperature_c,
        city = record.city,
        humidity = record.humidity_pct,
        country = record.country,
        description = capitalize_first(&record.description),
    );

    if let Some(at) = record.observed_at {
        let local = at.with_timezone(&Local);
        out.push_str(&format!("\n  Observed:    {}", local.format("%Y-%m-%d %H:%M")));
    }

    out
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

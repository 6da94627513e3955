use std::{fmt, process::ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use weather_core::{
    Config, FileStore, KeyValueStore, MemoryStore, OpenWeatherProvider, Suggestion, WeatherApp,
    WeatherCache, provider::provider_from_config,
};

use crate::render::{TerminalView, format_record};

type App = WeatherApp<OpenWeatherProvider, Box<dyn KeyValueStore>, TerminalView>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "City weather lookup with autocomplete")]
pub struct Cli {
    /// OpenWeather API key; overrides the configured one.
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Override the API base URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Keep the last result in memory only.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Interactive search with city suggestions (default).
    Search,

    /// Show current weather for a city.
    Show {
        city: String,

        /// ISO country code narrowing the match, e.g. "GB".
        #[arg(long)]
        country: Option<String>,
    },

    /// List cities matching a query.
    Suggest { query: String },

    /// Print the last stored result without contacting the API.
    Last,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let mut config = Config::load()?;
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }

        match self.command.as_ref().unwrap_or(&Command::Search) {
            Command::Configure => configure(config),
            Command::Search => {
                let app = self.build_app(&config)?;
                search(&app).await
            }
            Command::Show { city, country } => {
                let app = self.build_app(&config)?;
                let country = country.as_deref().unwrap_or("");
                Ok(exit_code(app.fetch_weather(city, country).await.is_ok()))
            }
            Command::Suggest { query } => {
                let app = self.build_app(&config)?;
                suggest(&app, query).await
            }
            Command::Last => self.last(&config),
        }
    }

    fn store(&self, config: &Config) -> Result<Box<dyn KeyValueStore>> {
        if self.ephemeral {
            return Ok(Box::new(MemoryStore::new()));
        }
        Ok(Box::new(FileStore::from_config(config)?))
    }

    fn build_app(&self, config: &Config) -> Result<App> {
        let provider = provider_from_config(config, self.api_key.as_deref())?;
        Ok(WeatherApp::new(provider, self.store(config)?, TerminalView::default()))
    }

    fn last(&self, config: &Config) -> Result<ExitCode> {
        match WeatherCache::new(self.store(config)?).restore() {
            Some(record) => {
                println!("{}", format_record(&record));
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("No stored weather result yet.");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn configure(mut config: Config) -> Result<ExitCode> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(ExitCode::SUCCESS)
}

async fn suggest(app: &App, query: &str) -> Result<ExitCode> {
    for suggestion in suggestions_for(app, query).await {
        println!("{suggestion}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Feed `text` to the app and return the resulting list. A failed lookup is
/// logged by the app and otherwise looks like no matches.
async fn suggestions_for(app: &App, text: &str) -> Vec<Suggestion> {
    let _ = app.input(text).await;
    app.state().suggestions
}

/// One entry of the pick list shown after each query.
enum Choice {
    Search(String),
    City(Suggestion),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Search(text) => write!(f, "Search \"{text}\""),
            Choice::City(suggestion) => write!(f, "{suggestion}"),
        }
    }
}

/// The widget loop: type a city, then submit it or pick a suggestion.
async fn search(app: &App) -> Result<ExitCode> {
    app.init();

    loop {
        let text = match prompt(Text::new("City:").with_help_message("empty input quits").prompt())? {
            Some(text) if !text.trim().is_empty() => text,
            _ => break,
        };

        let suggestions = suggestions_for(app, &text).await;
        if suggestions.is_empty() {
            let _ = app.submit().await;
            continue;
        }

        let mut choices = vec![Choice::Search(text)];
        choices.extend(suggestions.into_iter().map(Choice::City));

        let picked = match prompt(Select::new("Pick a city:", choices).prompt())? {
            Some(picked) => picked,
            None => break,
        };

        // A failed lookup has already been reported through the view.
        let _ = match picked {
            Choice::Search(_) => app.submit().await,
            Choice::City(suggestion) => app.select(&suggestion).await,
        };
    }

    Ok(ExitCode::SUCCESS)
}

/// Esc and Ctrl-C end the session instead of failing it.
fn prompt<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

use anyhow::Context;
use briefing_core::{
    CachedCurrent, Category, Config, FetchError, FileCache, ForecastFetcher, HeadlinesQuery, NewsClient,
    ProviderId, WeatherCache, news::DEFAULT_PAGE_SIZE, provider::weather_provider_from_config,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::{debug, info};

use crate::render;

const FALLBACK_CITY: &str = "New York";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "briefing", version, about = "News and weather in your terminal")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "openweather" or "newsapi".
        provider: String,
    },

    /// Show current conditions for a city.
    Weather {
        /// City name; defaults to the configured city.
        city: Option<String>,

        /// Ignore the cached reading.
        #[arg(long)]
        refresh: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show current conditions and the five-day outlook for a city.
    Forecast {
        /// City name; defaults to the configured city.
        city: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show top headlines.
    Headlines {
        /// Two-letter country code such as us, gb, in or ca; defaults to the configured country.
        #[arg(long, value_parser = parse_country)]
        country: Option<String>,

        /// Restrict to one category; all categories when omitted.
        #[arg(long)]
        category: Option<Category>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,

        #[arg(long)]
        json: bool,
    },

    /// Show the top stories and the lead story of each featured category.
    Featured {
        /// Two-letter country code such as us, gb, in or ca; defaults to the configured country.
        #[arg(long, value_parser = parse_country)]
        country: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Manage the cached weather reading.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Remove the cached reading.
    Clear,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Weather { city, refresh, json } => show_weather(city, refresh, json).await,
            Command::Forecast { city, json } => show_forecast(city, json).await,
            Command::Headlines { country, category, page, page_size, json } => {
                show_headlines(country, category, page, page_size, json).await
            }
            Command::Featured { country, json } => show_featured(country, json).await,
            Command::Cache { action: CacheAction::Clear } => {
                let cache = FileCache::default_location()?;
                cache.clear()?;
                println!("Cleared {}", cache.path().display());
                Ok(())
            }
        }
    }
}

/// Saved config with API keys from the environment applied on top.
fn load_config() -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    config.apply_env_overrides(|var| std::env::var(var).ok());
    Ok(config)
}

/// Keep the provider error as the cause under a message meant for people.
fn user_facing(err: FetchError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

/// Accepts a two-letter country code in any case and normalises it to lowercase.
fn parse_country(raw: &str) -> Result<String, String> {
    let code = raw.trim().to_lowercase();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(format!("'{raw}' is not a two-letter country code (e.g. us, gb, in, ca)"))
    }
}

fn resolve_city(city: Option<String>, config: &Config) -> String {
    city.or_else(|| config.default_city.clone())
        .unwrap_or_else(|| FALLBACK_CITY.to_string())
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.upsert_provider_api_key(id, api_key.trim().to_string());

    match id {
        ProviderId::OpenWeather => {
            let city = Text::new("Default city:")
                .with_default(config.default_city.as_deref().unwrap_or(FALLBACK_CITY))
                .prompt()
                .context("Failed to read default city")?;
            config.default_city = Some(city.trim().to_string());
        }
        ProviderId::NewsApi => {
            let country = Text::new("Headline country code:")
                .with_default(config.country())
                .prompt()
                .context("Failed to read country")?;
            config.country = Some(parse_country(&country).map_err(anyhow::Error::msg)?);
        }
    }

    config.save()?;
    info!(provider = %id, "Saved configuration");
    println!("Saved {} settings to {}", id, Config::config_file_path()?.display());
    Ok(())
}

async fn show_weather(city: Option<String>, refresh: bool, json: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let city = resolve_city(city, &config);
    let fetcher = ForecastFetcher::new(weather_provider_from_config(&config)?);
    let cache = FileCache::default_location()?;
    let service = CachedCurrent::new(&cache, &fetcher).with_ttl(config.cache_ttl());

    debug!(%city, refresh, "Showing weather");
    let now = Utc::now();
    let current = if refresh {
        service.refresh(&city, now).await
    } else {
        service.current(&city, now).await
    }
    .map_err(user_facing)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&current)?);
    } else {
        print!("{}", render::current(&current));
    }
    Ok(())
}

async fn show_forecast(city: Option<String>, json: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let city = resolve_city(city, &config);
    let fetcher = ForecastFetcher::new(weather_provider_from_config(&config)?);

    let report = fetcher
        .report(&city)
        .await
        .map_err(user_facing)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::report(&report));
    }
    Ok(())
}

async fn show_headlines(
    country: Option<String>,
    category: Option<Category>,
    page: u32,
    page_size: u32,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = NewsClient::from_config(&config)?;
    let query = HeadlinesQuery {
        country: country.unwrap_or_else(|| config.country().to_string()),
        category,
        page,
        page_size,
    };

    let headlines = client
        .top_headlines(&query)
        .await
        .map_err(user_facing)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&headlines)?);
    } else {
        print!("{}", render::headlines(&headlines, category));
    }
    Ok(())
}

async fn show_featured(country: Option<String>, json: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = NewsClient::from_config(&config)?;
    let country = country.unwrap_or_else(|| config.country().to_string());

    let top_query = HeadlinesQuery::top_stories(country.as_str());
    let (top, featured) = tokio::try_join!(client.top_headlines(&top_query), client.featured(&country))
        .map_err(user_facing)?;

    if json {
        let out = serde_json::json!({ "top_stories": top.articles, "featured": featured });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render::featured(&top.articles, &featured));
    }
    Ok(())
}

//! OpenWeatherMap client with error translation

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Weather API key is not set")]
    MissingApiKey,

    #[error("Weather API request failed: {0}")]
    Request(String),

    #[error("Weather API returned status {status} for city {city:?}")]
    Status { status: u16, city: String },

    #[error("Malformed weather response: {0}")]
    Malformed(String),
}

/// Current conditions for a city
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_celsius: f64,
    pub humidity: f64,
    pub description: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    main: MainSection,
    weather: Vec<Condition>,
}

#[derive(Deserialize)]
struct MainSection {
    temp: f64,
    humidity: f64,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

/// Thin wrapper around the current-weather REST endpoint. No retries; all
/// failures translate into `WeatherError` for the caller.
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    /// Fetch real-time weather data for a city (metric units).
    pub async fn fetch(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                city: city.to_string(),
            });
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Malformed(e.to_string()))?;

        report_from_response(city, parsed)
    }
}

fn report_from_response(city: &str, response: ApiResponse) -> Result<WeatherReport, WeatherError> {
    let condition = response
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Malformed("No weather conditions in response".to_string()))?;

    Ok(WeatherReport {
        city: city.to_string(),
        temperature_celsius: response.main.temp,
        humidity: response.main.humidity,
        description: condition.description,
    })
}

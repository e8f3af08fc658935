//! Weather branch: city extraction, lookup, answer formatting

use crate::agent::{AgentOutcome, Source};
use crate::error::Result;
use crate::retrieval::Passage;
use crate::weather::{WeatherClient, WeatherReport};
use serde_json::json;
use std::collections::HashMap;

/// Naive city extraction: the word after "in", otherwise the last token.
/// Sufficient for conversational queries like "what's the weather in Tokyo?".
fn extract_city(query: &str) -> String {
    let tokens: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect();

    if let Some(pos) = tokens.iter().position(|t| t == "in") {
        if let Some(city) = tokens.get(pos + 1) {
            return city.trim_matches(['?', '.', ',', '!']).to_string();
        }
    }

    tokens
        .last()
        .map(|t| t.trim_matches(['?', '.', ',', '!']).to_string())
        .unwrap_or_default()
}

fn format_answer(report: &WeatherReport) -> String {
    format!(
        "The current weather in {} is {}, with a temperature of {}°C and humidity around {}%.",
        report.city, report.description, report.temperature_celsius, report.humidity
    )
}

pub async fn run(client: &WeatherClient, query: &str) -> Result<AgentOutcome> {
    let city = extract_city(query);
    let report = client.fetch(&city).await?;
    let answer = format_answer(&report);

    // Mirror the answer as a passage so callers get a uniform context shape
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), json!("weather_api"));
    metadata.insert("city".to_string(), json!(report.city));
    metadata.insert("temperature".to_string(), json!(report.temperature_celsius));
    metadata.insert("humidity".to_string(), json!(report.humidity));
    let passage = Passage::with_metadata(answer.clone(), metadata);

    Ok(AgentOutcome {
        answer,
        source: Source::WeatherApi,
        passages: vec![passage],
    })
}

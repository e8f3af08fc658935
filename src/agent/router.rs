//! Intent classification for the decision node

use crate::llm::LanguageModel;

/// The two branches of the agent graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Weather,
    Rag,
}

fn router_prompt(query: &str) -> String {
    format!(
        "You are an intelligent query router. Classify the user's intent into \
         exactly one of two categories: \"weather\" or \"rag\".\n\n\
         Categories:\n\
         1. \"weather\": strictly for queries asking about current weather \
         conditions, temperature, forecast, rain, or humidity in specific locations.\n\
         2. \"rag\": for EVERYTHING else, including general questions, definitions, \
         summaries and document queries.\n\n\
         Output ONLY one word: \"weather\" or \"rag\".\n\n\
         Query: {query}"
    )
}

/// Normalize raw classifier output into a route.
///
/// Substring match, case-insensitive: only an explicit "weather" selects the
/// weather branch. Everything else, including malformed or rambling output,
/// defaults to retrieval so ambiguity can never trigger a weather-tool call.
pub fn parse_route(raw: &str) -> Route {
    if raw.to_lowercase().contains("weather") {
        Route::Weather
    } else {
        Route::Rag
    }
}

/// Run the single-step classification call.
pub async fn classify(llm: &dyn LanguageModel, query: &str) -> Route {
    match llm.complete(&router_prompt(query)).await {
        Ok(raw) => parse_route(&raw),
        Err(e) => {
            tracing::warn!(error = %e, "Intent classification failed, defaulting to retrieval");
            Route::Rag
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_weather_output_routes_to_weather() {
        assert_eq!(parse_route("weather"), Route::Weather);
        assert_eq!(parse_route("WEATHER"), Route::Weather);
        assert_eq!(parse_route("The category is \"weather\"."), Route::Weather);
    }

    #[test]
    fn rag_output_routes_to_rag() {
        assert_eq!(parse_route("rag"), Route::Rag);
    }

    #[test]
    fn ambiguous_output_defaults_to_rag() {
        // Mentions rain but never the token "weather"
        assert_eq!(
            parse_route("I think this could be about rain or maybe not"),
            Route::Rag
        );
    }

    #[test]
    fn malformed_output_defaults_to_rag() {
        assert_eq!(parse_route(""), Route::Rag);
        assert_eq!(parse_route("🤖💥"), Route::Rag);
        assert_eq!(parse_route("category: unknown"), Route::Rag);
    }

    #[test]
    fn prompt_includes_the_query() {
        let prompt = router_prompt("is it raining in Oslo");
        assert!(prompt.contains("is it raining in Oslo"));
    }
}

//! Two-branch agent: intent routing into retrieval or weather lookup
//!
//! Flow: query -> decision -> {weather | rag} -> answer. Exactly one branch
//! executes per query; there are no cycles, retries or re-routing.

mod rag;
mod router;
mod weather;

pub use rag::NO_ANSWER;
pub use router::{classify, parse_route, Route};

use crate::error::Result;
use crate::llm::LanguageModel;
use crate::retrieval::{Passage, Retriever};
use crate::weather::WeatherClient;
use std::sync::Arc;

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Rag,
    WeatherApi,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Rag => "rag",
            Source::WeatherApi => "weather_api",
        }
    }
}

/// Final state of one agent run
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub answer: String,
    pub source: Source,
    pub passages: Vec<Passage>,
}

/// The agent graph, with all collaborators injected at construction.
pub struct Agent {
    llm: Arc<dyn LanguageModel>,
    retriever: Arc<dyn Retriever>,
    weather: Arc<WeatherClient>,
}

impl Agent {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        retriever: Arc<dyn Retriever>,
        weather: Arc<WeatherClient>,
    ) -> Self {
        Self {
            llm,
            retriever,
            weather,
        }
    }

    /// Process one query end to end.
    pub async fn run(&self, query: &str) -> Result<AgentOutcome> {
        let route = classify(self.llm.as_ref(), query).await;
        tracing::info!(route = ?route, "Routed query");

        match route {
            Route::Weather => weather::run(&self.weather, query).await,
            Route::Rag => rag::run(self.llm.as_ref(), self.retriever.as_ref(), query).await,
        }
    }
}

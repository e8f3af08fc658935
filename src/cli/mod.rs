//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ragent",
    version,
    about = "Retrieval-augmented question answering over a local document corpus",
    long_about = "Ragent answers questions over a local document corpus using hybrid \
                  retrieval (dense vector search plus BM25) with cross-encoder reranking, \
                  and routes weather questions to a live weather lookup."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/ragent/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single question and exit
    Ask {
        /// Question to ask
        question: String,

        /// Show the retrieved passages alongside the answer
        #[arg(long)]
        show_sources: bool,
    },

    /// Interactive question-answering loop
    Chat,

    /// Load, chunk and upload the corpus to the vector store
    Ingest {
        /// Corpus file or directory (defaults to the configured corpus path)
        path: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_takes_a_question() {
        let cli = Cli::try_parse_from(["ragent", "ask", "what is hybrid retrieval"]).unwrap();
        match cli.command {
            Commands::Ask { question, .. } => {
                assert_eq!(question, "what is hybrid retrieval");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

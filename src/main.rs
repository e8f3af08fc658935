use ragent::agent::AgentOutcome;
use ragent::app::AppContext;
use ragent::cli::{Cli, Commands, ConfigAction};
use ragent::config::Config;
use ragent::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Ask {
            question,
            show_sources,
        } => {
            cmd_ask(cli.config, &question, show_sources).await?;
        }
        Commands::Chat => {
            cmd_chat(cli.config).await?;
        }
        Commands::Ingest { path } => {
            cmd_ingest(cli.config, path).await?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "ragent=debug" } else { "ragent=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn cmd_ask(
    config_path: Option<std::path::PathBuf>,
    question: &str,
    show_sources: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let ctx = AppContext::init(config).await?;
    let agent = ctx.agent()?;

    let outcome = agent.run(question).await?;
    print_outcome(&outcome, show_sources);

    Ok(())
}

async fn cmd_chat(config_path: Option<std::path::PathBuf>) -> Result<()> {
    use std::io::{BufRead, Write};

    let config = load_config(config_path)?;
    let ctx = AppContext::init(config).await?;
    let agent = ctx.agent()?;

    println!("Interactive mode. Type 'exit' or 'quit' to leave.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        match agent.run(question).await {
            Ok(outcome) => print_outcome(&outcome, false),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    Ok(())
}

async fn cmd_ingest(
    config_path: Option<std::path::PathBuf>,
    path: Option<std::path::PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(path) = path {
        config.corpus.path = path;
    }

    // AppContext::init ingests idempotently as part of startup
    let ctx = AppContext::init(config).await?;

    println!(
        "✓ Corpus ready in collection '{}'",
        ctx.config().qdrant.collection
    );

    Ok(())
}

fn cmd_config(config_path: Option<std::path::PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            Config::load(&path)?;
            println!("✓ Configuration is valid");
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'ragent config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        return Ok(config);
    }

    Config::load(&path)
}

fn print_outcome(outcome: &AgentOutcome, show_sources: bool) {
    println!("{}", outcome.answer);
    println!("\n[source: {}]", outcome.source.as_str());

    if show_sources && !outcome.passages.is_empty() {
        println!("\nRetrieved passages:");
        for (i, passage) in outcome.passages.iter().enumerate() {
            let preview: String = passage.content.chars().take(160).collect();
            println!("  {}. {}", i + 1, preview);
        }
    }
}

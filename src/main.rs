//! HybridRouter CLI - Route BI assistant prompts between local and cloud LLMs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hybrid_router::{
    config::Config,
    routing::{policy, RouteRequest, Router, RoutingClass, TaskCategory, TaskInput},
    tui::InteractiveShell,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hybrid-router")]
#[command(about = "Route business-intelligence LLM requests between local and cloud models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (overridden by RUST_LOG)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Config file (default: ~/.config/hybrid-router/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a prompt to the best available provider
    Route {
        /// Prompt text
        prompt: String,

        /// Task category (e.g. simple-query, complex-query, summary)
        #[arg(short, long)]
        task: Option<String>,

        /// Pick the task category from query complexity
        #[arg(long, conflicts_with = "task")]
        auto: bool,

        /// System prompt text
        #[arg(short, long)]
        system: Option<String>,

        /// Read the system prompt from a file
        #[arg(long, conflicts_with = "system")]
        system_file: Option<PathBuf>,

        /// Maximum tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// Force a provider (local or cloud), disabling fallback
        #[arg(short, long)]
        provider: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show provider configuration and availability
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Estimate per-provider cost for a task
    Estimate {
        /// Task category
        #[arg(short, long, default_value = "simple-query")]
        task: String,

        /// Estimated total tokens
        #[arg(long, conflicts_with = "prompt")]
        tokens: Option<u64>,

        /// Derive the token estimate from prompt text
        #[arg(long)]
        prompt: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Analyze query complexity
    Analyze {
        /// Natural language query
        query: String,

        #[arg(long)]
        json: bool,
    },

    /// Interactive routing shell
    Interactive,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration (API key masked)
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., local.model, routing.default_task)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    match cli.command {
        Commands::Route {
            prompt,
            task,
            auto,
            system,
            system_file,
            max_tokens,
            temperature,
            provider,
            json,
        } => {
            let system = match system_file {
                Some(path) => Some(
                    tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?,
                ),
                None => system,
            };
            let options = RouteOptions {
                task,
                auto,
                system,
                max_tokens,
                temperature,
                provider,
                json,
            };
            run_route(&config_path, prompt, options).await?;
        }
        Commands::Status { json } => {
            run_status(&config_path, json).await?;
        }
        Commands::Estimate {
            task,
            tokens,
            prompt,
            json,
        } => {
            run_estimate(&config_path, &task, tokens, prompt.as_deref(), json)?;
        }
        Commands::Analyze { query, json } => {
            run_analyze(&config_path, &query, json)?;
        }
        Commands::Interactive => {
            let config = Config::load_from(config_path)?;
            let router = Arc::new(Router::from_config(&config));
            router.probe().await;
            InteractiveShell::new(router, config).run().await?;
        }
        Commands::Config(cmd) => {
            run_config_command(&config_path, cmd)?;
        }
    }

    Ok(())
}

struct RouteOptions {
    task: Option<String>,
    auto: bool,
    system: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    provider: Option<String>,
    json: bool,
}

async fn run_route(config_path: &Path, prompt: String, options: RouteOptions) -> Result<()> {
    let config = Config::load_from(config_path.to_path_buf())?;
    let router = Router::from_config(&config);
    router.probe().await;

    let task: TaskInput = if options.auto {
        let analysis = router.analyze_query_complexity(&prompt);
        info!(
            "Query complexity {} -> {}",
            analysis.complexity, analysis.recommended_task_category
        );
        analysis.recommended_task_category.into()
    } else {
        match options.task {
            Some(task) => task.into(),
            None => config.routing.default_task.into(),
        }
    };

    let mut request = RouteRequest::new(prompt, task)
        .with_max_tokens(options.max_tokens.unwrap_or(config.routing.max_tokens))
        .with_temperature(options.temperature.unwrap_or(config.routing.temperature));
    if let Some(system) = options.system {
        request = request.with_system(system);
    }
    if let Some(provider) = options.provider {
        request = request.force_provider(provider);
    }

    let result = router.route(request).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.content);
        println!("\n--- Routing ---");
        println!(
            "Provider: {}{} ({})",
            result.provider,
            if result.fallback { " (fallback)" } else { "" },
            result.model
        );
        println!(
            "Tokens: {} in + {} out = {}",
            result.usage.input_tokens,
            result.usage.output_tokens,
            result.tokens()
        );
        println!("Cost: ${:.6}", result.cost);
    }

    Ok(())
}

async fn run_status(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::load_from(config_path.to_path_buf())?;
    let router = Router::from_config(&config);
    let status = router.status().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    for (name, provider) in [("Local", &status.local), ("Cloud", &status.cloud)] {
        println!(
            "{:<6} enabled: {:<5} available: {:<5} model: {}",
            name, provider.enabled, provider.available, provider.model
        );
    }
    if !status.any_available() {
        println!("\nNo provider is available.");
        println!("  Start Ollama (ollama serve) or set ANTHROPIC_API_KEY.");
    }

    Ok(())
}

fn run_estimate(
    config_path: &Path,
    task: &str,
    tokens: Option<u64>,
    prompt: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = Config::load_from(config_path.to_path_buf())?;
    let router = Router::from_config(&config);

    let tokens = match (tokens, prompt) {
        (Some(tokens), _) => tokens,
        (None, Some(text)) => {
            let prompt_tokens = count_tokens(text)?;
            // Budget covers the prompt plus the configured response ceiling
            prompt_tokens + u64::from(config.routing.max_tokens)
        }
        (None, None) => 1000,
    };

    let estimate = router.estimate_cost(task, tokens);

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        println!("Task category: {}", estimate.task_category);
        println!("Estimated tokens: {}", tokens);
        println!("Local cost: ${:.6}", estimate.local_cost);
        println!("Cloud cost: ${:.6}", estimate.cloud_cost);
        println!("Recommended: {}", estimate.recommended_provider);
    }

    Ok(())
}

fn count_tokens(text: &str) -> Result<u64> {
    let bpe = tiktoken_rs::cl100k_base()?;
    Ok(bpe.encode_with_special_tokens(text).len() as u64)
}

fn run_analyze(config_path: &Path, query: &str, json: bool) -> Result<()> {
    let config = Config::load_from(config_path.to_path_buf())?;
    let analysis = Router::from_config(&config).analyze_query_complexity(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("Complexity: {}", analysis.complexity);
        println!("Complex indicators: {}", analysis.complex_count);
        println!("Medium indicators: {}", analysis.medium_count);
        println!("Recommended task: {}", analysis.recommended_task_category);
        println!("Recommended provider: {}", analysis.recommended_provider);
    }

    Ok(())
}

fn run_config_command(config_path: &Path, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => {
            if config_path.exists() && !force {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                println!("Use --force to overwrite");
                return Ok(());
            }

            Config::default().save_to(config_path.to_path_buf())?;
            println!("Configuration file created at: {}", config_path.display());
            println!();
            println!("Next steps:");
            println!("  1. Start a local model: ollama pull llama3.2 && ollama serve");
            println!("  2. For cloud routing: export ANTHROPIC_API_KEY=your_key");
        }
        ConfigCommands::Show => {
            let config = Config::load_from(config_path.to_path_buf())?;
            println!("{}", toml::to_string_pretty(&config.masked())?);

            println!("--- Environment Variables ---");
            for var in ["ANTHROPIC_API_KEY", "OLLAMA_URL", "OLLAMA_MODEL", "USE_LOCAL_LLM"] {
                let state = if std::env::var(var).is_ok() { "set" } else { "not set" };
                println!("{}: {}", var, state);
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = if config_path.exists() {
                toml::from_str(&std::fs::read_to_string(config_path)?)?
            } else {
                Config::default()
            };
            config.set(&key, &value)?;
            config.save_to(config_path.to_path_buf())?;

            let shown = if key.ends_with("api_key") { "***" } else { value.as_str() };
            println!("Set {} = {}", key, shown);
        }
        ConfigCommands::Path => {
            println!("{}", config_path.display());
            if config_path.exists() {
                println!("(file exists)");
            } else {
                println!("(file does not exist - run 'config init' to create)");
            }
        }
        ConfigCommands::Validate => {
            let config = Config::load_from(config_path.to_path_buf())?;
            match config.validate() {
                Ok(()) => {
                    println!("Configuration is valid!");
                    println!();
                    if config.local.enabled {
                        println!(
                            "  Local: enabled (url: {}, model: {})",
                            config.local.url, config.local.model
                        );
                    } else {
                        println!("  Local: disabled");
                    }
                    if config.has_cloud_key() {
                        println!("  Cloud: enabled (model: {})", config.cloud.model);
                    } else {
                        println!("  Cloud: no API key");
                    }
                    println!();
                    let local_first: Vec<&str> = TaskCategory::ALL
                        .iter()
                        .filter(|c| policy::routing_class(**c) == RoutingClass::LocalFirst)
                        .map(|c| c.as_str())
                        .collect();
                    println!("Local-first tasks: {}", local_first.join(", "));
                }
                Err(e) => {
                    println!("Configuration validation failed:");
                    println!("  {}", e);
                }
            }
        }
    }

    Ok(())
}

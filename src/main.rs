//! pagegist CLI - three-sentence webpage summaries
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use pagegist::{pipeline, Config, GeminiClient, Retriever, Summarizer, SummaryRecord};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pagegist")]
#[command(author, version, about = "Summarise a webpage in three sentences", long_about = None)]
struct Cli {
    /// Path to a pagegist.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a webpage by URL
    #[command(alias = "summarize")]
    Summarise {
        /// URL to summarise
        url: String,
        /// Show raw extracted text instead of summary
        #[arg(long)]
        raw: bool,
        /// Attempts per retrieval phase
        #[arg(long)]
        max_retries: Option<u32>,
        /// Fallback request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Skip TLS certificate verification when fetching the article
        #[arg(long)]
        insecure: bool,
        /// Model identifier (e.g. gemini-1.5-flash)
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the JSON schema of the summary record
    Schema,
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Summarise {
            url,
            raw,
            max_retries,
            timeout,
            insecure,
            model,
        } => {
            // Secrets may live in .env; load it before reading the environment.
            let _ = dotenv::dotenv();

            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(max_retries) = max_retries {
                config.retrieval.max_retries = max_retries;
            }
            if let Some(timeout) = timeout {
                config.retrieval.timeout_secs = timeout;
            }
            if insecure {
                config.retrieval.accept_invalid_certs = true;
            }
            if let Some(model) = model {
                config.agent.model = model;
            }

            let retriever = Retriever::from_config(&config)?;

            if raw {
                // Just show raw extracted text
                match retriever.retrieve(&url).await {
                    Ok(content) => {
                        let title = content.title.as_deref().unwrap_or("No title");
                        println!("=== {} ===\n", title);
                        println!("{}", content.text);
                        eprintln!("\n--- Extracted {} characters ---", content.text.len());
                    }
                    Err(_) => println!("{}", SummaryRecord::fetch_failed(&url).to_pretty_json()?),
                }
                return Ok(());
            }

            let summarizer = Summarizer::new(GeminiClient::from_config(&config)?);
            let record = pipeline::run(&retriever, &summarizer, &url).await?;
            println!("{}", record.to_pretty_json()?);
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(SummaryRecord);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pagegist", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Log to stderr so stdout carries only the JSON document
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

//! # perfbot CLI
//!
//! Chat with the performance tracker from a terminal, or serve the same
//! assistant over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! perfbot --config ./config/perfbot.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `perfbot ask "<query>"` | Answer one question and exit |
//! | `perfbot chat` | Interactive session on stdin (`/reload`, `/quit`) |
//! | `perfbot corpus` | List the employees and departments a session would see |
//! | `perfbot health` | Check that the backend answers |
//! | `perfbot serve` | Start the HTTP chat server |
//!
//! Logs go to stderr and honor `RUST_LOG` (default `perfbot=info`).

use anyhow::bail;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use perfbot::client::HttpApi;
use perfbot::config::{self, Config};
use perfbot::session::{ChatSession, SessionOptions};
use perfbot::{corpus, server};

/// perfbot — a retrieval chat assistant for the employee performance tracker.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults (backend at
/// `http://localhost:5000/api`).
#[derive(Parser)]
#[command(name = "perfbot", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/perfbot.toml")]
    config: PathBuf,

    /// Override `api.base_url` from the config file.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question.
    ///
    /// Loads the corpus, answers, and prints the reply to stdout.
    Ask {
        /// The question, e.g. "Tell me about John Doe".
        query: String,
    },

    /// Start an interactive chat session.
    ///
    /// `/reload` refreshes the corpus; `/quit` or end of input exits.
    Chat,

    /// Load the corpus and list its employees and departments.
    Corpus,

    /// Check the backend's health endpoint.
    Health,

    /// Start the HTTP chat server on `[server].bind`.
    Serve,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("perfbot=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut cfg = config::load_config_or_minimal(&cli.config)?;
    if let Some(url) = cli.api_url {
        cfg.api.base_url = url;
        config::validate(&cfg)?;
    }

    match cli.command {
        Commands::Ask { query } => run_ask(&cfg, &query).await?,
        Commands::Chat => run_chat(&cfg).await?,
        Commands::Corpus => run_corpus(&cfg).await?,
        Commands::Health => run_health(&cfg).await?,
        Commands::Serve => server::run_server(&cfg).await?,
    }

    Ok(())
}

async fn start_session(cfg: &Config) -> anyhow::Result<ChatSession> {
    let api = HttpApi::new(&cfg.api)?;
    Ok(ChatSession::start(Box::new(api), SessionOptions::from(&cfg.chat)).await)
}

async fn run_ask(cfg: &Config, query: &str) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        bail!("query must not be empty");
    }

    let mut session = start_session(cfg).await?;
    if let Some(reply) = session.submit(query).await {
        println!("{}", reply.text.trim_end());
    }
    Ok(())
}

async fn run_chat(cfg: &Config) -> anyhow::Result<()> {
    let mut session = start_session(cfg).await?;
    if let Some(greeting) = session.transcript().first() {
        println!("{}\n", greeting.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/reload" => {
                session.reload().await;
                println!(
                    "Reloaded {} employees, {} departments.\n",
                    session.corpus().employees.len(),
                    session.corpus().departments.len()
                );
            }
            _ => {
                if let Some(reply) = session.submit(&line).await {
                    println!("{}\n", reply.text.trim_end());
                }
            }
        }
    }

    Ok(())
}

async fn run_corpus(cfg: &Config) -> anyhow::Result<()> {
    let api = HttpApi::new(&cfg.api)?;
    let corpus = corpus::load(&api).await?;

    println!("Employees ({}):", corpus.employees.len());
    for emp in &corpus.employees {
        println!(
            "  {:<24} {:<12} {:<28} {}",
            emp.name, emp.department, emp.position, emp.status
        );
    }
    println!();

    println!("Departments ({}):", corpus.departments.len());
    for dept in &corpus.departments {
        let employees = dept
            .metrics
            .as_ref()
            .and_then(|m| m.total_employees)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        println!("  {:<24} employees: {}", dept.name, employees);
    }

    Ok(())
}

async fn run_health(cfg: &Config) -> anyhow::Result<()> {
    let api = HttpApi::new(&cfg.api)?;
    match api.health().await {
        Ok(()) => {
            println!("ok  {}", api.base_url());
            Ok(())
        }
        Err(e) => bail!("backend unhealthy at {}: {}", api.base_url(), e),
    }
}

use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use ns_inference::{Backend, Config, DevicePreference, InferenceEngine};
use ns_web::AppState;
use tracing::{info, Level};

mod client;
mod logging;

use client::{render_details, render_stats, render_summary, ApiClient, SummarizeOutcome, TextStats};
use logging::{init_logging, parse_level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Russian news summarization service and client", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, env = "NS_LOG_LEVEL", default_value = "info", value_parser = parse_level)]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "NS_HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, env = "NS_PORT", default_value_t = 8000)]
    port: u16,
    #[arg(long, env = "NS_BACKEND", default_value = "huggingface", help = "Model backend: huggingface (default), lead, ollama")]
    backend: Backend,
    #[arg(long, env = "NS_MODEL", default_value = ns_core::DEFAULT_MODEL)]
    model: String,
    #[arg(long, env = "NS_MODEL_URL")]
    model_url: Option<String>,
    #[arg(long, env = "NS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "NS_DEVICE", default_value = "auto")]
    device: DevicePreference,
    /// Per-call timeout towards the model backend (e.g. 30s, 2m)
    #[arg(long, env = "NS_TIMEOUT", default_value = "120s", value_parser = parse_timeout)]
    timeout: Duration,
}

impl ServeArgs {
    fn inference_config(&self) -> Config {
        Config {
            backend: self.backend,
            model_name: self.model.clone(),
            model_url: self.model_url.clone(),
            api_key: self.api_key.clone(),
            device: self.device,
            timeout: self.timeout,
        }
    }
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let timeout = humantime::parse_duration(s).map_err(|e| format!("Invalid timeout {}: {}", s, e))?;
    if timeout.is_zero() {
        return Err("Timeout must be greater than zero".to_string());
    }
    Ok(timeout)
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Check that the API is reachable and the model is loaded
    Health {
        #[arg(long, env = "NS_API_URL", default_value = "http://localhost:8000")]
        url: String,
    },
    /// Summarize a text through the API
    Summarize {
        #[arg(long, env = "NS_API_URL", default_value = "http://localhost:8000")]
        url: String,
        /// Desired summary length in characters
        #[arg(long, default_value_t = 120)]
        max_length: i64,
        /// Also print the full response as JSON
        #[arg(long)]
        json: bool,
        /// Read the text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Text to summarize. Read from stdin when neither this nor --file is given.
        text: Option<String>,
    },
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.inference_config();
    info!("🚀 Starting summarizer with {:?}", config);

    let engine = Arc::new(InferenceEngine::new());
    // Requests arriving before the load finishes are answered with 503
    let _loader = engine.spawn_load(config);

    let addr = SocketAddr::new(args.host, args.port);
    ns_web::serve(addr, AppState::new(engine))
        .await
        .with_context(|| format!("Server on {} failed", addr))
}

async fn health(url: &str) -> anyhow::Result<()> {
    let client = ApiClient::new(url)?;
    let health = client.health().await?;
    println!("✅ API is available at {}", client.base_url());
    println!("Model loaded: {}", health.model_loaded);
    if !health.is_healthy() {
        bail!("service reports status {}", health.status);
    }
    Ok(())
}

fn read_text(file: Option<PathBuf>, text: Option<String>) -> anyhow::Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read text from stdin")?;
    Ok(buffer)
}

async fn summarize(url: &str, max_length: i64, text: String, json: bool) -> anyhow::Result<()> {
    let stats = TextStats::of(&text);
    println!("{}", render_stats(&stats));
    if stats.characters < ns_core::types::MIN_TEXT_LENGTH {
        bail!(
            "Please enter a text of at least {} characters",
            ns_core::types::MIN_TEXT_LENGTH
        );
    }

    let client = ApiClient::new(url)?;
    match client.summarize(&text, max_length).await? {
        SummarizeOutcome::Success(response) => {
            println!();
            println!("{}", render_summary(&response));
            if json {
                println!();
                println!("{}", render_details(&response)?);
            }
            Ok(())
        }
        SummarizeOutcome::Unavailable(detail) => {
            bail!("Model is not loaded yet, wait for loading to finish or check the server: {}", detail)
        }
        SummarizeOutcome::Failed { status, body } => {
            let body: String = body.chars().take(200).collect();
            bail!("API error {}: {}", status, body)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Health { url } => health(&url).await,
        Commands::Summarize {
            url,
            max_length,
            json,
            file,
            text,
        } => {
            let text = read_text(file, text)?;
            summarize(&url, max_length, text, json).await
        }
    }
}

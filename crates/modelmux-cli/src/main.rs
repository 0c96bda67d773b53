//! Modelmux CLI — entry point.
//!
//! # Commands
//!
//! - `modelmux status` — probed availability, resolved default, model menu
//! - `modelmux models` — just the selectable model names
//! - `modelmux invoke -m MODEL -p PROMPT` — one invocation + cost report

mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use modelmux_core::config::load_config;
use modelmux_core::types::GenerationParams;
use modelmux_router::ModelRouter;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Modelmux — generative-model routing across managed backends
#[derive(Parser)]
#[command(name = "modelmux", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show backend availability and the resolved default model
    Status {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// List the selectable model names
    Models {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Invoke a model once and print the output plus the cost report
    Invoke {
        /// Model name (defaults to the resolved default model)
        #[arg(short, long)]
        model: Option<String>,

        /// The prompt to send
        #[arg(short, long)]
        prompt: String,

        /// Maximum tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f64>,

        /// Nucleus sampling cutoff
        #[arg(long)]
        top_p: Option<f64>,

        /// Top-k sampling cutoff
        #[arg(long)]
        top_k: Option<u32>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status { logs } => {
            init_logging(logs);
            status::run().await
        }
        Commands::Models { logs } => {
            init_logging(logs);
            run_models().await
        }
        Commands::Invoke {
            model,
            prompt,
            max_tokens,
            temperature,
            top_p,
            top_k,
            logs,
        } => {
            init_logging(logs);
            run_invoke(model, prompt, max_tokens, temperature, top_p, top_k).await
        }
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_models() -> Result<()> {
    let config = load_config(None);
    let router = ModelRouter::connect(&config).await;

    for name in router.model_names() {
        println!("{name}");
    }
    Ok(())
}

async fn run_invoke(
    model: Option<String>,
    prompt: String,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    top_k: Option<u32>,
) -> Result<()> {
    let config = load_config(None);
    let router = ModelRouter::connect(&config).await;

    let model = match model {
        Some(m) => m,
        None => router.default_model_name()?.to_string(),
    };
    info!(model = %model, "invoking");

    // Trim the prompt to the model's declared ceiling before sending
    let limit = router.char_limit(&model) as usize;
    let prompt = modelmux_core::utils::truncate_chars(&prompt, limit);

    let params = GenerationParams {
        max_tokens,
        temperature,
        top_p,
        top_k,
        stop_sequences: Vec::new(),
    };

    let output = router.invoke_text(&model, &prompt, &params).await?;
    println!("{output}");

    let report = router.cost_report();
    if !report.is_empty() {
        println!();
        println!("{report}");
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("modelmux=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

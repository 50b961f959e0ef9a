use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use llm_annotator::config::{ConfigError, load_config};
use llm_annotator::mcp::{self, McpHandler, Transport};
use llm_annotator::{AnnotateError, AnnotationResponse, AnnotationService};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// annotator - LLM-based multi-label text tagging
#[derive(Parser)]
#[command(name = "annotator")]
#[command(about = "LLM Tag Annotator - multi-label text classification tool")]
#[command(version)]
struct Cli {
    /// Path to a config file; repeat to merge overlays (default: configs/config.yaml)
    #[arg(short, long = "config", value_name = "PATH", global = true)]
    config: Vec<PathBuf>,

    /// Annotator name to use (default: first annotator in config)
    #[arg(short, long, value_name = "NAME", global = true)]
    annotator: Option<String>,

    /// Model name to use (default: first model in config)
    #[arg(short, long, value_name = "NAME", global = true)]
    model: Option<String>,

    /// Text context to annotate (prompted interactively if omitted)
    #[arg(long, value_name = "TEXT", global = true)]
    context: Option<String>,

    /// Enable info-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Annotate text (the default when no command is given)
    Annotate(AnnotateCommand),
    /// List available annotators and models
    List,
    /// Run the HTTP API
    Serve(ServeCommand),
    /// Run the MCP server
    Mcp(McpCommand),
}

#[derive(Args, Default)]
struct AnnotateCommand {
    /// Text context to annotate
    #[arg(value_name = "CONTEXT")]
    text: Option<String>,

    /// Print the full response as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[derive(Args)]
struct McpCommand {
    /// Transport protocol: stdio or http (alias: streamable-http)
    #[arg(long, default_value = "stdio")]
    transport: Transport,

    /// Host to bind to for the http transport
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to for the http transport
    #[arg(long, default_value_t = 8001)]
    port: u16,

    /// Path of the http endpoint
    #[arg(long, default_value = "/mcp")]
    path: String,
}

/// No text was supplied to annotate.
#[derive(Debug, Error)]
#[error("No context provided")]
struct EmptyContext;

fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Logs always go to stderr so the stdio MCP transport keeps stdout clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "llm_annotator=info,annotator=info,tower_http=info"
    } else {
        "llm_annotator=warn,annotator=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are unknown annotator or model names, missing context and a
/// configuration file that cannot be found.
fn is_user_error(error: &anyhow::Error) -> bool {
    if let Some(e) = error.downcast_ref::<AnnotateError>() {
        return e.is_user_error();
    }
    if error.downcast_ref::<EmptyContext>().is_some() {
        return true;
    }
    matches!(
        error.downcast_ref::<ConfigError>(),
        Some(ConfigError::NotFound { .. })
    )
}

fn run(cli: &Cli) -> Result<()> {
    let default_annotate = AnnotateCommand::default();

    match &cli.command {
        Some(Commands::List) => handle_list(cli),
        Some(Commands::Serve(cmd)) => handle_serve(cli, cmd),
        Some(Commands::Mcp(cmd)) => handle_mcp(cli, cmd),
        Some(Commands::Annotate(cmd)) => handle_annotate(cli, cmd),
        None => handle_annotate(cli, &default_annotate),
    }
}

fn build_service(cli: &Cli) -> Result<AnnotationService> {
    let config = load_config(&cli.config)?;
    Ok(AnnotationService::new(config))
}

fn handle_annotate(cli: &Cli, cmd: &AnnotateCommand) -> Result<()> {
    let service = build_service(cli)?;

    let context = match cli.context.as_deref().or(cmd.text.as_deref()) {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => prompt_for_context()?,
    };

    let response = service.annotate(&context, cli.annotator.as_deref(), cli.model.as_deref())?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response)?;
    }
    Ok(())
}

/// Reads one line of context from stdin.
fn prompt_for_context() -> Result<String> {
    eprintln!("Enter text context to annotate:");

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read context from stdin")?;

    let context = line.trim();
    if context.is_empty() {
        return Err(EmptyContext.into());
    }
    Ok(context.to_string())
}

fn print_response(response: &AnnotationResponse) -> Result<()> {
    if response.tags.is_empty() {
        println!("No tags generated");
    } else {
        println!("Tags: {}", response.tags.join(", "));
    }

    if let Some(metadata) = &response.metadata {
        println!("Metadata: {}", serde_json::to_string(metadata)?);
    }
    Ok(())
}

fn handle_list(cli: &Cli) -> Result<()> {
    let service = build_service(cli)?;

    println!("Available Annotators:");
    for name in service.list_annotators() {
        println!("  - {name}");
    }

    println!();
    println!("Available Models:");
    for name in service.list_models() {
        println!("  - {name}");
    }
    Ok(())
}

fn handle_serve(cli: &Cli, cmd: &ServeCommand) -> Result<()> {
    let service = build_service(cli)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(llm_annotator::server::serve(service, &cmd.host, cmd.port))
}

fn handle_mcp(cli: &Cli, cmd: &McpCommand) -> Result<()> {
    let handler = McpHandler::new(build_service(cli)?);

    match cmd.transport {
        Transport::Stdio => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            mcp::run_stdio(&handler, stdin.lock(), stdout.lock())
        }
        Transport::Http => {
            let runtime =
                tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(mcp::serve_http(handler, &cmd.host, cmd.port, &cmd.path))
        }
    }
}

//! text2sql CLI - Turn stock screening questions into SQL
//!
//! Usage:
//!   text2sql generate <query>
//!   text2sql query <query>
//!   text2sql normalize <sql>
//!   text2sql serve [--host <host>] [--port <port>]
//!   text2sql fields
//!   text2sql explain <indicator>
//!
//! Examples:
//!   text2sql generate "市盈率低于40%"
//!   text2sql normalize "SELECT ts_code FROM stock_business WHERE kdj_k < 20"
//!   text2sql --config ./text2sql.toml serve --port 5050

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use text2sql::config::Settings;
use text2sql::knowledge::Knowledge;
use text2sql::pipeline::{SqlPipeline, SqlSource};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "text2sql")]
#[command(about = "text2sql - Natural-language stock queries to canonical SQL")]
#[command(version)]
struct Cli {
    /// Path to a text2sql.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to a knowledge file extending the built-in aliases and exemplars
    #[arg(short, long, global = true)]
    knowledge: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate SQL for a natural-language query
    Generate {
        /// The question, e.g. "KDJ金叉"
        query: String,
    },

    /// Generate SQL and run it on the execution service
    Query {
        /// The question, e.g. "KDJ金叉"
        query: String,
    },

    /// Canonicalize field names and complete the SELECT list of a statement
    Normalize {
        /// SQL text to normalize
        sql: String,
    },

    /// Start the HTTP server
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List schema fields
    Fields,

    /// Explain a technical indicator
    Explain {
        /// Indicator name, e.g. "MACD金叉"
        indicator: String,
    },
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings, String> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
    .map_err(|e| format!("Error loading config: {}", e))?;

    if let Some(path) = &cli.knowledge {
        settings.generator.knowledge_file = Some(path.display().to_string());
    }
    Ok(settings)
}

fn load_knowledge(settings: &Settings) -> Result<Knowledge, String> {
    let path = settings
        .generator
        .knowledge_path()
        .map_err(|e| format!("Error loading config: {}", e))?;
    match path {
        Some(path) => Knowledge::from_file(&path)
            .map_err(|e| format!("Error loading knowledge file '{}': {}", path.display(), e)),
        None => Ok(Knowledge::builtin()),
    }
}

fn build_pipeline(settings: &Settings) -> Result<SqlPipeline, String> {
    SqlPipeline::from_settings(settings).map_err(|e| format!("Error: {}", e))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    let settings = match load_settings(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Generate { query } => cmd_generate(&settings, &query).await,
        Commands::Query { query } => cmd_query(&settings, &query).await,
        Commands::Normalize { sql } => cmd_normalize(&settings, &sql),
        Commands::Serve { host, port } => cmd_serve(&settings, host, port).await,
        Commands::Fields => cmd_fields(&settings),
        Commands::Explain { indicator } => cmd_explain(&settings, &indicator),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn describe_source(source: &SqlSource) -> String {
    match source {
        SqlSource::Exemplar { phrase, .. } => format!("exemplar \"{}\"", phrase),
        SqlSource::Llm => "language model".to_string(),
        SqlSource::Fallback { reason } => format!("fallback ({})", reason),
    }
}

async fn cmd_generate(settings: &Settings, query: &str) -> Result<(), String> {
    if query.trim().is_empty() {
        return Err("Query must not be empty".to_string());
    }
    let pipeline = build_pipeline(settings)?;
    let generated = pipeline.generate(query).await;

    println!("-- Source: {}", describe_source(&generated.source));
    println!("{}", generated.sql);
    Ok(())
}

async fn cmd_query(settings: &Settings, query: &str) -> Result<(), String> {
    if query.trim().is_empty() {
        return Err("Query must not be empty".to_string());
    }
    let pipeline = build_pipeline(settings)?;
    let outcome = pipeline.query(query).await;

    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|e| format!("Error encoding result: {}", e))?;
    println!("{}", json);

    if outcome.result.is_failure() {
        return Err(outcome.result.msg.unwrap_or_default());
    }
    Ok(())
}

fn cmd_normalize(settings: &Settings, sql: &str) -> Result<(), String> {
    let knowledge = load_knowledge(settings)?;
    println!("{}", knowledge.normalize(sql));
    Ok(())
}

#[cfg(feature = "server")]
async fn cmd_serve(settings: &Settings, host: Option<String>, port: Option<u16>) -> Result<(), String> {
    let pipeline = build_pipeline(settings)?;
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    text2sql::web::serve(pipeline, &host, port)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

#[cfg(not(feature = "server"))]
async fn cmd_serve(_: &Settings, _: Option<String>, _: Option<u16>) -> Result<(), String> {
    Err("This build does not include the HTTP server; rebuild with --features server".to_string())
}

fn cmd_fields(settings: &Settings) -> Result<(), String> {
    let knowledge = load_knowledge(settings)?;
    println!("Table: {}", knowledge.schema.table());
    println!();
    for field in knowledge.schema.fields() {
        println!("  {:<30} {}", field.name, field.description);
    }
    Ok(())
}

fn cmd_explain(settings: &Settings, indicator: &str) -> Result<(), String> {
    let knowledge = load_knowledge(settings)?;
    println!("{}: {}", indicator.trim(), knowledge.indicators.explain(indicator));
    Ok(())
}

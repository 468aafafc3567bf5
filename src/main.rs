// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use dbsnp_mcp::config::API_KEY_ENV;
use dbsnp_mcp::utils::logging::{format_error, format_info, format_success, format_warning};
use dbsnp_mcp::{Config, DbSnpClient, DbSnpMcp, QueryOutcome, SnpQuery};
use rmcp::ServiceExt;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "dbsnp_mcp")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "NCBI dbSNP lookups as MCP tools and from the command line", long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/default.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve SNP data for an rs ID
    Snp {
        rs_id: String,

        #[arg(long)]
        json: bool,
    },

    /// Search dbSNP by term
    Search {
        term: String,

        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Retrieve clinical significance for an rs ID
    Clinical {
        rs_id: String,

        #[arg(long)]
        json: bool,
    },

    /// Start MCP (Model Context Protocol) server for agentic tool integration
    Mcp {
        #[arg(long, default_value = "stdio")]
        transport: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dbsnp_mcp::utils::logging::init_logger(cli.color, cli.verbose);

    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::load(Some(path.as_path())).context("Failed to load configuration")?
        }
        None => Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            let mut config = Config::default_config();
            config.apply_api_key(std::env::var(API_KEY_ENV).ok());
            config
        }),
    };

    if config.ncbi.api_key.is_some() {
        info!(
            "NCBI API key configured ({} requests/s)",
            config.ncbi.allowed_requests_per_second()
        );
    } else {
        info!(
            "Running without NCBI API key ({} requests/s)",
            config.ncbi.allowed_requests_per_second()
        );
    }

    let client = DbSnpClient::new(&config).context("Failed to create dbSNP client")?;

    match cli.command {
        Commands::Snp { rs_id, json } => {
            let query = SnpQuery::by_rs_id(&rs_id);
            cmd_lookup(&client, query, json).await?;
        }
        Commands::Search { term, limit, json } => {
            let query = SnpQuery::search(
                &term,
                limit,
                config.search.default_limit,
                config.search.max_limit,
            );
            cmd_lookup(&client, query, json).await?;
        }
        Commands::Clinical { rs_id, json } => {
            let query = SnpQuery::clinical(&rs_id);
            cmd_lookup(&client, query, json).await?;
        }
        Commands::Mcp { transport } => {
            cmd_mcp(client, &transport).await?;
        }
    }

    Ok(())
}

async fn cmd_lookup(
    client: &DbSnpClient,
    query: dbsnp_mcp::Result<SnpQuery>,
    json: bool,
) -> Result<()> {
    let outcome = match query {
        Ok(query) => client.run(&query).await,
        Err(e) => Err(e),
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            if e.is_rate_limited() {
                eprintln!(
                    "{}",
                    format_warning(&format!(
                        "NCBI is throttling requests; set {} to raise the limit",
                        API_KEY_ENV
                    ))
                );
            }
            return Err(e.into());
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialize result")?
        );
    } else {
        println!("{}", outcome.format_summary());
    }

    match &outcome {
        QueryOutcome::Snp(result) if !result.found => {
            eprintln!("{}", format_info(&format!("{} is not in dbSNP", result.rs_id)));
        }
        QueryOutcome::Search(results) => {
            eprintln!(
                "{}",
                format_success(&format!(
                    "{} of {} matching SNPs returned",
                    results.returned_count(),
                    results.total_count
                ))
            );
        }
        _ => {}
    }

    Ok(())
}

async fn cmd_mcp(client: DbSnpClient, transport: &str) -> Result<()> {
    info!("Starting MCP server (transport: {})", transport);

    if transport != "stdio" {
        error!("Only stdio transport is currently supported");
        return Err(anyhow::anyhow!("Unsupported transport: {}", transport));
    }

    let mcp_server = DbSnpMcp::new(client);

    info!("MCP server ready. Available tools:");
    for tool in mcp_server.get_tool_router().list_all() {
        info!(
            "  - {}: {}",
            tool.name,
            tool.description.as_deref().unwrap_or("No description")
        );
    }

    info!("Starting stdio transport...");
    let service = mcp_server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP server")?;
    service.waiting().await?;

    Ok(())
}

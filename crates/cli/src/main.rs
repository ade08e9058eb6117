//! SQS Listener CLI - Probe a running listener's health endpoints

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_URL: &str = "http://127.0.0.1:8080";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "sqs-listenerctl")]
#[command(about = "SQS Listener CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the listener's health server
    #[arg(long, env = "SQS_LISTENER_URL", default_value = DEFAULT_URL)]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the listener answers on /status
    Status,

    /// Print the version reported on /version
    Version,
}

#[derive(Deserialize)]
struct VersionInfo {
    version: String,
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

async fn get(client: &reqwest::Client, url: &str) -> Result<reqwest::Response> {
    client
        .get(url)
        .send()
        .await
        .context("Failed to connect to listener")?
        .error_for_status()
        .context("Listener returned an error status")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Status => {
            println!("{}", "Listener Status".cyan().bold());
            println!();
            println!("  {} {}", "URL:".bold(), cli.url);

            let outcome = match get(&client, &endpoint(&cli.url, "status")).await {
                Ok(response) => response.text().await.context("Failed to read response"),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(body) if body == "Success" => {
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                }
                Ok(body) => {
                    println!("  {} {}", "Status:".bold(), "DEGRADED".yellow());
                    println!("  {} {}", "Body:".bold(), body);
                    anyhow::bail!("unexpected status body");
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "OFFLINE".red());
                    println!("  {} {:#}", "Error:".bold(), e);
                    anyhow::bail!("listener is not reachable");
                }
            }
        }

        Commands::Version => {
            let info: VersionInfo = get(&client, &endpoint(&cli.url, "version"))
                .await?
                .json()
                .await
                .context("Failed to parse response")?;

            println!("{} {}", "sqs-listener".bold(), info.version.green());
        }
    }

    Ok(())
}

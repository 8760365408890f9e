//! Furnish CLI
//!
//! Command-line interface for Furnish operations:
//! - Log in and mint a token
//! - Inspect users, inventory and reports
//! - Generate the daily report
//! - Download report PDFs and exports

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "furnish")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Furniture business management")]
#[command(
    long_about = "Furnish manages clients, projects, furniture inventory and daily sales reports.\nThe CLI talks to a running Furnish API server."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:5010", global = true)]
    pub api_url: String,

    /// Bearer token (defaults to the FURNISH_TOKEN environment variable)
    #[arg(long, global = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and print a token for later commands
    Login {
        /// Account email
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show server status
    Status,

    /// List user accounts (admin token required)
    Users,

    /// List furniture categories and their items
    Furniture,

    /// Generate today's sales report
    GenerateReport,

    /// Show a report
    Report {
        /// Report date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Download a daily report as PDF
    Pdf {
        /// Report date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Download all report rows
    Export {
        /// Format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let token = cli
        .token
        .clone()
        .or_else(|| std::env::var("FURNISH_TOKEN").ok());

    match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };

            let body = serde_json::json!({ "email": email, "password": password });

            let response = client
                .post(format!("{}/api/v1/users/login", cli.api_url))
                .json(&body)
                .send()
                .await
                .context("Cannot reach the Furnish API")?;

            if !response.status().is_success() {
                return Err(fail(response).await);
            }

            let data: serde_json::Value = response.json().await?;
            println!(
                "Logged in as {} ({})",
                data["user"]["name"].as_str().unwrap_or("-"),
                data["user"]["role"].as_str().unwrap_or("-")
            );
            println!();
            println!("{}", data["token"].as_str().unwrap_or(""));
            println!();
            println!("Export it for later commands:");
            println!("  export FURNISH_TOKEN={}", data["token"].as_str().unwrap_or(""));
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Furnish v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!("Store: {}", health["store"].as_str().unwrap_or("unknown"));
                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Furnish API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Furnish API server is running:");
                    eprintln!("  cargo run --bin furnish");
                    std::process::exit(1);
                }
            }
        }

        Commands::Users => {
            let response = authed(client.get(format!("{}/api/v1/users", cli.api_url)), &token)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(fail(response).await);
            }

            let users: Vec<serde_json::Value> = response.json().await?;

            if users.is_empty() {
                println!("No users yet.");
            } else {
                println!("{:<5} {:<24} {:<30} {:<8}", "ID", "Name", "Email", "Role");
                println!("{}", "-".repeat(70));
                for user in users {
                    println!(
                        "{:<5} {:<24} {:<30} {:<8}",
                        user["id"].as_i64().unwrap_or(0),
                        user["name"].as_str().unwrap_or("-"),
                        user["email"].as_str().unwrap_or("-"),
                        user["role"].as_str().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Furniture => {
            let response = authed(
                client.get(format!("{}/api/v1/furniture", cli.api_url)),
                &token,
            )
            .send()
            .await?;

            if !response.status().is_success() {
                return Err(fail(response).await);
            }

            let data: serde_json::Value = response.json().await?;
            let categories = data["furniture"].as_array().cloned().unwrap_or_default();

            if categories.is_empty() {
                println!("No furniture categories yet.");
            } else {
                for category in categories {
                    println!("{}", category["name"].as_str().unwrap_or("-"));

                    let items = category["items"].as_array().cloned().unwrap_or_default();
                    if items.is_empty() {
                        println!("  (no items)");
                        continue;
                    }

                    for item in items {
                        println!(
                            "  {:<8} {:<28} {:>10} {:>6} in stock",
                            item["item_no"].as_str().unwrap_or("-"),
                            item["name"].as_str().unwrap_or("-"),
                            format!("${:.2}", item["price"].as_f64().unwrap_or(0.0)),
                            item["quantity"].as_i64().unwrap_or(0)
                        );
                    }
                }
            }
        }

        Commands::GenerateReport => {
            let response = authed(
                client.post(format!("{}/api/v1/furniture-reports/generate", cli.api_url)),
                &token,
            )
            .send()
            .await?;

            if !response.status().is_success() {
                return Err(fail(response).await);
            }

            let report: serde_json::Value = response.json().await?;
            println!(
                "Generated report for {} with {} items",
                report["date"].as_str().unwrap_or("-"),
                report["report_items"].as_array().map(|a| a.len()).unwrap_or(0)
            );
            print_report(&report);
        }

        Commands::Report { date } => {
            let url = match &date {
                Some(date) => format!("{}/api/v1/furniture-reports/date/{}", cli.api_url, date),
                None => format!("{}/api/v1/furniture-reports/today", cli.api_url),
            };

            let response = authed(client.get(url), &token).send().await?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                match date {
                    Some(date) => println!("No report found for {}", date),
                    None => println!("No report found for today. Generate one with: furnish-cli generate-report"),
                }
                std::process::exit(1);
            }
            if !response.status().is_success() {
                return Err(fail(response).await);
            }

            let report: serde_json::Value = response.json().await?;
            print_report(&report);
        }

        Commands::Pdf { date, output } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

            let response = authed(
                client.get(format!(
                    "{}/api/v1/furniture-reports/date/{}/pdf",
                    cli.api_url, date
                )),
                &token,
            )
            .send()
            .await?;

            if !response.status().is_success() {
                return Err(fail(response).await);
            }

            let bytes = response.bytes().await?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Cannot write {:?}", output))?;
            println!("Saved report for {} to {:?} ({} bytes)", date, output, bytes.len());
        }

        Commands::Export { format, output } => {
            let response = authed(
                client.get(format!(
                    "{}/api/v1/furniture-reports/export?format={}",
                    cli.api_url, format
                )),
                &token,
            )
            .send()
            .await?;

            if !response.status().is_success() {
                return Err(fail(response).await);
            }

            let data = response.text().await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)?;
                    println!("Exported to {:?}", path);
                }
                None => {
                    print!("{}", data);
                }
            }
        }

        Commands::Config { output } => {
            let config = furnish::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Attach the bearer token when one is available
fn authed(builder: reqwest::RequestBuilder, token: &Option<String>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Turn a failed response into an error carrying the API's message
async fn fail(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or(text);

    anyhow::anyhow!("Request failed ({}): {}", status, message)
}

fn prompt_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .context("Cannot read password")?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

fn print_report(report: &serde_json::Value) {
    println!();
    println!("Furniture Report - {}", report["date"].as_str().unwrap_or("-"));
    println!();
    println!(
        "{:<28} {:<10} {:>8} {:>8} {:>10}",
        "Item", "Item No", "Count", "Sold", "Remaining"
    );
    println!("{}", "-".repeat(68));

    for item in report["report_items"].as_array().cloned().unwrap_or_default() {
        println!(
            "{:<28} {:<10} {:>8} {:>8} {:>10}",
            item["item_name"].as_str().unwrap_or("-"),
            item["item_no"].as_str().unwrap_or("-"),
            item["initial_count"].as_i64().unwrap_or(0),
            item["sold"].as_i64().unwrap_or(0),
            item["remaining"].as_i64().unwrap_or(0)
        );
    }

    if let Some(signature) = report["signature"].as_str() {
        println!();
        println!("Signature: {}", signature);
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

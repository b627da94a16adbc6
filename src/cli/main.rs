use anyhow::Result;
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::json;

#[derive(Parser)]
#[command(name = "triage-cli")]
#[command(about = "Complaint triage CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify complaint text without registering it
    Classify {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Register a complaint
    Submit {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        complaint: String,
    },

    /// Get complaint details by ID or reference
    Get {
        #[arg(value_name = "ID_OR_REF")]
        id: String,
    },

    /// List complaints
    List {
        #[arg(short, long, default_value = "0")]
        page: u32,

        #[arg(short = 's', long, default_value = "20")]
        page_size: u32,

        #[arg(long)]
        status: Option<String>,

        #[arg(short = 'o', long)]
        open_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Classify { text } => {
            let response = client
                .post(format!("{}/v1/classify", cli.endpoint))
                .json(&json!({ "complaint": text }))
                .send()
                .await?;

            print_response(response).await?;
        }

        Commands::Submit { title, complaint } => {
            let response = client
                .post(format!("{}/v1/complaints", cli.endpoint))
                .json(&json!({ "title": title, "complaint": complaint }))
                .send()
                .await?;

            print_response(response).await?;
        }

        Commands::Get { id } => {
            let response = client
                .get(format!("{}/v1/complaints/{}", cli.endpoint, id))
                .send()
                .await?;

            print_response(response).await?;
        }

        Commands::List {
            page,
            page_size,
            status,
            open_only,
        } => {
            let mut query: Vec<(String, String)> = vec![
                ("page".to_string(), page.to_string()),
                ("page_size".to_string(), page_size.to_string()),
            ];
            if let Some(status) = status {
                query.push(("status".to_string(), status));
            }
            if open_only {
                query.push(("open_only".to_string(), "true".to_string()));
            }

            let response = client
                .get(format!("{}/v1/complaints", cli.endpoint))
                .query(&query)
                .send()
                .await?;

            print_response(response).await?;
        }
    }

    Ok(())
}

async fn print_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body: serde_json::Value = response.json().await?;

    if !status.is_success() {
        eprintln!("Request failed ({})", status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}

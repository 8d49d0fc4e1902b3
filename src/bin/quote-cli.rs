use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "quote-cli")]
#[command(about = "Query CLI for the freight quoting service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a shipment
    Quote {
        /// Destination postal code
        cep: String,
        /// Weight in kilograms (decimal comma or point)
        weight: String,
        /// Declared order value for the percentage surcharge
        #[arg(short, long)]
        value: Option<String>,
        /// Pin a service level (e.g. ecm, exp)
        #[arg(short, long)]
        service: Option<String>,
        /// Quote every service that reaches the destination
        #[arg(short, long)]
        all: bool,
    },
    /// Retrieve a previously issued quote by ID
    Get {
        id: String,
    },
    /// Check service health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Quote { cep, weight, value, service, all } => {
            let endpoint = if all { "/api/quotes" } else { "/api/quote" };
            let mut params = vec![("cep", cep), ("weight", weight)];
            if let Some(value) = value {
                params.push(("value", value));
            }
            if let Some(service) = service {
                params.push(("service", service));
            }

            let res = client.get(format!("{}{}", cli.url, endpoint))
                .query(&params)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { id } => {
            let res = client.get(format!("{}/api/quote/{}", cli.url, id))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Management CLI for the host router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check router status
    Status,
    /// List registered hosts and their health
    Hosts,
    /// Add a host to the pool
    Register { address: String },
    /// Remove a host from the pool
    Deregister { address: String },
    /// Send a JSON payload through POST /routejson
    Route { payload: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", base)).send().await?,
        Commands::Hosts => client.get(format!("{}/hosts", base)).send().await?,
        Commands::Register { address } => {
            client
                .post(format!("{}/registerhost", base))
                .json(&json!({ "HostAddress": address }))
                .send()
                .await?
        }
        Commands::Deregister { address } => {
            client
                .post(format!("{}/deregisterhost", base))
                .json(&json!({ "HostAddress": address }))
                .send()
                .await?
        }
        Commands::Route { payload } => {
            let body: Value = serde_json::from_str(&payload)?;
            client
                .post(format!("{}/routejson", base))
                .json(&body)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or(text);

    if status.is_success() {
        println!("{}", rendered);
        Ok(())
    } else {
        eprintln!("Error: router returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
}

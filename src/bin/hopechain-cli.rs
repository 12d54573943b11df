use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "hopechain-cli")]
#[command(about = "Command-line client for the HopeChain donation service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether a wallet is connected
    Status,
    /// Request wallet access and remember the address
    Connect,
    /// Forget the connected address
    Disconnect,
    /// Show the connected address and donation statistics
    Stats,
    /// Donate XLM from the connected wallet
    Donate {
        /// Amount in XLM, e.g. 5 or 0.5
        #[arg(short, long)]
        amount: String,
        /// Recipient account (G...)
        #[arg(short, long)]
        to: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/api/session", base)).send().await?,
        Commands::Connect => client.post(format!("{}/api/connect", base)).send().await?,
        Commands::Disconnect => client.post(format!("{}/api/disconnect", base)).send().await?,
        Commands::Stats => client.get(format!("{}/api/stats", base)).send().await?,
        Commands::Donate { amount, to } => {
            client
                .post(format!("{}/api/donate", base))
                .json(&json!({ "amount": amount, "recipient": to }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(text);
        eprintln!("Error ({}): {}", status, message);
        std::process::exit(1);
    }

    if text.trim().is_empty() {
        println!("OK");
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

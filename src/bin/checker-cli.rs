use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "checker-cli")]
#[command(about = "Query a running sre-checker status feed", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current verdict of every channel
    Status,
    /// Print the raw RSS feed
    Rss,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/status", base)).send().await?;
            if let Some(res) = check_status(res).await {
                let json: Value = res.json().await?;
                print_status(&json);
            }
        }
        Commands::Rss => {
            let res = client.get(format!("{}/rss", base)).send().await?;
            if let Some(res) = check_status(res).await {
                println!("{}", res.text().await?);
            }
        }
    }

    Ok(())
}

async fn check_status(res: reqwest::Response) -> Option<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Some(res);
    }
    eprintln!("Error: feed server returned status {}", status);
    if let Ok(text) = res.text().await {
        eprintln!("Response: {}", text);
    }
    None
}

fn print_status(json: &Value) {
    let Some(channels) = json.get("channels").and_then(Value::as_array) else {
        println!("{}", serde_json::to_string_pretty(json).unwrap_or_default());
        return;
    };

    for entry in channels {
        let channel = entry.get("channel").and_then(Value::as_str).unwrap_or("?");
        let verdict = entry.get("verdict").and_then(Value::as_str).unwrap_or("?");
        let since = entry.get("since").and_then(Value::as_str).unwrap_or("-");
        println!("{:<12} {:<8} {}", channel, verdict, since);
    }
}

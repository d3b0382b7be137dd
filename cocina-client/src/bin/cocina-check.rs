use anyhow::Result;
use clap::Parser;

/// Check that a server is up and healthy
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// URL of the server to check
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let client = reqwest::Client::new();

    println!("Checking health of {}...", args.server);

    let url = format!("{}/api/health", args.server.trim_end_matches('/'));
    let resp = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("\nError connecting to server!");
            eprintln!("URL: {url}");
            if args.server.starts_with("https://localhost")
                || args.server.starts_with("https://127.0.0.1")
            {
                eprintln!("\nHint: Local dev servers typically use HTTP, not HTTPS.");
                eprintln!("Try: cargo run --bin cocina-check -- --server http://localhost:3000");
            }
            return Err(e.into());
        }
    };

    let status = resp.status();
    println!("Status: {status}");

    if status.is_success() {
        let body: serde_json::Value = resp.json().await?;
        println!("\nServer is {}", body["status"].as_str().unwrap_or("responding"));
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        let body = resp.text().await?;
        println!("\nHealth check failed!");
        println!("{body}");
        std::process::exit(1);
    }

    Ok(())
}

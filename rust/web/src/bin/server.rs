//! Standalone Kuhn Poker server
//!
//! Usage: cargo run -p kuhn_web --bin kuhn-web-server -- --port 3001

use clap::Parser;
use kuhn_web::{init_logging, ServerSettings, WebServer};

#[derive(Parser, Debug)]
#[command(name = "kuhn-web-server", version, about = "Real-time Kuhn Poker server")]
struct Args {
    /// Host to bind to
    #[arg(long)]
    host: Option<String>,
    /// Port to bind to
    #[arg(long, short = 'p')]
    port: Option<u16>,
    /// Seed for the dealer and the AI
    #[arg(long)]
    seed: Option<u64>,
    /// AI opponent type
    #[arg(long)]
    ai: Option<String>,
    /// Log one JSON object per line
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut settings = ServerSettings::load()?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(ai) = args.ai {
        settings.ai = ai;
    }
    settings.log_json |= args.log_json;
    settings.validate()?;

    init_logging(settings.log_json)?;
    tracing::info!(
        host = %settings.host,
        port = settings.port,
        ai = %settings.ai,
        seeded = settings.seed.is_some(),
        "starting Kuhn Poker server"
    );

    let handle = WebServer::new(settings)?.start().await?;
    tracing::info!("server running at http://{}", handle.address());

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down server");
    handle.shutdown().await?;
    Ok(())
}

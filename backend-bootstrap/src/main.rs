use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "warlog-backend")]
#[command(about = "Warlog telemetry backend", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// Use in-memory storage regardless of the config file
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var("WARLOG_CONFIG", config);
    }
    if args.memory {
        std::env::set_var("WARLOG_STORAGE", "memory");
    }

    backend_bootstrap::run().await
}

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use mavix::core::config;

#[derive(Parser)]
#[command(name = "mavix", about = "Terminal client for the Mavix assistant")]
struct Args {
    /// Backend base URL (overrides config file and MAVIX_BACKEND_URL)
    #[arg(short, long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to mavix.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("mavix.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Warning: {e}; continuing with defaults");
        Default::default()
    });
    let resolved = config::resolve(&file_config, args.backend_url.as_deref());

    log::info!("Mavix starting up against {}", resolved.base_url);

    mavix::tui::run(resolved)
}

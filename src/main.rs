use std::process;
use std::sync::Arc;

use data_waster::config::{CONFIG_PATH_VAR, WasterConfig};
use data_waster::host::{SharedDeviceInfo, spawn_collector};
use data_waster::source::HttpByteSource;
use data_waster::terminal::Terminal;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Defaults, then the optional config file, then environment overrides
    let config = match WasterConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let source = match HttpByteSource::new(&config.endpoints) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            process::exit(1);
        }
    };

    // Device info fills in the background while the console is already usable
    let device = Arc::new(SharedDeviceInfo::default());
    let _collector = spawn_collector(
        Arc::clone(&device),
        source.client().clone(),
        config.endpoints.ip_lookup_url.clone(),
    );

    let mut terminal = Terminal::new(Arc::new(source), config, device);
    if let Err(e) = terminal.run_interactive().await {
        eprintln!("Terminal error: {}", e);
        process::exit(1);
    }
}

fn print_usage() {
    println!("Data Waster");
    println!("Configuration file (optional):");
    println!("  data-waster.toml, or the path in {}", CONFIG_PATH_VAR);
    println!("Environment Variables:");
    println!("  DATA_WASTER__ENDPOINTS__DOWNLOAD_URL=https://speed.cloudflare.com/__down");
    println!("  DATA_WASTER__TRANSFER__RETRY_BACKOFF_MS=1000");
    println!("  DATA_WASTER__CONSOLE__SPEEDTEST_DURATION_SECS=10");
    println!("  RUST_LOG=info");
}

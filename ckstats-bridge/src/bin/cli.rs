//! Command-line interface for the ckstats bridge.
//!
//! This binary provides a CLI for inspecting the bridge daemon via its
//! HTTP API.

use std::env;

use anyhow::Result;

use ckstats_bridge::api_client;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: ckbridge <command>");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  status    Show bridge and pool status");
        eprintln!("  sensors   List all sensor states");
        eprintln!("  refresh   Trigger an immediate poll cycle");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  CKBRIDGE_API_URL    API base URL (default: http://127.0.0.1:7790)");
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "status" => cmd_status().await?,
        "sensors" => cmd_sensors().await?,
        "refresh" => cmd_refresh().await?,
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build an API client, honoring CKBRIDGE_API_URL if set.
fn make_client() -> api_client::Client {
    match env::var("CKBRIDGE_API_URL") {
        Ok(url) => api_client::Client::with_base_url(url),
        Err(_) => api_client::Client::new(),
    }
}

/// Print a summary of the bridge and pool state.
async fn cmd_status() -> Result<()> {
    let client = make_client();
    let bridge = client.get_bridge().await?;

    println!("Pool:    {}:{}", bridge.pool_host, bridge.pool_port);
    println!("Uptime:  {} s", bridge.uptime_secs);
    println!("Poll:    every {} s", bridge.poll_interval_secs);
    println!(
        "Pool data: {}",
        if bridge.pool_available { "available" } else { "unavailable" }
    );
    println!(
        "User data: {}",
        if bridge.user_available { "available" } else { "absent" }
    );

    Ok(())
}

/// Print every sensor's current value.
async fn cmd_sensors() -> Result<()> {
    let client = make_client();
    let sensors = client.get_sensors().await?;

    for sensor in sensors {
        let value = match sensor.value {
            Some(value) => value.to_string(),
            None => "(unavailable)".to_string(),
        };
        println!("{:36} {}", sensor.id, value);
    }

    Ok(())
}

/// Trigger a refresh and report its outcome.
async fn cmd_refresh() -> Result<()> {
    let client = make_client();
    let response = client.refresh().await?;
    println!("Refresh: {}", response.outcome);
    Ok(())
}

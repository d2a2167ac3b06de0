// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 iOS Tunnel Manager Contributors

// iOS Tunnel Manager - CLI
// Command-line interface for the privileged device tunnel

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use ios_tunnel_common::TunnelConfig;
use ios_tunnel_core::{default_elevator, Launcher, StopOutcome, Terminator};

#[derive(Parser)]
#[command(name = "ios-tunnel")]
#[command(about = "Manage the privileged tunnel to a locked-down iOS device", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the tunnel and wait for its RSD endpoint
    Start {
        /// Seconds to wait for the endpoint announcement
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output the endpoint as JSON for scripting
        #[arg(short, long)]
        json: bool,
    },

    /// Stop the tunnel recorded in the pid file
    Stop,

    /// Show the recorded tunnel state
    Status {
        /// Output as JSON for scripting
        #[arg(short, long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; tunnel tool output is forwarded under the
    // `tunnel` target at info level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = TunnelConfig::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Start { timeout, json } => start_tunnel(config, timeout, json).await,
        Commands::Stop => stop_tunnel(config).await,
        Commands::Status { json } => show_status(config, json),
        Commands::Config { action } => match action {
            ConfigCommands::Show => show_config(config),
            ConfigCommands::Path => {
                println!("{}", TunnelConfig::config_path()?.display());
                Ok(())
            }
        },
    }
}

async fn start_tunnel(config: TunnelConfig, timeout: Option<u64>, json: bool) -> Result<()> {
    let timeout = Duration::from_secs(timeout.unwrap_or(config.start_timeout_secs));
    let launcher = Launcher::new(config, default_elevator());

    if !json {
        println!("Starting tunnel (waiting up to {:?})...", timeout);
    }

    let (handle, endpoint) = launcher
        .start(timeout)
        .await
        .context("Failed to start tunnel")?;

    if json {
        println!("{}", serde_json::to_string(&endpoint)?);
    } else {
        println!("{} Tunnel established", "✓".green());
        println!("  RSD address: {}", endpoint.address.bold());
        println!("  RSD port:    {}", endpoint.port.to_string().bold());
        if let Some(pid) = handle.record().pid {
            println!("  Pid:         {}", pid);
        }
        println!(
            "\nThe tunnel keeps running in the background. Stop it with {}.",
            "ios-tunnel stop".cyan()
        );
    }

    Ok(())
}

async fn stop_tunnel(config: TunnelConfig) -> Result<()> {
    let terminator = Terminator::new(config.pid_path, default_elevator());

    match terminator.stop().await {
        Ok(StopOutcome::AlreadyStopped) => {
            println!("{} No tunnel is recorded; nothing to stop", "✓".green());
            Ok(())
        }
        Ok(StopOutcome::Requested) => {
            println!("{} Tunnel termination requested", "✓".green());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            Err(e.into())
        }
    }
}

fn show_status(config: TunnelConfig, json: bool) -> Result<()> {
    let recorded_pid = match std::fs::read_to_string(&config.pid_path) {
        Ok(raw) => raw.trim().parse::<u32>().ok(),
        Err(_) => None,
    };
    let pid_file_present = config.pid_path.exists();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "pid_file": config.pid_path,
                "pid_file_present": pid_file_present,
                "recorded_pid": recorded_pid,
                "log_file": config.log_path,
            })
        );
        return Ok(());
    }

    if !pid_file_present {
        println!("{}", "No tunnel recorded (no pid file)".yellow());
        return Ok(());
    }

    match recorded_pid {
        // Recorded only: liveness is never probed against the OS.
        Some(pid) => println!("Tunnel recorded with pid {}", pid.to_string().bold()),
        None => println!(
            "{} Pid file {} exists but does not contain a valid pid",
            "!".yellow(),
            config.pid_path.display()
        ),
    }
    println!("  Log file: {}", config.log_path.display());

    Ok(())
}

fn show_config(config: TunnelConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

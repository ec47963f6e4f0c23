// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>
//!
//! haystack: command-line access to a Haystack controller.
//!
//! Connection settings come from the environment (`DEPLOYMENT_MODE`,
//! `NIAGARA_HOST`, `RELAY_URL`, ...); `--mode` overrides the deployment mode
//! for one invocation. Results are printed to stdout as JSON, logs go to
//! stderr and are filtered with `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use haystack_client::{
    ConnectionConfig, DeploymentMode, HaystackClient, Params, DEFAULT_WRITE_LEVEL,
};

/// Version string, pulled from Cargo.toml at compile time.
const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

/// Query and command a Haystack controller directly or through a relay.
#[derive(Parser, Debug)]
#[command(
    name = "haystack",
    version = VERSION,
    about = "Haystack client for building-automation controllers"
)]
struct Cli {
    /// Deployment mode for this invocation: local, relay or hybrid.
    #[arg(long, global = true)]
    mode: Option<DeploymentMode>,

    /// Print single-line JSON instead of pretty-printed output.
    #[arg(long, global = true)]
    compact: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the server and show how the client is connected.
    Info,
    /// Show server identity.
    About,
    /// List supported operations.
    Ops,
    /// Read points matching a filter.
    Read {
        filter: String,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Run a filter and print the raw rows.
    Filter {
        filter: String,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Read the history of a point.
    History {
        point_id: String,
        /// `today`, `yesterday`, a date, or `start,end`.
        #[arg(long, default_value = "today")]
        range: String,
    },
    /// Write a value to a point. The value is parsed as JSON, falling back
    /// to a string; `null` releases the level.
    Write {
        point_id: String,
        value: String,
        #[arg(long, default_value_t = DEFAULT_WRITE_LEVEL)]
        level: u8,
        /// Override duration in minutes.
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Browse the navigation tree.
    Nav { nav_id: Option<String> },
    /// List alarms.
    Alarms {
        #[arg(long, default_value = "alarm")]
        filter: String,
        /// Only unacknowledged alarms.
        #[arg(long)]
        unacked: bool,
    },
    /// List equipment with a preview of their points.
    Equip {
        #[arg(long, default_value = "equip")]
        filter: String,
        #[arg(long)]
        no_points: bool,
    },
    /// Open a watch.
    WatchSub {
        filter: String,
        #[arg(long, default_value_t = 5)]
        lease: u32,
    },
    /// Poll a watch for changes.
    WatchPoll { watch_id: String },
    /// Close a watch.
    WatchUnsub { watch_id: String },
    /// Read several points by id.
    Batch {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Show common filter expressions.
    Presets,
    /// Run any operation with `key=value` parameters and print the grid.
    Op {
        name: String,
        #[arg(value_parser = parse_param)]
        params: Vec<(String, Value)>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = ConnectionConfig::from_env();
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    info!(
        mode = %config.mode,
        controller = %format!("{}:{}", config.host, config.port),
        relay = config.relay_url.as_deref().unwrap_or("none"),
        "Starting Haystack client"
    );
    if config.mode != DeploymentMode::Local && config.relay_url.is_none() {
        tracing::warn!("{} mode without RELAY_URL, requests go to the controller", config.mode);
    }

    let client = HaystackClient::new(config).context("invalid connection configuration")?;
    run(&client, cli.command, cli.compact).await
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(client: &HaystackClient, command: Command, compact: bool) -> Result<()> {
    match command {
        Command::Info => print(&client.connection_info().await, compact),
        Command::About => print(&client.about().await?, compact),
        Command::Ops => print(&client.ops().await?, compact),
        Command::Read { filter, limit } => {
            print(&client.read_points(&filter, Some(limit)).await?, compact)
        }
        Command::Filter { filter, limit } => {
            print(&client.custom_filter(&filter, limit).await?, compact)
        }
        Command::History { point_id, range } => {
            print(&client.read_history(&point_id, &range).await?, compact)
        }
        Command::Write {
            point_id,
            value,
            level,
            duration,
        } => {
            let ack = client
                .write_point(&point_id, parse_value(&value), level, duration)
                .await?;
            print(&ack, compact)
        }
        Command::Nav { nav_id } => print(&client.nav(nav_id.as_deref()).await?, compact),
        Command::Alarms { filter, unacked } => {
            print(&client.alarms(&filter, !unacked).await?, compact)
        }
        Command::Equip { filter, no_points } => {
            print(&client.equipment(&filter, !no_points).await?, compact)
        }
        Command::WatchSub { filter, lease } => {
            print(&client.watch_subscribe(&filter, lease).await?, compact)
        }
        Command::WatchPoll { watch_id } => print(&client.watch_poll(&watch_id).await?, compact),
        Command::WatchUnsub { watch_id } => {
            client.watch_unsubscribe(&watch_id).await?;
            print(&serde_json::json!({"watchId": watch_id, "closed": true}), compact)
        }
        Command::Batch { ids } => print(&client.batch_read(ids.as_slice()).await?, compact),
        Command::Presets => print(&HaystackClient::filter_presets(), compact),
        Command::Op { name, params } => {
            let params: Params = params.into_iter().collect();
            let params = (!params.is_empty()).then_some(params);
            print(&client.execute_operation(&name, params.as_ref()).await?, compact)
        }
    }
}

fn print<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

/// Parse a command-line value as JSON, keeping it as a string otherwise.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parse `key=value`; the value goes through [`parse_value`].
fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in `{raw}`"));
    }
    Ok((key.to_string(), parse_value(value)))
}

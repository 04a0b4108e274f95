//! securecloud - command-line client for the SecureCloud API.
//!
//! A thin wrapper over `securecloud-client`: session management, read and
//! update commands for the REST resources, and a `watch` command that
//! follows the realtime channel.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{alerts, auth, dashboard, firewall, network, system, threats, users, watch};
use session::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let ctx = Context::new(cli.endpoint, cli.json);

    match cli.command {
        Commands::Auth(cmd) => auth::handle(cmd, &ctx).await,
        Commands::Alerts(cmd) => alerts::handle(cmd, &ctx).await,
        Commands::Threats(cmd) => threats::handle(cmd, &ctx).await,
        Commands::Firewall(cmd) => firewall::handle(cmd, &ctx).await,
        Commands::Network(cmd) => network::handle(cmd, &ctx).await,
        Commands::Dashboard(cmd) => dashboard::handle(cmd, &ctx).await,
        Commands::System(cmd) => system::handle(cmd, &ctx).await,
        Commands::Users(cmd) => users::handle(cmd, &ctx).await,
        Commands::Watch(args) => watch::run(args, &ctx).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays machine-readable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

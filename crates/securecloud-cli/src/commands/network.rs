//! Network subcommands.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct NetworkCommand {
    #[command(subcommand)]
    pub command: NetworkSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum NetworkSubcommand {
    /// List network interfaces
    Interfaces,
}

pub async fn handle(cmd: NetworkCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        NetworkSubcommand::Interfaces => interfaces(ctx).await,
    }
}

async fn interfaces(ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let interfaces = client
        .network()
        .interfaces()
        .await
        .context("Failed to list network interfaces")?;

    if interfaces.is_empty() {
        eprintln!("{}", "No network interfaces.".dimmed());
        return Ok(());
    }

    for iface in &interfaces {
        if ctx.json {
            output::json(iface)?;
            continue;
        }

        let status = match iface.status.as_str() {
            "up" | "active" => iface.status.green(),
            "down" | "inactive" => iface.status.red(),
            other => other.normal(),
        };
        let monitoring = if iface.monitoring { "monitored" } else { "" };
        println!(
            "{} {} {} {} {}",
            iface.id.dimmed(),
            iface.name,
            iface.ip_address,
            status,
            monitoring.cyan()
        );
    }

    Ok(())
}

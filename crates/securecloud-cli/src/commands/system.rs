//! System subcommands.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use securecloud_core::models::HealthStatus;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct SystemCommand {
    #[command(subcommand)]
    pub command: SystemSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SystemSubcommand {
    /// Show overall and per-service health
    Health,
}

pub async fn handle(cmd: SystemCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        SystemSubcommand::Health => health(ctx).await,
    }
}

async fn health(ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let health = client
        .system()
        .health()
        .await
        .context("Failed to fetch system health")?;

    if ctx.json {
        return output::json_pretty(&health);
    }

    let status = health.status.as_str().to_uppercase();
    let status = match health.status {
        HealthStatus::Healthy => status.green(),
        HealthStatus::Degraded => status.yellow(),
        HealthStatus::Critical => status.red().bold(),
    };
    println!("{}: {}", "Status".dimmed(), status);
    output::field("Uptime", &format!("{}s", health.uptime));
    output::field("Open alerts", &health.alerts.to_string());

    if !health.services.is_empty() {
        println!();
        for service in &health.services {
            println!(
                "  {:<24} {} {}",
                service.name,
                service.status,
                format!("{:.0}ms", service.response_time).dimmed()
            );
        }
    }

    Ok(())
}

//! Dashboard subcommands.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct DashboardCommand {
    #[command(subcommand)]
    pub command: DashboardSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum DashboardSubcommand {
    /// Show headline statistics
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Time range understood by the server, e.g. "24h" or "7d"
    #[arg(long)]
    pub time_range: Option<String>,
}

pub async fn handle(cmd: DashboardCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        DashboardSubcommand::Stats(args) => stats(args, ctx).await,
    }
}

async fn stats(args: StatsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let stats = client
        .dashboard()
        .stats(args.time_range.as_deref())
        .await
        .context("Failed to fetch dashboard stats")?;

    if ctx.json {
        return output::json_pretty(&stats);
    }

    output::field("Total alerts", &stats.total_alerts.to_string());
    output::field("Critical alerts", &stats.critical_alerts.to_string());
    output::field("Active threats", &stats.active_threats.to_string());
    output::field("Blocked connections", &stats.blocked_connections.to_string());
    output::field(
        "Traffic",
        &format!(
            "{} in / {} out",
            stats.network_traffic.inbound, stats.network_traffic.outbound
        ),
    );

    Ok(())
}

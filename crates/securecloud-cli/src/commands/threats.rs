//! Threat subcommands.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;

use securecloud_core::models::{FilterOptions, Threat};

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct ThreatsCommand {
    #[command(subcommand)]
    pub command: ThreatsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ThreatsSubcommand {
    /// List threats
    List(ListArgs),

    /// Show the most active threats
    Top(TopArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Threats per page
    #[arg(long, default_value_t = 20)]
    pub page_size: u32,
}

#[derive(Args, Debug)]
pub struct TopArgs {
    /// Number of threats to show
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

pub async fn handle(cmd: ThreatsCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        ThreatsSubcommand::List(args) => list(args, ctx).await,
        ThreatsSubcommand::Top(args) => top(args, ctx).await,
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let page = client
        .threats()
        .list(&FilterOptions::page(args.page, args.page_size))
        .await
        .context("Failed to list threats")?;

    print_threats(&page.data, ctx)?;
    if !ctx.json && !page.data.is_empty() {
        output::page_footer(&page);
    }

    Ok(())
}

async fn top(args: TopArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let threats = client
        .threats()
        .top(args.limit)
        .await
        .context("Failed to fetch top threats")?;

    print_threats(&threats, ctx)
}

fn print_threats(threats: &[Threat], ctx: &Context) -> Result<()> {
    if threats.is_empty() {
        eprintln!("{}", "No threats found.".dimmed());
        return Ok(());
    }

    let now = Utc::now();
    for threat in threats {
        if ctx.json {
            output::json(threat)?;
            continue;
        }
        println!(
            "{:<9} {} {} {}",
            output::alert_severity(threat.severity),
            threat.id.dimmed(),
            threat.name,
            format!(
                "x{} last seen {}",
                threat.occurrences,
                ago(threat.last_seen, now)
            )
            .dimmed()
        );
    }

    Ok(())
}

/// Coarse relative time, e.g. "5m ago".
fn ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_ago_buckets() {
        let now = Utc::now();
        assert_eq!(ago(now - Duration::seconds(5), now), "just now");
        assert_eq!(ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(ago(now - Duration::days(2), now), "2d ago");
    }
}

//! Alert subcommands.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;

use securecloud_core::models::{Alert, AlertSeverity, AlertStatus, FilterOptions};

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct AlertsCommand {
    #[command(subcommand)]
    pub command: AlertsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AlertsSubcommand {
    /// List alerts
    List(ListArgs),

    /// Show one alert
    Get(GetArgs),

    /// Mark an alert resolved
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Alerts per page
    #[arg(long, default_value_t = 20)]
    pub page_size: u32,

    /// Only these severities (repeatable)
    #[arg(long, value_enum)]
    pub severity: Vec<SeverityArg>,

    /// Only these statuses (repeatable)
    #[arg(long, value_enum)]
    pub status: Vec<StatusArg>,

    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Alert ID
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Alert ID
    pub id: String,

    /// How the alert was resolved
    #[arg(long)]
    pub resolution: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SeverityArg {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl From<SeverityArg> for AlertSeverity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Critical => AlertSeverity::Critical,
            SeverityArg::High => AlertSeverity::High,
            SeverityArg::Medium => AlertSeverity::Medium,
            SeverityArg::Low => AlertSeverity::Low,
            SeverityArg::Info => AlertSeverity::Info,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StatusArg {
    New,
    Investigating,
    Resolved,
    FalsePositive,
    Ignored,
}

impl From<StatusArg> for AlertStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::New => AlertStatus::New,
            StatusArg::Investigating => AlertStatus::Investigating,
            StatusArg::Resolved => AlertStatus::Resolved,
            StatusArg::FalsePositive => AlertStatus::FalsePositive,
            StatusArg::Ignored => AlertStatus::Ignored,
        }
    }
}

pub async fn handle(cmd: AlertsCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        AlertsSubcommand::List(args) => list(args, ctx).await,
        AlertsSubcommand::Get(args) => get(args, ctx).await,
        AlertsSubcommand::Resolve(args) => resolve(args, ctx).await,
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let filters = FilterOptions {
        search: args.search,
        severity: args.severity.into_iter().map(Into::into).collect(),
        status: args.status.into_iter().map(Into::into).collect(),
        ..FilterOptions::page(args.page, args.page_size)
    };

    let page = client
        .alerts()
        .list(&filters)
        .await
        .context("Failed to list alerts")?;

    if page.data.is_empty() {
        eprintln!("{}", "No alerts found.".dimmed());
        return Ok(());
    }

    for alert in &page.data {
        if ctx.json {
            output::json(alert)?;
        } else {
            print_line(alert);
        }
    }

    if !ctx.json {
        output::page_footer(&page);
    }

    Ok(())
}

async fn get(args: GetArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let alert = client
        .alerts()
        .get(&args.id)
        .await
        .context("Failed to fetch alert")?;

    if ctx.json {
        return output::json_pretty(&alert);
    }

    print_detail(&alert);
    Ok(())
}

async fn resolve(args: ResolveArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let alert = client
        .alerts()
        .resolve(&args.id, &args.resolution)
        .await
        .context("Failed to resolve alert")?;

    if ctx.json {
        return output::json(&alert);
    }

    output::success(&format!("Alert {} resolved", alert.id));
    Ok(())
}

fn print_line(alert: &Alert) {
    println!(
        "{:<9} {} {} {}",
        output::alert_severity(alert.severity),
        alert.id.dimmed(),
        alert.title,
        format!("[{}]", alert.status.as_str()).dimmed()
    );
}

fn print_detail(alert: &Alert) {
    output::field("ID", &alert.id);
    output::field("Title", &alert.title);
    println!(
        "{}: {}",
        "Severity".dimmed(),
        output::alert_severity(alert.severity)
    );
    output::field("Status", alert.status.as_str());
    output::field("Source", &alert.source_ip);
    if let Some(destination) = &alert.destination_ip {
        output::field("Destination", destination);
    }
    output::field("Seen", &alert.timestamp.to_rfc3339());
    output::field("Threat score", &format!("{:.1}", alert.threat_score));
    if let Some(assignee) = &alert.assigned_to {
        output::field("Assigned to", assignee);
    }
    if !alert.description.is_empty() {
        println!();
        println!("{}", alert.description);
    }
    for recommendation in &alert.recommendations {
        println!("  - {}", recommendation);
    }
}

//! Firewall subcommands.

use anyhow::{Context as _, Result};
use clap::{ArgAction, Args, Subcommand};
use colored::Colorize;

use securecloud_core::models::{FilterOptions, FirewallRule, RuleAction};

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct FirewallCommand {
    #[command(subcommand)]
    pub command: FirewallSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum FirewallSubcommand {
    /// List firewall rules
    Rules(RulesArgs),

    /// Enable or disable a rule
    Toggle(ToggleArgs),

    /// Remove an IP address from the block list
    Unblock(UnblockArgs),
}

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Rules per page
    #[arg(long, default_value_t = 50)]
    pub page_size: u32,
}

#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Rule ID
    pub id: String,

    /// New state of the rule
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub enabled: bool,
}

#[derive(Args, Debug)]
pub struct UnblockArgs {
    /// IP address to unblock
    pub ip: String,
}

pub async fn handle(cmd: FirewallCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        FirewallSubcommand::Rules(args) => rules(args, ctx).await,
        FirewallSubcommand::Toggle(args) => toggle(args, ctx).await,
        FirewallSubcommand::Unblock(args) => unblock(args, ctx).await,
    }
}

async fn rules(args: RulesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let page = client
        .firewall()
        .rules(&FilterOptions::page(args.page, args.page_size))
        .await
        .context("Failed to list firewall rules")?;

    if page.data.is_empty() {
        eprintln!("{}", "No firewall rules.".dimmed());
        return Ok(());
    }

    for rule in &page.data {
        if ctx.json {
            output::json(rule)?;
        } else {
            print_rule(rule);
        }
    }

    if !ctx.json {
        output::page_footer(&page);
    }

    Ok(())
}

async fn toggle(args: ToggleArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let rule = client
        .firewall()
        .toggle(&args.id, args.enabled)
        .await
        .context("Failed to toggle firewall rule")?;

    if ctx.json {
        return output::json(&rule);
    }

    let state = if rule.enabled { "enabled" } else { "disabled" };
    output::success(&format!("Rule '{}' {}", rule.name, state));
    Ok(())
}

async fn unblock(args: UnblockArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    client
        .firewall()
        .unblock(&args.ip)
        .await
        .context("Failed to unblock address")?;

    output::success(&format!("Unblocked {}", args.ip));
    Ok(())
}

fn print_rule(rule: &FirewallRule) {
    let action = match rule.action {
        RuleAction::Allow => "ALLOW".green(),
        RuleAction::Deny => "DENY".red(),
        RuleAction::Log => "LOG".blue(),
    };
    let name = if rule.enabled {
        rule.name.normal()
    } else {
        format!("{} (disabled)", rule.name).dimmed()
    };

    println!(
        "{:>4} {:<5} {} {} {}",
        rule.priority,
        action,
        rule.id.dimmed(),
        name,
        format!(
            "{} {} -> {}",
            rule.protocol,
            rule.source_ip.as_deref().unwrap_or("*"),
            rule.destination_ip.as_deref().unwrap_or("*")
        )
        .dimmed()
    );
}

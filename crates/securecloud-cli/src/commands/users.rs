//! User subcommands.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use securecloud_core::models::FilterOptions;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct UsersCommand {
    #[command(subcommand)]
    pub command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersSubcommand {
    /// List user accounts
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Users per page
    #[arg(long, default_value_t = 20)]
    pub page_size: u32,
}

pub async fn handle(cmd: UsersCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        UsersSubcommand::List(args) => list(args, ctx).await,
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let page = client
        .users()
        .list(&FilterOptions::page(args.page, args.page_size))
        .await
        .context("Failed to list users")?;

    if page.data.is_empty() {
        eprintln!("{}", "No users found.".dimmed());
        return Ok(());
    }

    for user in &page.data {
        if ctx.json {
            output::json(user)?;
        } else {
            println!(
                "{} {} <{}> {}",
                user.id.dimmed(),
                user.name,
                user.email,
                user.role.as_str().cyan()
            );
        }
    }

    if !ctx.json {
        output::page_footer(&page);
    }

    Ok(())
}

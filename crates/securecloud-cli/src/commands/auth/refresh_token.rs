//! Refresh token command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    eprintln!("{}", "Refreshing session...".dimmed());

    // New tokens are written through to the session file.
    client
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    Ok(())
}

//! Logout command implementation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    if !client.is_authenticated() {
        eprintln!("{}", "No active session.".dimmed());
        return Ok(());
    }

    client.logout().await;

    output::success("Logged out");
    Ok(())
}

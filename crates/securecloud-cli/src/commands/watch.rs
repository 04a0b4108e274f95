//! Watch command implementation.

use anyhow::{Context as _, Result, bail};
use clap::Args;
use colored::Colorize;
use futures_util::StreamExt;

use securecloud_client::{ChannelEvent, ConnectionState, SecureCloud};
use securecloud_core::events::Frame;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Also print every raw event received from the server
    #[arg(long)]
    pub raw: bool,

    /// Refetch and print dashboard stats when the server says they changed
    #[arg(long)]
    pub stats: bool,
}

pub async fn run(args: WatchArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;
    let channel = client.realtime();

    // Subscribe first so the connect notification is not missed.
    let mut events = channel.events();
    channel
        .enable()
        .await
        .context("Failed to start real-time updates")?;

    eprintln!("{}", "Watching real-time updates...".dimmed());
    eprintln!("{}", "Press Ctrl+C to stop.".dimmed());
    eprintln!();

    let mut gave_up = false;

    loop {
        let event = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                channel.disable().await;
                return Ok(());
            }
            event = events.next() => event,
        };

        let Some(event) = event else {
            bail!("Real-time event stream closed");
        };

        match event {
            ChannelEvent::Notification(n) => {
                if ctx.json {
                    output::json(&n)?;
                } else {
                    output::notification(&n);
                }
                // The give-up notice directly follows the transition to failed.
                if gave_up {
                    bail!("Real-time updates unavailable");
                }
            }
            ChannelEvent::StateChanged(ConnectionState::Failed) => {
                output::error("Reconnection attempts exhausted");
                gave_up = true;
            }
            ChannelEvent::StateChanged(ConnectionState::Disconnected) => {
                bail!("Session ended. Run 'securecloud auth login' to start a new one.");
            }
            ChannelEvent::StateChanged(state) => {
                tracing::debug!(%state, "Connection state changed");
            }
            ChannelEvent::Received(frame) if args.raw => print_raw(&frame)?,
            ChannelEvent::Received(_) => {}
            ChannelEvent::StatsChanged if args.stats => print_stats(&client).await,
            ChannelEvent::StatsChanged => {}
        }
    }
}

fn print_raw(frame: &Frame) -> Result<()> {
    eprint!("{} ", "EVENT".magenta());
    output::json(frame)
}

async fn print_stats(client: &SecureCloud) {
    match client.dashboard().stats(None).await {
        Ok(stats) => println!(
            "{} {} alerts ({} critical), {} active threats, {} blocked",
            "STATS".cyan(),
            stats.total_alerts,
            stats.critical_alerts,
            stats.active_threats,
            stats.blocked_connections
        ),
        Err(e) => output::error(&format!("Failed to refresh stats: {}", e)),
    }
}

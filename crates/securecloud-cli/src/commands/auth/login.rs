//! Login command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use securecloud_core::Credentials;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "SECURECLOUD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, ctx: &Context) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password).context("Invalid credentials")?;
    let client = ctx.client()?;

    eprintln!("{}", "Logging in...".dimmed());

    let user = client.login(&credentials).await.context("Failed to login")?;

    if ctx.json {
        return output::json(&user);
    }

    output::success("Logged in successfully");
    println!();
    output::field("Name", &user.name);
    output::field("Email", &user.email);
    output::field("Role", user.role.as_str());

    Ok(())
}

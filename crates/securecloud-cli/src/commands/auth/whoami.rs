//! Whoami command implementation.

use anyhow::{Context as _, Result};
use clap::Args;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, ctx: &Context) -> Result<()> {
    let client = ctx.session()?;

    let user = client
        .current_user()
        .await
        .context("Failed to fetch current user")?;

    if ctx.json {
        return output::json(&user);
    }

    output::field("ID", &user.id);
    output::field("Name", &user.name);
    output::field("Email", &user.email);
    output::field("Role", user.role.as_str());
    if let Some(last_login) = &user.last_login {
        output::field("Last login", last_login);
    }

    Ok(())
}

//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use securecloud_client::config::{
    API_URL_ENV, DEFAULT_API_URL, DEFAULT_REALTIME_URL, REALTIME_URL_ENV,
};

use crate::commands::alerts::AlertsCommand;
use crate::commands::auth::AuthCommand;
use crate::commands::dashboard::DashboardCommand;
use crate::commands::firewall::FirewallCommand;
use crate::commands::network::NetworkCommand;
use crate::commands::system::SystemCommand;
use crate::commands::threats::ThreatsCommand;
use crate::commands::users::UsersCommand;
use crate::commands::watch::WatchArgs;

/// SecureCloud command-line client.
#[derive(Parser, Debug)]
#[command(name = "securecloud")]
#[command(author, version = env!("SECURECLOUD_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub endpoint: EndpointArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the SecureCloud server lives.
#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    /// REST API base URL
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Realtime WebSocket URL
    #[arg(long, global = true, env = REALTIME_URL_ENV, default_value = DEFAULT_REALTIME_URL)]
    pub ws_url: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session management
    Auth(AuthCommand),

    /// Security alerts
    Alerts(AlertsCommand),

    /// Detected threats
    Threats(ThreatsCommand),

    /// Firewall rules and blocked connections
    Firewall(FirewallCommand),

    /// Monitored network interfaces
    Network(NetworkCommand),

    /// Dashboard statistics
    Dashboard(DashboardCommand),

    /// System health
    System(SystemCommand),

    /// User accounts
    Users(UsersCommand),

    /// Follow real-time updates
    Watch(WatchArgs),
}

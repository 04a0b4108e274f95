//! REST resource models.
//!
//! Field names follow the API's camelCase JSON. Optional and defaulted
//! fields decode leniently so older servers keep working.

mod alert;
mod dashboard;
mod envelope;
mod filter;
mod firewall;
mod network;
mod system;
mod threat;
mod user;

pub use alert::{Alert, AlertSeverity, AlertStatus};
pub use dashboard::{Activity, DashboardStats, TrafficTotals};
pub use envelope::{ApiResponse, ErrorEnvelope, Page};
pub use filter::{FilterOptions, SortOrder};
pub use firewall::{BlockedConnection, FirewallRule, RuleAction, RuleDirection};
pub use network::{NetworkInterface, NetworkStats};
pub use system::{HealthStatus, ServiceHealth, SystemHealth};
pub use threat::{Threat, ThreatIndicator};
pub use user::{LoginResponse, TokenPair, User, UserRole};

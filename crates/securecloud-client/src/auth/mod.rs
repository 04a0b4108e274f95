//! Session token management.

mod token_manager;

pub use token_manager::{LogoutReason, REFRESH_PATH, SessionEvent, TokenManager};

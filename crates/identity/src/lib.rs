//! Prescription Reminder Identity
//!
//! Who is using the client:
//! - The wallet session and its active account
//! - Sign-in and registration against the contract
//! - The remembered account and role (a display hint)

pub mod auth;
pub mod session;
pub mod store;

pub use auth::{AuthFlow, AuthState, Dashboard};
pub use session::SessionAdapter;
pub use store::{
    JsonFileStore, MemoryStore, RememberedSession, SessionStore, ROLE_KEY, USER_ADDRESS_KEY,
};

use rx_reminder_shared::SessionConfig;

/// File-backed store when a path is configured, in-memory otherwise
pub fn store_from_config(config: &SessionConfig) -> Box<dyn SessionStore> {
    match &config.store_path {
        Some(path) => Box::new(JsonFileStore::new(path.clone())),
        None => Box::new(MemoryStore::new()),
    }
}

//! Persisted session hint.
//!
//! The remembered account and role only decide which dashboard to show
//! first. They are not an authorization boundary; every contract call is
//! checked on chain.

use chrono::{DateTime, Utc};
use rx_reminder_shared::{Address, Role, RxError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const USER_ADDRESS_KEY: &str = "userAddress";
pub const ROLE_KEY: &str = "role";
pub const SAVED_AT_KEY: &str = "savedAt";

/// String key/value storage
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, RxError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), RxError>;
    fn remove(&mut self, key: &str) -> Result<(), RxError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, RxError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RxError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), RxError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Flat JSON object on disk, rewritten on every change
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, RxError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = std::fs::read_to_string(&self.path)?;
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), RxError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, RxError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RxError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), RxError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// What the last successful sign-in left behind
#[derive(Clone, Debug, PartialEq)]
pub struct RememberedSession {
    pub address: Address,
    pub role: Role,
    pub saved_at: Option<DateTime<Utc>>,
}

impl RememberedSession {
    pub fn new(address: Address, role: Role) -> Self {
        Self {
            address,
            role,
            saved_at: Some(Utc::now()),
        }
    }

    pub fn save(&self, store: &mut dyn SessionStore) -> Result<(), RxError> {
        store.set(USER_ADDRESS_KEY, self.address.as_str())?;
        store.set(ROLE_KEY, self.role.as_str())?;
        if let Some(saved_at) = self.saved_at {
            store.set(SAVED_AT_KEY, &saved_at.to_rfc3339())?;
        }
        Ok(())
    }

    /// Unreadable entries count as no session
    pub fn load(store: &dyn SessionStore) -> Result<Option<Self>, RxError> {
        let (Some(address), Some(role)) = (store.get(USER_ADDRESS_KEY)?, store.get(ROLE_KEY)?)
        else {
            return Ok(None);
        };

        let (address, role) = match (Address::parse(&address), role.parse::<Role>()) {
            (Ok(address), Ok(role)) => (address, role),
            _ => {
                warn!("ignoring malformed remembered session");
                return Ok(None);
            }
        };

        let saved_at = store
            .get(SAVED_AT_KEY)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|t| t.with_timezone(&Utc));

        Ok(Some(Self {
            address,
            role,
            saved_at,
        }))
    }

    pub fn clear(store: &mut dyn SessionStore) -> Result<(), RxError> {
        store.remove(USER_ADDRESS_KEY)?;
        store.remove(ROLE_KEY)?;
        store.remove(SAVED_AT_KEY)
    }
}

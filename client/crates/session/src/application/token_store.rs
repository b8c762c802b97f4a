//! Token Store
//!
//! Persists the access token. Reads never fail and writes are best
//! effort: a broken storage backend degrades to "no token", which the
//! refresh flow already handles.

use std::sync::Arc;

use crate::application::config::StorageKeys;
use crate::domain::storage::KeyValueStorage;
use crate::infra::sync::{SyncBus, SyncKind, TabId};

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
    keys: StorageKeys,
    bus: Option<SyncBus>,
    tab: TabId,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, keys: StorageKeys) -> Self {
        Self {
            storage,
            keys,
            bus: None,
            tab: TabId::next(),
        }
    }

    /// Announce every successful write on `bus` as coming from `tab`
    pub fn with_sync(mut self, bus: SyncBus, tab: TabId) -> Self {
        self.bus = Some(bus);
        self.tab = tab;
        self
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn bus(&self) -> Option<&SyncBus> {
        self.bus.as_ref()
    }

    /// Stored access token, `None` on any storage failure
    pub fn get(&self) -> Option<String> {
        match self.storage.get(&self.keys.access) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Reading access token failed");
                None
            }
        }
    }

    pub fn set(&self, token: &str) {
        match self.storage.set(&self.keys.access, token) {
            Ok(()) => self.announce(),
            Err(e) => tracing::warn!(error = %e, "Storing access token failed"),
        }
    }

    /// Remove the access token and the legacy refresh token
    pub fn clear(&self) {
        let access = self.storage.remove(&self.keys.access);
        let legacy = self.storage.remove(&self.keys.legacy_refresh);

        if let Err(e) = &access {
            tracing::warn!(error = %e, "Clearing access token failed");
        }
        if let Err(e) = &legacy {
            tracing::warn!(error = %e, "Clearing legacy refresh token failed");
        }
        if access.is_ok() || legacy.is_ok() {
            self.announce();
        }
    }

    /// Write the legacy refresh key. Current builds keep the refresh
    /// token in the HTTP-only cookie; this only exists so old records
    /// can be produced and then cleared.
    pub fn set_legacy_refresh(&self, token: &str) {
        if let Err(e) = self.storage.set(&self.keys.legacy_refresh, token) {
            tracing::warn!(error = %e, "Storing legacy refresh token failed");
        }
    }

    fn announce(&self) {
        if let Some(bus) = &self.bus {
            bus.publish(self.tab, SyncKind::StorageChanged);
        }
    }
}

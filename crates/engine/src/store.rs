//! Per-token store for the latest gas and slippage results

use snipebot_core::TokenAddress;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

struct StoreEntry<T> {
    value: T,
    updated_at: Instant,
}

/// Thread-safe map of the most recent estimate per token, bounded by `max_entries`.
/// The latest insert for a token always wins.
pub struct EstimateStore<T> {
    entries: RwLock<HashMap<TokenAddress, StoreEntry<T>>>,
    max_entries: usize,
}

impl<T: Clone> EstimateStore<T> {
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Latest value for a token
    pub fn get(&self, token: &TokenAddress) -> Option<T> {
        let entries = self.entries.read().ok()?;
        entries.get(token).map(|e| e.value.clone())
    }

    /// Insert or replace. Evicts the least recently updated token when full.
    pub fn insert(&self, token: TokenAddress, value: T) {
        if let Ok(mut entries) = self.entries.write() {
            if !entries.contains_key(&token) && entries.len() >= self.max_entries {
                if let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.updated_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest);
                }
            }

            entries.insert(
                token,
                StoreEntry {
                    value,
                    updated_at: Instant::now(),
                },
            );
        }
    }

    pub fn remove(&self, token: &TokenAddress) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(token);
        }
    }

    /// Read-only copy for the presentation layer
    pub fn snapshot(&self) -> HashMap<TokenAddress, T> {
        self.entries
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, e)| (k.clone(), e.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for EstimateStore<T> {
    fn default() -> Self {
        Self::with_capacity(500)
    }
}

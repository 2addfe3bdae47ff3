//! Session-scoped key-value storage.
//!
//! Models the browser's session storage: string keys, string values, gone
//! when the session ends. Durable persistence is the remote save endpoint's
//! job, never this layer's.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store refused the write (quota exhausted).
    #[error("session storage quota exceeded writing '{key}'")]
    QuotaExceeded { key: String },
}

/// Key-value persistence scope for study snapshots.
///
/// Implementations are best-effort: callers treat write failures as
/// non-fatal and degrade to an unpersisted but fully functional study.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str);
}

/// In-memory session store, optionally capped to simulate a storage quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once the total stored bytes would exceed
    /// `quota_bytes`. Existing keys are replaced before the check, matching
    /// how browsers account overwrites.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            values: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key) + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

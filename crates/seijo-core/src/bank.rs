//! Bank repository: the load/save boundary between the key-value store and
//! the canonical in-memory bank.
//!
//! Reads never fail. A missing key, a store error, unparseable JSON or a
//! payload that is not an array all yield an empty bank. Writes normalize
//! before encoding, so the stored text always satisfies the bank invariants.

use serde_json::Value;
use tracing::{info, warn};

use crate::config::BankConfig;
use crate::error::Result;
use crate::normalize::{next_auto_id, normalize_bank_with, now_iso};
use crate::question::Question;
use crate::store::Store;

pub struct BankRepository<S: Store> {
    store: S,
    config: BankConfig,
}

impl<S: Store> BankRepository<S> {
    pub fn new(store: S, config: BankConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load and normalize the stored bank.
    pub fn read(&self) -> Vec<Question> {
        let key = &self.config.storage_key;
        let raw = match self.store.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "failed to read bank; using empty bank");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => normalize_bank_with(&records, &self.config, &now_iso()),
            Ok(_) => {
                warn!(key = %key, "stored bank is not a JSON array; using empty bank");
                Vec::new()
            }
            Err(e) => {
                warn!(key = %key, error = %e, "stored bank is not valid JSON; using empty bank");
                Vec::new()
            }
        }
    }

    /// Normalize `bank`, persist it, and return the canonical form that was
    /// written.
    pub fn write(&self, bank: &[Question]) -> Result<Vec<Question>> {
        let records: Vec<Value> = bank.iter().map(Question::to_value).collect();
        self.write_records(&records)
    }

    /// Normalize loosely-typed records, persist them, and return the
    /// canonical bank that was written.
    pub fn write_records(&self, records: &[Value]) -> Result<Vec<Question>> {
        let canonical = normalize_bank_with(records, &self.config, &now_iso());
        let json = serde_json::to_string(&canonical)?;
        self.store.set(&self.config.storage_key, &json)?;
        info!(key = %self.config.storage_key, entries = canonical.len(), "bank written");
        Ok(canonical)
    }

    /// Next id an editor should propose for a new entry.
    pub fn next_auto_id(&self) -> u64 {
        next_auto_id(&self.read())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Runtime configuration for the bank persistence boundary.

/// Key under which the JSON-encoded bank is stored.
pub const DEFAULT_STORAGE_KEY: &str = "seijo_bank_v1";

/// Upper clamp applied to `start` / `ending` on stored records, before the
/// sentence length is known.
pub const DEFAULT_INDEX_CEILING: i64 = 9999;

/// Configuration shared by [`crate::bank::BankRepository`] and the
/// normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankConfig {
    /// Store key holding the bank JSON array.
    /// Default: `"seijo_bank_v1"`.
    pub storage_key: String,
    /// Largest value `start` and `ending` may carry in a normalized record.
    /// Default: 9999.
    pub index_ceiling: i64,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            index_ceiling: DEFAULT_INDEX_CEILING,
        }
    }
}

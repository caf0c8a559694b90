use crate::LedgerResult;

/// Abstraction over the key/value state store holding wallets and
/// transaction records.
///
/// Implementations guarantee atomic single-key reads and writes only.
pub trait WalletStore: Send + Sync {
    /// Read the value stored at `key`.
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Write `value` at `key`, replacing whatever was there.
    fn put(&self, key: &str, value: &[u8]) -> LedgerResult<()>;

    /// Report whether `key` currently holds a value.
    fn contains(&self, key: &str) -> LedgerResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Write `value` only when `key` is vacant. Returns `false` when the key
    /// was already taken and nothing was written.
    fn insert(&self, key: &str, value: &[u8]) -> LedgerResult<bool> {
        if self.contains(key)? {
            return Ok(false);
        }
        self.put(key, value)?;
        Ok(true)
    }
}

use serde::{Deserialize, Serialize};

use crate::KeyScheme;

/// Business rules the ledger enforces on top of the raw state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerPolicy {
    /// Refuse a reward or redemption whose composite key is already recorded.
    pub reject_duplicate_transactions: bool,
    /// Refuse to create a wallet over an existing one.
    pub reject_wallet_overwrite: bool,
    /// Let redemptions drive the balance below zero.
    pub allow_overdraft: bool,
    pub key_scheme: KeyScheme,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            reject_duplicate_transactions: true,
            reject_wallet_overwrite: true,
            allow_overdraft: false,
            key_scheme: KeyScheme::Delimited,
        }
    }
}

impl LedgerPolicy {
    /// Reproduces the behavior of earlier deployments: wallets are
    /// overwritten on create, replays are re-applied, balances may go
    /// negative and transaction keys are plain concatenations.
    pub fn legacy() -> Self {
        Self {
            reject_duplicate_transactions: false,
            reject_wallet_overwrite: false,
            allow_overdraft: true,
            key_scheme: KeyScheme::Concatenated,
        }
    }
}

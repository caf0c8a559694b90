use std::sync::Arc;

use crate::codec::{decode_transaction, decode_wallet};
use crate::keys::validate_identifier;
use crate::{KeyScheme, LedgerError, LedgerResult, Transaction, Wallet, WalletStore};

/// Read-only lookups over wallets and their transaction records.
#[derive(Clone)]
pub struct QueryFacade {
    store: Arc<dyn WalletStore>,
    key_scheme: KeyScheme,
}

impl QueryFacade {
    pub fn new(store: Arc<dyn WalletStore>, key_scheme: KeyScheme) -> Self {
        Self { store, key_scheme }
    }

    pub fn wallet(&self, name: &str) -> LedgerResult<Wallet> {
        validate_identifier("name", name)?;
        let bytes = self
            .store
            .get(name)?
            .ok_or_else(|| LedgerError::NotFound(name.to_string()))?;
        decode_wallet(name, &bytes)
    }

    pub fn transaction(
        &self,
        name: &str,
        entity: &str,
        transaction_id: &str,
    ) -> LedgerResult<Transaction> {
        validate_identifier("name", name)?;
        validate_identifier("entity", entity)?;
        validate_identifier("transaction id", transaction_id)?;
        let key = self.key_scheme.transaction_key(name, entity, transaction_id);
        let bytes = self.store.get(&key)?.ok_or_else(|| {
            LedgerError::NotFound(format!(
                "transaction {transaction_id} from {entity} for {name}"
            ))
        })?;
        decode_transaction(&key, &bytes)
    }
}

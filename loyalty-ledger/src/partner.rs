use std::sync::Arc;

use tracing::debug;

use crate::keys::validate_identifier;
use crate::{LedgerResult, QueryFacade, Transaction, TransactionKind, Wallet, WalletLedger};

/// Adapter used by a single partner (an airline, hotel chain, bank) to move
/// points in and out of member wallets under its own entity name.
#[derive(Clone)]
pub struct PartnerGateway {
    entity: String,
    ledger: Arc<WalletLedger>,
    query: QueryFacade,
}

impl PartnerGateway {
    pub fn new(
        entity: impl Into<String>,
        ledger: Arc<WalletLedger>,
        query: QueryFacade,
    ) -> LedgerResult<Self> {
        let entity = entity.into();
        validate_identifier("entity", &entity)?;
        Ok(Self {
            entity,
            ledger,
            query,
        })
    }

    pub fn award(&self, wallet: &str, transaction_id: &str, points: u64) -> LedgerResult<Wallet> {
        debug!(entity = %self.entity, wallet = %wallet, transaction_id = %transaction_id, "partner award");
        self.ledger.award(
            wallet,
            &self.entity,
            transaction_id,
            TransactionKind::Reward,
            points,
        )
    }

    pub fn redeem(&self, wallet: &str, transaction_id: &str, points: u64) -> LedgerResult<Wallet> {
        debug!(entity = %self.entity, wallet = %wallet, transaction_id = %transaction_id, "partner redemption");
        self.ledger.redeem(
            wallet,
            &self.entity,
            transaction_id,
            TransactionKind::Redeem,
            points,
        )
    }

    /// Look up a transaction this partner previously issued.
    pub fn transaction(&self, wallet: &str, transaction_id: &str) -> LedgerResult<Transaction> {
        self.query.transaction(wallet, &self.entity, transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LedgerError, LedgerPolicy, MemoryWalletStore, WalletStore};
    use loyalty_events::EventBus;

    fn gateway(entity: &str) -> (PartnerGateway, Arc<WalletLedger>) {
        let store: Arc<dyn WalletStore> = Arc::new(MemoryWalletStore::new());
        let policy = LedgerPolicy::default();
        let ledger = Arc::new(WalletLedger::new(
            store.clone(),
            policy,
            Arc::new(EventBus::default()),
        ));
        let query = QueryFacade::new(store, policy.key_scheme);
        (
            PartnerGateway::new(entity, ledger.clone(), query).unwrap(),
            ledger,
        )
    }

    #[test]
    fn stamps_entity_and_kind() {
        let (airline, ledger) = gateway("AirlineX");
        ledger.create("alice", "pw", 0).unwrap();
        assert_eq!(airline.award("alice", "F100", 250).unwrap().balance, 250);
        assert_eq!(airline.redeem("alice", "F101", 50).unwrap().balance, 200);

        let record = airline.transaction("alice", "F100").unwrap();
        assert_eq!(record.entity, "AirlineX");
        assert_eq!(record.kind, TransactionKind::Reward);
        assert_eq!(
            airline.transaction("alice", "F101").unwrap().kind,
            TransactionKind::Redeem
        );
    }

    #[test]
    fn partners_do_not_see_each_others_transactions() {
        let (airline, ledger) = gateway("AirlineX");
        let hotel = PartnerGateway::new("HotelY", ledger.clone(), airline.query.clone()).unwrap();
        ledger.create("alice", "pw", 0).unwrap();
        airline.award("alice", "T1", 10).unwrap();
        hotel.award("alice", "T1", 20).unwrap();
        assert_eq!(airline.transaction("alice", "T1").unwrap().points, 10);
        assert_eq!(hotel.transaction("alice", "T1").unwrap().points, 20);
    }

    #[test]
    fn rejects_empty_entity() {
        let (airline, ledger) = gateway("AirlineX");
        let err = PartnerGateway::new("", ledger, airline.query.clone())
            .err()
            .unwrap();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }
}

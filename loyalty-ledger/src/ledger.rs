use std::sync::Arc;

use chrono::Utc;
use loyalty_events::{EventBus, LedgerEvent, PointsEvent, RejectedEvent, WalletCreatedEvent};
use tracing::{debug, info, warn};

use crate::codec::{decode_wallet, encode_transaction, encode_wallet};
use crate::keys::validate_identifier;
use crate::locks::WalletLocks;
use crate::{
    LedgerError, LedgerPolicy, LedgerResult, Transaction, TransactionKind, Wallet, WalletStore,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Direction {
    Credit,
    Debit,
}

impl Direction {
    fn operation(self) -> &'static str {
        match self {
            Direction::Credit => "award",
            Direction::Debit => "redeem",
        }
    }
}

/// State machine governing wallet balances and their transaction records.
///
/// Mutations on the same wallet name are serialized through an internal
/// per-name lock registry. Every applied reward or redemption writes its
/// transaction record before the wallet balance, so an interrupted
/// operation can leave an orphaned record but never an unrecorded balance
/// change.
pub struct WalletLedger {
    store: Arc<dyn WalletStore>,
    policy: LedgerPolicy,
    locks: WalletLocks,
    events: Arc<EventBus>,
}

impl WalletLedger {
    pub fn new(store: Arc<dyn WalletStore>, policy: LedgerPolicy, events: Arc<EventBus>) -> Self {
        Self {
            store,
            policy,
            locks: WalletLocks::new(),
            events,
        }
    }

    /// Create a wallet holding `initial_balance` points.
    pub fn create(
        &self,
        name: &str,
        credential: &str,
        initial_balance: i64,
    ) -> LedgerResult<Wallet> {
        debug!(wallet = %name, initial_balance, "creating wallet");
        let result = self.create_inner(name, credential, initial_balance);
        self.observe("create", name, result)
    }

    /// Record a reward and add `points` to the wallet. `kind` is stored on
    /// the record as given; the balance always increases.
    pub fn award(
        &self,
        name: &str,
        entity: &str,
        transaction_id: &str,
        kind: TransactionKind,
        points: u64,
    ) -> LedgerResult<Wallet> {
        self.apply(Direction::Credit, name, entity, transaction_id, kind, points)
    }

    /// Record a redemption and subtract `points` from the wallet.
    pub fn redeem(
        &self,
        name: &str,
        entity: &str,
        transaction_id: &str,
        kind: TransactionKind,
        points: u64,
    ) -> LedgerResult<Wallet> {
        self.apply(Direction::Debit, name, entity, transaction_id, kind, points)
    }

    fn create_inner(
        &self,
        name: &str,
        credential: &str,
        initial_balance: i64,
    ) -> LedgerResult<Wallet> {
        validate_identifier("name", name)?;
        let _guard = self.locks.lock(name);
        let replaced = self.store.contains(name)?;
        if replaced && self.policy.reject_wallet_overwrite {
            return Err(LedgerError::AlreadyExists(name.to_string()));
        }
        let wallet = Wallet::new(name, credential, initial_balance);
        self.store.put(name, &encode_wallet(&wallet)?)?;
        if replaced {
            warn!(wallet = %name, "existing wallet overwritten on create");
        }
        info!(wallet = %name, balance = wallet.balance, "wallet created");
        self.events.publish(LedgerEvent::WalletCreated(WalletCreatedEvent {
            wallet: wallet.name.clone(),
            balance: wallet.balance,
            replaced,
            at: Utc::now(),
        }));
        Ok(wallet)
    }

    fn apply(
        &self,
        direction: Direction,
        name: &str,
        entity: &str,
        transaction_id: &str,
        kind: TransactionKind,
        points: u64,
    ) -> LedgerResult<Wallet> {
        debug!(
            wallet = %name,
            entity = %entity,
            transaction_id = %transaction_id,
            kind = %kind,
            points,
            "{} requested",
            direction.operation()
        );
        let result = self.apply_inner(direction, name, entity, transaction_id, kind, points);
        self.observe(direction.operation(), name, result)
    }

    fn apply_inner(
        &self,
        direction: Direction,
        name: &str,
        entity: &str,
        transaction_id: &str,
        kind: TransactionKind,
        points: u64,
    ) -> LedgerResult<Wallet> {
        validate_identifier("name", name)?;
        validate_identifier("entity", entity)?;
        validate_identifier("transaction id", transaction_id)?;
        let delta = i64::try_from(points)
            .map_err(|_| LedgerError::invalid(format!("points value {points} is too large")))?;

        let _guard = self.locks.lock(name);
        let stored = self
            .store
            .get(name)?
            .ok_or_else(|| LedgerError::NotFound(name.to_string()))?;
        let mut wallet = decode_wallet(name, &stored)?;

        let key = self
            .policy
            .key_scheme
            .transaction_key(name, entity, transaction_id);
        if self.policy.reject_duplicate_transactions && self.store.contains(&key)? {
            return Err(duplicate(name, entity, transaction_id));
        }

        let balance = match direction {
            Direction::Credit => wallet.balance.checked_add(delta),
            Direction::Debit => {
                if !self.policy.allow_overdraft && wallet.balance < delta {
                    return Err(LedgerError::InsufficientBalance {
                        wallet: name.to_string(),
                        balance: wallet.balance,
                        requested: points,
                    });
                }
                wallet.balance.checked_sub(delta)
            }
        }
        .ok_or_else(|| {
            LedgerError::invalid(format!(
                "{} of {points} points overflows the balance of {name}",
                direction.operation()
            ))
        })?;

        let record = Transaction::new(name, entity, transaction_id, kind, points);
        let encoded = encode_transaction(&record)?;
        if self.policy.reject_duplicate_transactions {
            if !self.store.insert(&key, &encoded)? {
                return Err(duplicate(name, entity, transaction_id));
            }
        } else {
            self.store.put(&key, &encoded)?;
        }

        wallet.balance = balance;
        self.store.put(name, &encode_wallet(&wallet)?)?;
        info!(
            wallet = %name,
            entity = %entity,
            transaction_id = %transaction_id,
            points,
            balance,
            "{} applied",
            direction.operation()
        );

        let event = PointsEvent {
            wallet: wallet.name.clone(),
            entity: record.entity,
            transaction_id: record.transaction_id,
            points,
            balance,
            at: Utc::now(),
        };
        self.events.publish(match direction {
            Direction::Credit => LedgerEvent::PointsAwarded(event),
            Direction::Debit => LedgerEvent::PointsRedeemed(event),
        });
        Ok(wallet)
    }

    fn observe(
        &self,
        operation: &str,
        name: &str,
        result: LedgerResult<Wallet>,
    ) -> LedgerResult<Wallet> {
        if let Err(err) = &result {
            warn!(wallet = %name, operation, reason = err.kind(), error = %err, "operation rejected");
            self.events.publish(LedgerEvent::Rejected(RejectedEvent {
                operation: operation.to_string(),
                wallet: name.to_string(),
                reason: err.kind().to_string(),
                message: err.to_string(),
                at: Utc::now(),
            }));
        }
        result
    }
}

fn duplicate(name: &str, entity: &str, transaction_id: &str) -> LedgerError {
    LedgerError::DuplicateTransaction {
        wallet: name.to_string(),
        entity: entity.to_string(),
        transaction_id: transaction_id.to_string(),
    }
}

//! Loyalty wallet ledger: balances, their audit trail and the state stores
//! backing them.

pub mod codec;
mod error;
mod keys;
mod ledger;
mod locks;
mod memory;
mod partner;
mod policy;
mod query;
mod sqlite;
mod store;
mod wallet;

pub use error::{LedgerError, LedgerResult};
pub use keys::{KeyScheme, KEY_SEPARATOR};
pub use ledger::WalletLedger;
pub use memory::MemoryWalletStore;
pub use partner::PartnerGateway;
pub use policy::LedgerPolicy;
pub use query::QueryFacade;
pub use sqlite::SqliteWalletStore;
pub use store::WalletStore;
pub use wallet::{Transaction, TransactionKind, Wallet};

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use loyalty_config::{LoyaltyConfig, StoreBackend};
use loyalty_events::EventBus;
use loyalty_ledger::{
    LedgerResult, MemoryWalletStore, PartnerGateway, QueryFacade, SqliteWalletStore, WalletLedger,
    WalletStore,
};

/// Ledger components wired against one shared state store.
pub struct Services {
    pub ledger: Arc<WalletLedger>,
    pub query: QueryFacade,
    pub events: Arc<EventBus>,
}

impl Services {
    pub fn from_config(config: &LoyaltyConfig) -> Result<Self> {
        let store: Arc<dyn WalletStore> = match config.store.backend {
            StoreBackend::Memory => {
                warn!("using in-memory wallet store; state is discarded on exit");
                Arc::new(MemoryWalletStore::new())
            }
            StoreBackend::Sqlite => {
                let path = &config.store.path;
                info!(path = %path.display(), "opening sqlite wallet store");
                Arc::new(SqliteWalletStore::new(path).with_context(|| {
                    format!("failed to open wallet store at {}", path.display())
                })?)
            }
        };
        let events = Arc::new(EventBus::new(config.events.capacity));
        let ledger = Arc::new(WalletLedger::new(
            store.clone(),
            config.policy,
            events.clone(),
        ));
        let query = QueryFacade::new(store, config.policy.key_scheme);
        Ok(Self {
            ledger,
            query,
            events,
        })
    }

    pub fn partner(&self, entity: &str) -> LedgerResult<PartnerGateway> {
        PartnerGateway::new(entity, self.ledger.clone(), self.query.clone())
    }
}

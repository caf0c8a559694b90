//! Events published by the wallet ledger and the bus that carries them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletCreatedEvent {
    pub wallet: String,
    pub balance: i64,
    pub replaced: bool,
    pub at: DateTime<Utc>,
}

/// Balance movement caused by an award or a redemption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEvent {
    pub wallet: String,
    pub entity: String,
    pub transaction_id: String,
    pub points: u64,
    pub balance: i64,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEvent {
    pub operation: String,
    pub wallet: String,
    pub reason: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    WalletCreated(WalletCreatedEvent),
    PointsAwarded(PointsEvent),
    PointsRedeemed(PointsEvent),
    Rejected(RejectedEvent),
}

impl LedgerEvent {
    pub fn wallet(&self) -> &str {
        match self {
            LedgerEvent::WalletCreated(event) => &event.wallet,
            LedgerEvent::PointsAwarded(event) | LedgerEvent::PointsRedeemed(event) => {
                &event.wallet
            }
            LedgerEvent::Rejected(event) => &event.wallet,
        }
    }
}

pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> EventStream {
        EventStream {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn publish(&self, event: LedgerEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

pub struct EventStream {
    receiver: broadcast::Receiver<LedgerEvent>,
}

impl EventStream {
    pub async fn recv(&mut self) -> Result<LedgerEvent, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// Non-blocking receive, for synchronous consumers.
    pub fn try_recv(&mut self) -> Result<LedgerEvent, broadcast::error::TryRecvError> {
        self.receiver.try_recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(wallet: &str) -> LedgerEvent {
        LedgerEvent::WalletCreated(WalletCreatedEvent {
            wallet: wallet.into(),
            balance: 0,
            replaced: false,
            at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(8);
        let mut stream = bus.subscribe();
        bus.publish(created("alice"));
        let event = stream.recv().await.unwrap();
        assert_eq!(event.wallet(), "alice");
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(created("bob"));
        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(created("carol")).unwrap();
        assert_eq!(json["type"], "wallet_created");
        assert_eq!(json["wallet"], "carol");
    }
}

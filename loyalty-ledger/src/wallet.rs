use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Persistent point balance of one account holder.
///
/// Field names on the wire follow the records already held in deployed
/// state stores, hence `password` and `pointbalance`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub name: String,
    #[serde(rename = "password")]
    pub credential: String,
    #[serde(rename = "pointbalance")]
    pub balance: i64,
}

impl Wallet {
    pub fn new(name: impl Into<String>, credential: impl Into<String>, balance: i64) -> Self {
        Self {
            name: name.into(),
            credential: credential.into(),
            balance,
        }
    }
}

/// Immutable audit record of a single reward or redemption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "name")]
    pub wallet_name: String,
    pub entity: String,
    #[serde(rename = "transactionid")]
    pub transaction_id: String,
    #[serde(rename = "transactiontype")]
    pub kind: TransactionKind,
    #[serde(rename = "loyaltypoints")]
    pub points: u64,
}

impl Transaction {
    pub fn new(
        wallet_name: impl Into<String>,
        entity: impl Into<String>,
        transaction_id: impl Into<String>,
        kind: TransactionKind,
        points: u64,
    ) -> Self {
        Self {
            wallet_name: wallet_name.into(),
            entity: entity.into(),
            transaction_id: transaction_id.into(),
            kind,
            points,
        }
    }
}

/// Direction of a transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TransactionKind {
    Reward,
    Redeem,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Reward => "reward",
            TransactionKind::Redeem => "redeem",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reward" | "award" => Ok(TransactionKind::Reward),
            "redeem" | "redemption" => Ok(TransactionKind::Redeem),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

impl Serialize for TransactionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

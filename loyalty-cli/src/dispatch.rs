use serde::{Deserialize, Serialize};

use loyalty_ledger::{LedgerError, LedgerResult, Transaction, TransactionKind, Wallet};

use crate::services::Services;

/// A single request against the wallet ledger, resolved and validated at the
/// invocation boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreateWallet {
        name: String,
        credential: String,
        initial_balance: i64,
    },
    Award {
        name: String,
        entity: String,
        transaction_id: String,
        kind: TransactionKind,
        points: u64,
    },
    Redeem {
        name: String,
        entity: String,
        transaction_id: String,
        kind: TransactionKind,
        points: u64,
    },
    GetWallet {
        name: String,
    },
    GetTransaction {
        name: String,
        entity: String,
        transaction_id: String,
    },
}

impl Operation {
    /// Resolve a named invocation with positional string arguments.
    ///
    /// Accepts the operation names of the public surface (`createWallet`,
    /// `award`, `redeem`, `getWallet`, `getTransaction`) as well as the names
    /// older partner integrations send (`createwallet`, `init`,
    /// `addpointstowallet`, `addPoints`, `read`, `query`).
    pub fn from_invocation(function: &str, args: &[String]) -> LedgerResult<Self> {
        match function.to_ascii_lowercase().as_str() {
            "createwallet" | "init" => {
                let [name, credential, balance] = expect_args::<3>(function, args)?;
                Ok(Operation::CreateWallet {
                    name: name.clone(),
                    credential: credential.clone(),
                    initial_balance: parse_balance(balance)?,
                })
            }
            "award" | "addpointstowallet" | "addpoints" => {
                let [name, entity, transaction_id, kind, points] =
                    expect_args::<5>(function, args)?;
                Ok(Operation::Award {
                    name: name.clone(),
                    entity: entity.clone(),
                    transaction_id: transaction_id.clone(),
                    kind: parse_kind(kind)?,
                    points: parse_points(points)?,
                })
            }
            "redeem" => {
                let [name, entity, transaction_id, kind, points] =
                    expect_args::<5>(function, args)?;
                Ok(Operation::Redeem {
                    name: name.clone(),
                    entity: entity.clone(),
                    transaction_id: transaction_id.clone(),
                    kind: parse_kind(kind)?,
                    points: parse_points(points)?,
                })
            }
            "getwallet" | "read" => {
                let [name] = expect_args::<1>(function, args)?;
                Ok(Operation::GetWallet { name: name.clone() })
            }
            "gettransaction" | "query" => {
                let [name, entity, transaction_id] = expect_args::<3>(function, args)?;
                Ok(Operation::GetTransaction {
                    name: name.clone(),
                    entity: entity.clone(),
                    transaction_id: transaction_id.clone(),
                })
            }
            _ => Err(LedgerError::invalid(format!("unknown operation {function}"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateWallet { .. } => "createWallet",
            Operation::Award { .. } => "award",
            Operation::Redeem { .. } => "redeem",
            Operation::GetWallet { .. } => "getWallet",
            Operation::GetTransaction { .. } => "getTransaction",
        }
    }

    /// Wallet the operation reads or mutates.
    pub fn wallet(&self) -> &str {
        match self {
            Operation::CreateWallet { name, .. }
            | Operation::Award { name, .. }
            | Operation::Redeem { name, .. }
            | Operation::GetWallet { name }
            | Operation::GetTransaction { name, .. } => name,
        }
    }

    pub fn execute(&self, services: &Services) -> LedgerResult<OperationOutput> {
        match self {
            Operation::CreateWallet {
                name,
                credential,
                initial_balance,
            } => services
                .ledger
                .create(name, credential, *initial_balance)
                .map(OperationOutput::from),
            Operation::Award {
                name,
                entity,
                transaction_id,
                kind,
                points,
            } => services
                .ledger
                .award(name, entity, transaction_id, *kind, *points)
                .map(OperationOutput::from),
            Operation::Redeem {
                name,
                entity,
                transaction_id,
                kind,
                points,
            } => services
                .ledger
                .redeem(name, entity, transaction_id, *kind, *points)
                .map(OperationOutput::from),
            Operation::GetWallet { name } => services.query.wallet(name).map(OperationOutput::from),
            Operation::GetTransaction {
                name,
                entity,
                transaction_id,
            } => services
                .query
                .transaction(name, entity, transaction_id)
                .map(OperationOutput::from),
        }
    }
}

/// Result of an [`Operation`], as reported to callers. The wallet
/// credential is never echoed back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    Wallet(WalletView),
    Transaction(TransactionView),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WalletView {
    pub name: String,
    pub balance: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    pub wallet: String,
    pub entity: String,
    pub transaction_id: String,
    pub kind: TransactionKind,
    pub points: u64,
}

impl From<Wallet> for OperationOutput {
    fn from(wallet: Wallet) -> Self {
        OperationOutput::Wallet(WalletView {
            name: wallet.name,
            balance: wallet.balance,
        })
    }
}

impl From<Transaction> for OperationOutput {
    fn from(record: Transaction) -> Self {
        OperationOutput::Transaction(TransactionView {
            wallet: record.wallet_name,
            entity: record.entity,
            transaction_id: record.transaction_id,
            kind: record.kind,
            points: record.points,
        })
    }
}

fn expect_args<'a, const N: usize>(
    function: &str,
    args: &'a [String],
) -> LedgerResult<&'a [String; N]> {
    args.try_into().map_err(|_| {
        LedgerError::invalid(format!(
            "{function} expects {N} arguments, got {}",
            args.len()
        ))
    })
}

fn parse_balance(raw: &str) -> LedgerResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| LedgerError::invalid(format!("expected an integer balance, got {raw:?}")))
}

fn parse_points(raw: &str) -> LedgerResult<u64> {
    raw.trim().parse().map_err(|_| {
        LedgerError::invalid(format!(
            "expected a non-negative integer for points, got {raw:?}"
        ))
    })
}

fn parse_kind(raw: &str) -> LedgerResult<TransactionKind> {
    raw.parse().map_err(LedgerError::InvalidArgument)
}

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{LedgerError, LedgerResult, Transaction, Wallet};

pub fn encode_wallet(wallet: &Wallet) -> LedgerResult<Vec<u8>> {
    encode(&wallet.name, wallet)
}

pub fn decode_wallet(key: &str, bytes: &[u8]) -> LedgerResult<Wallet> {
    decode(key, bytes)
}

pub fn encode_transaction(record: &Transaction) -> LedgerResult<Vec<u8>> {
    encode(&record.transaction_id, record)
}

pub fn decode_transaction(key: &str, bytes: &[u8]) -> LedgerResult<Transaction> {
    decode(key, bytes)
}

fn encode<T: Serialize>(key: &str, value: &T) -> LedgerResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|err| LedgerError::Encode {
        key: key.to_string(),
        reason: err.to_string(),
    })
}

fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> LedgerResult<T> {
    serde_json::from_slice(bytes).map_err(|err| LedgerError::Corrupt {
        key: key.to_string(),
        reason: err.to_string(),
    })
}

use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use loyalty_events::{EventStream, LedgerEvent};

use crate::dispatch::Operation;
use crate::services::Services;

/// Operation read from a batch file together with its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchEntry {
    pub line: usize,
    pub operation: Operation,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchReport {
    pub applied: usize,
    pub rejected: Vec<BatchFailure>,
    pub events: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchFailure {
    pub line: usize,
    pub operation: &'static str,
    pub wallet: String,
    pub reason: &'static str,
    pub error: String,
}

/// Parse JSON-lines operations. Blank lines and lines starting with `#`
/// are skipped.
pub fn parse_operations(reader: impl BufRead) -> Result<Vec<BatchEntry>> {
    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("failed to read line {line_no}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let operation: Operation = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid operation on line {line_no}"))?;
        entries.push(BatchEntry {
            line: line_no,
            operation,
        });
    }
    Ok(entries)
}

/// Execute a batch. Operations on the same wallet run in file order;
/// different wallets run concurrently.
pub async fn run_batch(services: Arc<Services>, entries: Vec<BatchEntry>) -> Result<BatchReport> {
    let mut by_wallet: BTreeMap<String, Vec<BatchEntry>> = BTreeMap::new();
    for entry in entries {
        by_wallet
            .entry(entry.operation.wallet().to_string())
            .or_default()
            .push(entry);
    }
    info!(wallets = by_wallet.len(), "starting batch");

    let (stop_tx, stop_rx) = oneshot::channel();
    let listener = tokio::spawn(watch_events(services.events.subscribe(), stop_rx));

    let mut tasks = JoinSet::new();
    for (wallet, group) in by_wallet {
        let services = Arc::clone(&services);
        tasks.spawn_blocking(move || {
            debug!(wallet = %wallet, operations = group.len(), "replaying wallet group");
            group
                .into_iter()
                .map(|entry| {
                    let outcome = entry.operation.execute(&services);
                    (entry, outcome)
                })
                .collect::<Vec<_>>()
        });
    }

    let mut report = BatchReport::default();
    while let Some(joined) = tasks.join_next().await {
        for (entry, outcome) in joined.context("batch worker panicked")? {
            match outcome {
                Ok(_) => report.applied += 1,
                Err(err) => report.rejected.push(BatchFailure {
                    line: entry.line,
                    operation: entry.operation.name(),
                    wallet: entry.operation.wallet().to_string(),
                    reason: err.kind(),
                    error: err.to_string(),
                }),
            }
        }
    }
    report.rejected.sort_by_key(|failure| failure.line);

    let _ = stop_tx.send(());
    report.events = listener.await.context("event listener panicked")?;
    info!(
        applied = report.applied,
        rejected = report.rejected.len(),
        events = report.events,
        "batch finished"
    );
    Ok(report)
}

async fn watch_events(mut stream: EventStream, mut stop: oneshot::Receiver<()>) -> usize {
    let mut seen = 0;
    loop {
        tokio::select! {
            event = stream.recv() => match event {
                Ok(event) => {
                    seen += 1;
                    log_event(&event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event listener lagged");
                    seen += skipped as usize;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = &mut stop => {
                while let Ok(event) = stream.try_recv() {
                    seen += 1;
                    log_event(&event);
                }
                break;
            }
        }
    }
    seen
}

fn log_event(event: &LedgerEvent) {
    let wallet = event.wallet();
    match event {
        LedgerEvent::WalletCreated(created) => {
            debug!(wallet = %wallet, balance = created.balance, "event: wallet created")
        }
        LedgerEvent::PointsAwarded(moved) | LedgerEvent::PointsRedeemed(moved) => debug!(
            wallet = %wallet,
            entity = %moved.entity,
            transaction_id = %moved.transaction_id,
            points = moved.points,
            balance = moved.balance,
            "event: points moved"
        ),
        LedgerEvent::Rejected(rejected) => debug!(
            wallet = %wallet,
            operation = %rejected.operation,
            reason = %rejected.reason,
            "event: operation rejected"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loyalty_config::{LoyaltyConfig, StoreBackend};
    use std::io::Cursor;

    const BATCH: &str = r#"
# seed wallets
{"op":"create_wallet","name":"alice","credential":"pw","initial_balance":0}
{"op":"create_wallet","name":"bob","credential":"pw","initial_balance":50}

{"op":"award","name":"alice","entity":"AirlineX","transaction_id":"TX1","kind":"reward","points":100}
{"op":"redeem","name":"bob","entity":"HotelY","transaction_id":"H1","kind":"redeem","points":20}
{"op":"award","name":"alice","entity":"AirlineX","transaction_id":"TX1","kind":"reward","points":100}
{"op":"redeem","name":"alice","entity":"AirlineX","transaction_id":"TX2","kind":"redeem","points":40}
{"op":"award","name":"carol","entity":"BankZ","transaction_id":"B1","kind":"reward","points":5}
"#;

    fn memory_services() -> Arc<Services> {
        let mut config = LoyaltyConfig::default();
        config.store.backend = StoreBackend::Memory;
        Arc::new(Services::from_config(&config).unwrap())
    }

    #[test]
    fn parse_skips_comments_and_reports_line_numbers() {
        let entries = parse_operations(Cursor::new(BATCH)).unwrap();
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].line, 3);
        assert_eq!(entries[2].line, 6);

        let err = parse_operations(Cursor::new("{\"op\":\"award\"}\n")).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn replays_in_wallet_order_and_reports_rejections() {
        let services = memory_services();
        let entries = parse_operations(Cursor::new(BATCH)).unwrap();
        let report = run_batch(services.clone(), entries).await.unwrap();

        assert_eq!(report.applied, 5);
        let reasons: Vec<_> = report
            .rejected
            .iter()
            .map(|failure| (failure.line, failure.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![(8, "duplicate_transaction"), (10, "not_found")]
        );
        assert_eq!(report.events, 7);
        assert_eq!(services.query.wallet("alice").unwrap().balance, 60);
        assert_eq!(services.query.wallet("bob").unwrap().balance, 30);
    }
}

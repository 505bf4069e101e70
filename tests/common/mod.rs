use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use cajero::transaction::Transaction;
use rust_decimal::Decimal;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Spawns an in-process stand-in for the remote transaction service.
///
/// It keeps a shared ledger of account balances, reads one request per
/// connection up to the client's write-half close, transfers when the origin
/// account covers the amount, and replies accepted or rejected before
/// closing its own write half — the end-of-reply contract the client relies
/// on.
pub async fn spawn_ledger(initial: &[(&str, Decimal)]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let balances: Arc<Mutex<HashMap<String, Decimal>>> = Arc::new(Mutex::new(
        initial
            .iter()
            .map(|(account, balance)| (account.to_string(), *balance))
            .collect(),
    ));

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let balances = Arc::clone(&balances);
            tokio::spawn(async move {
                let mut request = Vec::new();
                if socket.read_to_end(&mut request).await.is_err() {
                    return;
                }
                let Ok(tx) = serde_json::from_slice::<Transaction>(&request) else {
                    return;
                };

                // The transfer decision and both balance updates happen
                // under one lock, so concurrent clients see a consistent
                // ledger.
                let reply = {
                    let mut balances = balances.lock().await;
                    let available = balances.get(&tx.origin).copied().unwrap_or(Decimal::ZERO);
                    if available >= tx.amount {
                        balances.insert(tx.origin.clone(), available - tx.amount);
                        *balances.entry(tx.destination.clone()).or_default() += tx.amount;
                        tx.accepted()
                    } else {
                        tx.rejected(format!("insufficient funds in account {}", tx.origin))
                    }
                };

                let _ = socket
                    .write_all(&serde_json::to_vec(&reply).unwrap())
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

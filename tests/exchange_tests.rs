mod common;

use std::net::SocketAddr;
use std::time::Duration;

use cajero::driver::{Driver, Outcome, Phase};
use cajero::error::{DecodeError, FailureKind};
use cajero::transaction::{Status, Transaction};
use rust_decimal_macros::dec;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

#[tokio::test]
async fn accepted_transfer_round_trips_the_request_fields() {
    let addr = common::spawn_ledger(&[("uno", dec!(10000))]).await;
    let driver = Driver::new(Duration::from_secs(5));

    let request = Transaction::request("uno", "dos", dec!(100), "groceries");
    let outcome = driver.execute(&addr.to_string(), &request).await;

    let response = match outcome {
        Outcome::Success(response) => response,
        other => panic!("expected success, got {other:?}"),
    };
    assert_eq!(response.origin, "uno");
    assert_eq!(response.destination, "dos");
    assert_eq!(response.amount, dec!(100));
    assert_eq!(response.description, "groceries");
    assert_eq!(response.status, Some(Status::Accepted));
}

#[tokio::test]
async fn empty_reply_is_a_decoding_failure_not_a_false_accept() {
    // A service that reads the request and closes without answering.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut sink = Vec::new();
        let _ = socket.read_to_end(&mut sink).await;
        drop(socket);
    });

    let driver = Driver::new(Duration::from_secs(5));
    let request = Transaction::request("uno", "dos", dec!(100), "");
    let outcome = driver.execute(&addr.to_string(), &request).await;

    match outcome {
        Outcome::Failed {
            phase: Phase::Receive,
            error: FailureKind::Decoding(DecodeError::EmptyReply),
        } => {}
        other => panic!("expected empty-reply decode failure, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_service_times_out_in_the_receive_phase() {
    // A service that reads the request and then never replies.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut sink = Vec::new();
        let _ = socket.read_to_end(&mut sink).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let driver = Driver::new(Duration::from_millis(200));
    let request = Transaction::request("uno", "dos", dec!(100), "");
    let outcome = driver.execute(&addr.to_string(), &request).await;

    match outcome {
        Outcome::Failed {
            phase: Phase::Receive,
            error: FailureKind::Timeout(_),
        } => {}
        other => panic!("expected receive timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn timed_out_connection_is_released_and_later_exchanges_work() {
    let addr = common::spawn_ledger(&[("uno", dec!(10000))]).await;

    // First exchange against a mute endpoint times out...
    let mute = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mute_addr = mute.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = mute.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let driver = Driver::new(Duration::from_millis(200));
    let request = Transaction::request("uno", "dos", dec!(100), "");
    let outcome = driver.execute(&mute_addr.to_string(), &request).await;
    assert!(matches!(outcome, Outcome::Failed { .. }));

    // ...and a fresh exchange against the real service still succeeds.
    let driver = Driver::new(Duration::from_secs(5));
    let outcome = driver.execute(&addr.to_string(), &request).await;
    assert!(outcome.is_success(), "got {outcome:?}");
}

#[tokio::test]
async fn unreachable_service_fails_in_the_connect_phase() {
    // Bind and immediately drop to get an address nobody listens on.
    let parked = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = parked.local_addr().unwrap();
    drop(parked);

    let driver = Driver::new(Duration::from_secs(1));
    let request = Transaction::request("uno", "dos", dec!(100), "");
    let outcome = driver.execute(&addr.to_string(), &request).await;

    match outcome {
        Outcome::Failed {
            phase: Phase::Connect,
            error: FailureKind::Connect(_) | FailureKind::Timeout(_),
        } => {}
        other => panic!("expected connect failure, got {other:?}"),
    }
}

//! Integration tests — full negotiation lifecycle, cancellation, and
//! error scenarios over a real TCP connection on localhost.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

use remuco_core::{
    ClientInfo, CommController, ConnectOutcome, ConnectState, ConnectTarget, Connector,
    ConnectorOptions, Frame, Message, PROTO_VERSION, Player, PlayerEvent, PlayerFeatures,
    PlayerInfo, PlayerState, Playback, RemucoCodec, ReturnCode,
};

// ── Helpers ──────────────────────────────────────────────────────

/// Spin up a listener on an OS-assigned port and return the target.
/// The listener is returned so the caller can accept on it.
async fn ephemeral_listener() -> (TcpListener, ConnectTarget) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let target = ConnectTarget::new(addr.ip().to_string(), addr.port()).unwrap();
    (listener, target)
}

fn host_info() -> PlayerInfo {
    PlayerInfo {
        proto_version: PROTO_VERSION,
        name: "integration player".to_string(),
        features: PlayerFeatures::all(),
        max_rating: 5,
    }
}

/// Minimal host side: accept one client, consume its `Hello`, reply
/// with `Welcome`, and return the framed stream for further traffic.
async fn accept_and_welcome(
    listener: TcpListener,
    info: PlayerInfo,
) -> Framed<TcpStream, RemucoCodec> {
    let (stream, _) = listener.accept().await.unwrap();
    let mut framed = Framed::new(stream, RemucoCodec);

    let hello = framed.next().await.unwrap().unwrap();
    assert_eq!(hello.message().unwrap(), Message::Hello);
    let client = ClientInfo::from_bytes(hello.payload()).unwrap();
    assert_eq!(client.proto_version, PROTO_VERSION);

    framed.send(info.into_frame().unwrap()).await.unwrap();
    framed
}

fn fast_opts() -> ConnectorOptions {
    ConnectorOptions {
        connect_timeout: Duration::from_secs(5),
        hello_timeout: Duration::from_secs(5),
        ping_interval: Duration::from_secs(60),
    }
}

// ── Negotiation outcomes ─────────────────────────────────────────

#[tokio::test]
async fn negotiation_succeeds() {
    let (listener, target) = ephemeral_listener().await;
    let host = tokio::spawn(accept_and_welcome(listener, host_info()));

    let connector = Connector::spawn(target, ClientInfo::default(), fast_opts());
    let state_rx = connector.watch_state();

    let outcome = connector.wait().await;
    assert_eq!(outcome.code(), ReturnCode::Ok);
    let ConnectOutcome::Connected(conn) = outcome else {
        panic!("expected a connection");
    };
    assert!(conn.is_open());
    assert_eq!(conn.player_info().name, "integration player");

    // The watch flipped terminal only after the outcome was populated.
    assert_eq!(*state_rx.borrow(), ConnectState::Succeeded);

    host.await.unwrap();
}

#[tokio::test]
async fn negotiation_fails_when_nobody_listens() {
    let (listener, target) = ephemeral_listener().await;
    drop(listener); // free the port so the connect is refused

    let connector = Connector::spawn(target, ClientInfo::default(), fast_opts());
    let outcome = connector.wait().await;

    assert_eq!(outcome.code(), ReturnCode::Error);
    assert!(!outcome.user_msg().is_empty());
}

#[tokio::test]
async fn negotiation_fails_on_version_mismatch() {
    let (listener, target) = ephemeral_listener().await;
    let mismatched = PlayerInfo {
        proto_version: PROTO_VERSION + 41,
        ..host_info()
    };
    let host = tokio::spawn(accept_and_welcome(listener, mismatched));

    let connector = Connector::spawn(target, ClientInfo::default(), fast_opts());
    let outcome = connector.wait().await;

    assert_eq!(outcome.code(), ReturnCode::Error);
    assert!(outcome.user_msg().contains("version"));

    host.await.unwrap();
}

#[tokio::test]
async fn negotiation_fails_when_host_refuses() {
    let (listener, target) = ephemeral_listener().await;
    let host = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = Framed::new(stream, RemucoCodec);
        let _hello = framed.next().await.unwrap().unwrap();
        framed.send(Frame::bye()).await.unwrap();
    });

    let connector = Connector::spawn(target, ClientInfo::default(), fast_opts());
    let outcome = connector.wait().await;

    assert_eq!(outcome.code(), ReturnCode::Error);
    assert!(outcome.user_msg().contains("refused"));

    host.await.unwrap();
}

#[tokio::test]
async fn negotiation_times_out_on_silent_host() {
    let (listener, target) = ephemeral_listener().await;
    // Accept but never answer the Hello.
    let host = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let opts = ConnectorOptions {
        hello_timeout: Duration::from_millis(100),
        ..fast_opts()
    };
    let connector = Connector::spawn(target, ClientInfo::default(), opts);
    let outcome = connector.wait().await;

    assert_eq!(outcome.code(), ReturnCode::Error);
    assert!(outcome.user_msg().contains("timeout"));

    host.abort();
}

// ── Cancellation ─────────────────────────────────────────────────

#[tokio::test]
async fn cancellation_releases_the_waiter() {
    let (listener, target) = ephemeral_listener().await;
    // A host that accepts and then stays silent: without cancellation
    // the waiter would sit in the hello phase for the full timeout.
    let host = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let opts = ConnectorOptions {
        hello_timeout: Duration::from_secs(30),
        ..fast_opts()
    };
    let connector = Connector::spawn(target, ClientInfo::default(), opts);
    let cancel = connector.cancel_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(5), connector.wait())
        .await
        .expect("cancellation must release the waiter");
    assert_eq!(outcome.code(), ReturnCode::UserCancel);
    assert!(matches!(outcome, ConnectOutcome::Cancelled));

    host.abort();
}

#[tokio::test]
async fn repeated_cancellation_signals_once() {
    let (listener, target) = ephemeral_listener().await;
    drop(listener);

    let connector = Connector::spawn(target, ClientInfo::default(), fast_opts());
    // Cancelling more than once must not panic or produce a second
    // completion; wait() consumes the connector and yields exactly one
    // outcome.
    connector.cancel();
    connector.cancel();

    let outcome = connector.wait().await;
    assert!(matches!(
        outcome,
        ConnectOutcome::Cancelled | ConnectOutcome::Failed { .. }
    ));
}

// ── Missed wakeups ───────────────────────────────────────────────

#[tokio::test]
async fn late_watchers_still_observe_terminal_state() {
    let (listener, target) = ephemeral_listener().await;
    drop(listener);

    let connector = Connector::spawn(target, ClientInfo::default(), fast_opts());

    // Watchers subscribing at staggered offsets around completion time:
    // some begin before the outcome, some long after.
    let mut watchers = Vec::new();
    for i in 0..10u64 {
        let mut rx = connector.watch_state();
        watchers.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(i * 20)).await;
            let state = *rx
                .wait_for(ConnectState::is_terminal)
                .await
                .expect("state channel closed before terminal state");
            state
        }));
    }

    let outcome = connector.wait().await;
    assert_eq!(outcome.code(), ReturnCode::Error);

    for watcher in watchers {
        let state = tokio::time::timeout(Duration::from_secs(5), watcher)
            .await
            .expect("watcher never observed a terminal state")
            .unwrap();
        assert_eq!(state, ConnectState::Failed);
    }
}

#[tokio::test]
async fn waiting_after_completion_returns_immediately() {
    let (listener, target) = ephemeral_listener().await;
    drop(listener);

    let connector = Connector::spawn(target, ClientInfo::default(), fast_opts());
    let mut state_rx = connector.watch_state();

    // Let negotiation finish before anybody waits.
    state_rx
        .wait_for(ConnectState::is_terminal)
        .await
        .unwrap();

    let outcome = tokio::time::timeout(Duration::from_millis(100), connector.wait())
        .await
        .expect("wait() after completion must not block");
    assert_eq!(outcome.code(), ReturnCode::Error);
}

// ── Session lifecycle ────────────────────────────────────────────

#[tokio::test]
async fn full_session_lifecycle() {
    let (listener, target) = ephemeral_listener().await;
    let host = tokio::spawn(async move {
        let mut framed = accept_and_welcome(listener, host_info()).await;
        let state = PlayerState {
            playback: Playback::Playing,
            volume: 80,
            shuffle: false,
            repeat: false,
        };
        framed.send(state.into_frame().unwrap()).await.unwrap();
        framed.send(Frame::bye()).await.unwrap();
    });

    let connector = Connector::spawn(target, ClientInfo::default(), fast_opts());
    let ConnectOutcome::Connected(mut conn) = connector.wait().await else {
        panic!("negotiation failed");
    };

    // The controller takes exclusive ownership; the connector is gone.
    let mut controller = CommController::new();
    let mut player = Player::bind(&mut conn).unwrap();
    controller.attach(conn);
    assert!(controller.is_connected());

    let event = tokio::time::timeout(Duration::from_secs(5), player.next_event())
        .await
        .expect("timeout")
        .expect("stream ended early");
    assert!(matches!(event, PlayerEvent::State(ref s) if s.volume == 80));

    // The host said bye; the stream drains to None.
    let end = tokio::time::timeout(Duration::from_secs(5), player.next_event())
        .await
        .expect("timeout");
    assert!(end.is_none());

    controller.disconnect();
    assert!(!controller.is_connected());
    controller.disconnect(); // idempotent

    host.await.unwrap();
}

#[tokio::test]
async fn controls_reach_the_host() {
    let (listener, target) = ephemeral_listener().await;
    let host = tokio::spawn(async move {
        let mut framed = accept_and_welcome(listener, host_info()).await;
        // Expect the play/pause control, skipping any keep-alives.
        loop {
            let frame = framed.next().await.unwrap().unwrap();
            match frame.message().unwrap() {
                Message::Ping => continue,
                msg => return msg,
            }
        }
    });

    let connector = Connector::spawn(target, ClientInfo::default(), fast_opts());
    let ConnectOutcome::Connected(mut conn) = connector.wait().await else {
        panic!("negotiation failed");
    };
    let player = Player::bind(&mut conn).unwrap();

    player.play_pause().await.unwrap();

    let received = tokio::time::timeout(Duration::from_secs(5), host)
        .await
        .expect("timeout")
        .unwrap();
    assert_eq!(received, Message::CtlPlayPause);
}

#![allow(unused)]
//! External feed over real HTTP.
//!
//! # What this covers
//!
//! - **Subscription**: the hyper connector opens a `text/event-stream` against
//!   a local axum server and every `data` message lands in the buffer.
//! - **Failure paths**: non-2xx responses, refused connections, unparseable
//!   endpoints and server-side closes all go `disconnected`.
//! - **Reconnect**: after a close the feed subscribes again, and replayed ids
//!   are not duplicated.
//!
//! # What this does NOT cover
//!
//! - Retry timing precision (see `feed_harness`, which runs on paused time)
//!
//! # Running
//!
//! ```sh
//! cargo test --test sse_harness
//! ```

mod common;
use common::fake_sse_server::FakeSseServer;
use common::*;

use std::time::Duration;

use pretty_assertions::assert_eq;
use tradewatch_core::ConnectionState::{Connected, Connecting, Disconnected};
use tradewatch_core::{ConnectionState, LogType};
use tradewatch_feeds::{FeedMode, FeedSettings, LiveFeed};

fn fast_retry() -> FeedSettings {
    FeedSettings {
        retry_delay: Duration::from_millis(100),
        ..settings(200)
    }
}

/// Apply signals until `status` is reached, returning every transition seen.
async fn wait_for_status(feed: &mut LiveFeed, status: ConnectionState) -> Vec<ConnectionState> {
    let mut seen = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while feed.status() != status || seen.is_empty() {
            seen.extend(feed.next_signal().await.transitions);
        }
    })
    .await
    .expect("status never reached");
    seen
}

async fn wait_for_len(feed: &mut LiveFeed, len: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while feed.len() < len {
            feed.next_signal().await;
        }
    })
    .await
    .expect("buffer never filled");
}

#[tokio::test]
async fn streams_messages_into_buffer() {
    let messages = PAYLOADS_VALID.iter().map(|p| p.to_string()).collect();
    let server = FakeSseServer::start(messages, true).await.unwrap();
    let mut feed = LiveFeed::new(FeedMode::External(server.url("/stream")), fast_retry());
    feed.start();

    wait_for_len(&mut feed, PAYLOADS_VALID.len()).await;
    assert_eq!(feed.status(), Connected);
    assert_ids!(feed.events(), ["p1", "p2", "p3", "p4", "p5"]);
    assert_eq!(feed.events()[0].kind, LogType::Trade);
    assert_eq!(feed.events()[4].amount.as_deref(), Some("120"));
    assert_eq!(server.hits(), 1);
}

/// A JSON object split over several `data` lines is reassembled.
#[tokio::test]
async fn multi_line_data_is_joined() {
    let server = FakeSseServer::start(
        vec!["{\"id\":\"ml\",\n\"type\":\"SUCCESS\",\n\"message\":\"two lines\"}".to_string()],
        true,
    )
    .await
    .unwrap();
    let mut feed = LiveFeed::new(FeedMode::External(server.url("/stream")), fast_retry());
    feed.start();

    wait_for_len(&mut feed, 1).await;
    assert_eq!(feed.events()[0].id, "ml");
    assert_eq!(feed.events()[0].message, "two lines");
}

#[tokio::test]
async fn malformed_messages_are_skipped_on_the_wire() {
    let mut messages: Vec<String> = PAYLOADS_MALFORMED.iter().map(|p| p.to_string()).collect();
    messages.push(PAYLOADS_VALID[1].to_string());
    let server = FakeSseServer::start(messages, true).await.unwrap();
    let mut feed = LiveFeed::new(FeedMode::External(server.url("/stream")), fast_retry());
    feed.start();

    wait_for_len(&mut feed, 1).await;
    assert_ids!(feed.events(), ["p2"]);
    assert_eq!(feed.status(), Connected);
}

#[tokio::test]
async fn error_status_disconnects() {
    let server = FakeSseServer::start(Vec::new(), true).await.unwrap();
    let mut feed = LiveFeed::new(FeedMode::External(server.url("/broken")), fast_retry());
    feed.start();

    let seen = wait_for_status(&mut feed, Disconnected).await;
    assert_eq!(seen, vec![Disconnected]);
    assert!(feed.is_empty());
}

#[tokio::test]
async fn refused_connection_disconnects() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut feed = LiveFeed::new(
        FeedMode::External(format!("http://{addr}/stream")),
        fast_retry(),
    );
    feed.start();
    let seen = wait_for_status(&mut feed, Disconnected).await;
    assert_eq!(seen, vec![Disconnected]);
}

#[tokio::test]
async fn unparseable_endpoint_disconnects() {
    let mut feed = LiveFeed::new(FeedMode::External("not a url".to_string()), fast_retry());
    feed.start();
    let seen = wait_for_status(&mut feed, Disconnected).await;
    assert_eq!(seen, vec![Disconnected]);
}

/// The server closing the stream triggers a fresh subscription; the replay
/// of an already-buffered id is rejected.
#[tokio::test]
async fn close_then_resubscribe() {
    let server = FakeSseServer::start(vec![PAYLOADS_VALID[0].to_string()], false)
        .await
        .unwrap();
    let mut feed = LiveFeed::new(FeedMode::External(server.url("/stream")), fast_retry());
    feed.start();

    wait_for_status(&mut feed, Disconnected).await;
    let seen = wait_for_status(&mut feed, Connected).await;
    assert_eq!(seen, vec![Connecting, Connected]);
    assert!(server.hits() >= 2);

    feed.pause();
    assert_ids!(feed.events(), ["p1"]);
    assert_eq!(feed.status(), Disconnected);
}

//! Fake `text/event-stream` server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /stream`: the configured messages as SSE `data` events, then
//!   either holds the connection open or closes it
//! - `GET /broken`: `500 Internal Server Error`
//!
//! # Example
//!
//! ```rust,no_run
//! let server = FakeSseServer::start(vec![PAYLOADS_VALID[0].to_string()], true).await.unwrap();
//! let feed = LiveFeed::new(FeedMode::External(server.url("/stream")), settings(200));
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, Sse},
    routing::get,
    Router,
};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use tokio::net::TcpListener;

#[derive(Clone)]
struct ServerState {
    messages: Arc<Vec<String>>,
    hold_open: bool,
    hits: Arc<AtomicUsize>,
}

/// Handle to the running fake SSE server.
pub struct FakeSseServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl FakeSseServer {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start(messages: Vec<String>, hold_open: bool) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let hits = Arc::new(AtomicUsize::new(0));
        let state = ServerState {
            messages: Arc::new(messages),
            hold_open,
            hits: Arc::clone(&hits),
        };

        let app = Router::new()
            .route("/stream", get(stream_events))
            .route("/broken", get(broken))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, hits })
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of `/stream` subscriptions accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn stream_events(
    State(state): State<ServerState>,
) -> Sse<BoxStream<'static, Result<Event, Infallible>>> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let messages: Vec<Result<Event, Infallible>> = state
        .messages
        .iter()
        .map(|m| Ok(Event::default().data(m.clone())))
        .collect();
    let events = stream::iter(messages);
    let body = if state.hold_open {
        events.chain(stream::pending()).boxed()
    } else {
        events.boxed()
    };
    Sse::new(body)
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

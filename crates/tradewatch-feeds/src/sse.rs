//! Server-Sent Events transport for the external feed.
//!
//! [`SseDecoder`] turns raw `text/event-stream` bytes into message payloads.
//! [`StreamConnector`] is the seam between the feed controller and the
//! network: [`HttpSseConnector`] speaks HTTP through hyper, while tests plug
//! in scripted connectors that never touch a socket.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use http_body_util::{BodyExt, Empty};
use hyper::body::Incoming;
use hyper::header::{ACCEPT, CACHE_CONTROL};
use hyper::{Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::error::FeedError;

/// Stream of message payloads from one subscription.
///
/// `Err` ends the subscription; the stream finishing means the server closed
/// it.
pub type PayloadStream = BoxStream<'static, Result<String, FeedError>>;

/// Opens a push subscription to an endpoint.
pub trait StreamConnector: Send + Sync + 'static {
    /// Resolves once the endpoint has accepted the subscription (the "open"
    /// signal), or fails with a transport error.
    fn connect(&self, endpoint: &str) -> BoxFuture<'static, Result<PayloadStream, FeedError>>;
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Incremental `text/event-stream` parser.
///
/// Only `data` fields are kept; `event`, `id`, `retry` and comment lines are
/// ignored. Multiple `data` lines in one message are joined with `\n`. A
/// message is dispatched on the blank line that ends it, so a trailing
/// unterminated message is dropped when the stream ends.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
    has_data: bool,
    seen_first_line: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns every message completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut messages = Vec::new();

        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(message) = self.process_line(&String::from_utf8_lossy(&line)) {
                messages.push(message);
            }
        }
        messages
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        let line = if self.seen_first_line {
            line
        } else {
            self.seen_first_line = true;
            line.strip_prefix('\u{feff}').unwrap_or(line)
        };

        if line.is_empty() {
            if !self.has_data {
                return None;
            }
            self.has_data = false;
            return Some(std::mem::take(&mut self.data).join("\n"));
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
            self.has_data = true;
        }
        None
    }
}

// ---------------------------------------------------------------------------
// HTTP connector
// ---------------------------------------------------------------------------

/// [`StreamConnector`] over plain HTTP/1.1 using hyper's pooled client.
#[derive(Clone)]
pub struct HttpSseConnector {
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HttpSseConnector {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HttpSseConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamConnector for HttpSseConnector {
    fn connect(&self, endpoint: &str) -> BoxFuture<'static, Result<PayloadStream, FeedError>> {
        let client = self.client.clone();
        let endpoint = endpoint.to_string();

        async move {
            let uri = endpoint.parse::<Uri>().map_err(|e| FeedError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
            let request = Request::get(uri)
                .header(ACCEPT, "text/event-stream")
                .header(CACHE_CONTROL, "no-cache")
                .body(Empty::<Bytes>::new())
                .map_err(|e| FeedError::InvalidEndpoint {
                    endpoint: endpoint.clone(),
                    reason: e.to_string(),
                })?;

            let response = client
                .request(request)
                .await
                .map_err(|e| FeedError::Transport(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::Status(status.as_u16()));
            }
            tracing::debug!(%endpoint, %status, "event stream opened");
            Ok(payload_stream(response.into_body()))
        }
        .boxed()
    }
}

struct BodyState {
    body: Incoming,
    decoder: SseDecoder,
    ready: VecDeque<String>,
    done: bool,
}

/// Adapt a response body into a [`PayloadStream`].
fn payload_stream(body: Incoming) -> PayloadStream {
    let state = BodyState {
        body,
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(message) = state.ready.pop_front() {
                return Some((Ok(message), state));
            }
            if state.done {
                return None;
            }
            match state.body.frame().await {
                Some(Ok(frame)) => {
                    if let Ok(data) = frame.into_data() {
                        let messages = state.decoder.push(&data);
                        state.ready.extend(messages);
                    }
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(FeedError::Transport(e.to_string())), state));
                }
                None => return None,
            }
        }
    })
    .boxed()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

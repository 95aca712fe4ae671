//! In-process [`StreamConnector`] whose connection attempts follow a script.
//!
//! Each `connect` call pops the next [`Attempt`]. Once the script runs out,
//! further attempts hang forever, which keeps the feed in `connecting`.
//!
//! # Example
//!
//! ```rust,no_run
//! let (connector, mut handle) = ScriptedConnector::new();
//! handle.push(Attempt::Fail("connection refused".into()));
//! let live = handle.push_live();
//! let feed = external_feed(connector);
//! live.send(Ok(PAYLOADS_VALID[0].to_string())).unwrap();
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tradewatch_feeds::{FeedError, PayloadStream, StreamConnector};

/// Sender half of a live scripted stream. Dropping it closes the stream.
pub type LiveSender = mpsc::UnboundedSender<Result<String, FeedError>>;

/// What one connection attempt does.
pub enum Attempt {
    /// The connect itself fails with a transport error.
    Fail(String),
    /// The subscription opens, yields these items, then the server closes it.
    Replay(Vec<Result<String, FeedError>>),
    /// The subscription opens and yields whatever the test sends.
    Live(mpsc::UnboundedReceiver<Result<String, FeedError>>),
}

#[derive(Default)]
struct Script {
    attempts: Mutex<VecDeque<Attempt>>,
    connects: AtomicUsize,
    endpoints: Mutex<Vec<String>>,
}

pub struct ScriptedConnector {
    script: Arc<Script>,
}

/// Test-side handle for adding attempts and counting connects.
#[derive(Clone)]
pub struct ScriptHandle {
    script: Arc<Script>,
}

impl ScriptedConnector {
    pub fn new() -> (Arc<dyn StreamConnector>, ScriptHandle) {
        let script = Arc::new(Script::default());
        let connector = Arc::new(ScriptedConnector {
            script: Arc::clone(&script),
        });
        (connector, ScriptHandle { script })
    }
}

impl ScriptHandle {
    pub fn push(&self, attempt: Attempt) {
        self.script.attempts.lock().unwrap().push_back(attempt);
    }

    /// Queue a live attempt and return the sender that feeds it.
    pub fn push_live(&self) -> LiveSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push(Attempt::Live(rx));
        tx
    }

    /// Number of `connect` calls so far.
    pub fn connects(&self) -> usize {
        self.script.connects.load(Ordering::SeqCst)
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.script.endpoints.lock().unwrap().clone()
    }
}

impl StreamConnector for ScriptedConnector {
    fn connect(&self, endpoint: &str) -> BoxFuture<'static, Result<PayloadStream, FeedError>> {
        self.script.connects.fetch_add(1, Ordering::SeqCst);
        self.script
            .endpoints
            .lock()
            .unwrap()
            .push(endpoint.to_string());
        let attempt = self.script.attempts.lock().unwrap().pop_front();

        async move {
            match attempt {
                None => futures::future::pending().await,
                Some(Attempt::Fail(reason)) => Err(FeedError::Transport(reason)),
                Some(Attempt::Replay(items)) => Ok(futures::stream::iter(items).boxed()),
                Some(Attempt::Live(rx)) => Ok(futures::stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                })
                .boxed()),
            }
        }
        .boxed()
    }
}

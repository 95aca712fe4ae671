//! tradewatch-feeds: the live side of tradewatch.
//!
//! [`LiveFeed`] owns the bounded buffer and the connection state. It is driven
//! by one of two sources:
//!
//! - [`synthetic`]: a seeded generator on a fixed timer
//! - [`sse`]: a Server-Sent Events subscription, decoded by [`decode`]

pub mod controller;
pub mod decode;
pub mod error;
pub mod sse;
pub mod synthetic;

pub use controller::{FeedMode, FeedSettings, LiveFeed, PumpReport, SourceSignal, DEFAULT_CAPACITY};
pub use error::FeedError;
pub use sse::{HttpSseConnector, PayloadStream, SseDecoder, StreamConnector};
pub use synthetic::SyntheticGenerator;

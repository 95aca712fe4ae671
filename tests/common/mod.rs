//! Shared test utilities for tradewatch integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Timer-driven helpers are deterministic under
//! `#[tokio::test(start_paused = true)]`.

pub mod assertions;
pub mod builders;
pub mod fake_sse_server;
pub mod fixtures;
pub mod scripted_connector;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

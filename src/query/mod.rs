//! Query execution.
//!
//! [`engine`] holds the backward-search state machine shared by the two
//! statistics. A [`QueryEngine`](engine::QueryEngine) borrows a loaded
//! index (and optionally a document array) and serves any number of
//! queries; it keeps no per-call state, so one engine may be shared by
//! many threads.

pub mod engine;

pub use engine::{MsOutput, PmlOutput, QueryEngine};

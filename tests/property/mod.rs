//! Property test modules:
//! - window.rs: sliding window arithmetic
//! - breaker.rs: state machine invariants over arbitrary outcome sequences
//! - bulkhead.rs: the concurrency bound under arbitrary interleavings

pub mod breaker;
pub mod bulkhead;

//! Core infrastructure shared by the callgate crates.
//!
//! This crate provides the pieces every component of the resilient-call
//! gateway relies on:
//! - the event/observer system used for observability
//! - [`InvokeError`], the classification of everything that can go wrong
//!   during a guarded call

pub mod error;
pub mod events;

pub use error::InvokeError;
pub use events::{CallEvent, EventListener, EventListeners, FnListener};

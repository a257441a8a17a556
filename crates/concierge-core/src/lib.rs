//! concierge-core — Pure types, rule table and keyword responder.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod error;
pub mod responder;
pub mod text_prep;
pub mod types;

pub use error::{CaptureError, ConciergeError, Result};

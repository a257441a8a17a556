//! concierge-lib — Voice concierge engine.
//!
//! Mic session control, speech output, conversation log and view, and the
//! console host bindings. Host capabilities sit behind the `SpeechCapture`
//! and `SpeechSynthesizer` traits so the session logic runs without a browser.
//! Depends on concierge-core for types, the rule table and the responder.

pub mod concierge;
pub mod console;
pub mod conversation;
pub mod mic;
pub mod speech;
pub mod view;

// Re-export concierge-core for convenience
pub use concierge_core;

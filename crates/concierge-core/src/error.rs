//! Error types for the voice concierge.

use thiserror::Error;

/// Result type alias for concierge operations.
pub type Result<T> = std::result::Result<T, ConciergeError>;

/// Errors surfaced by the concierge.
///
/// None of these are fatal: capture problems return the mic to idle and a
/// missing rule match is answered with the fallback response, not an error.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// The host has no speech-capture capability.
    #[error("speech recognition is not supported on this host")]
    CapabilityUnavailable,

    /// The capture session reported an error.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Locale code outside the supported set.
    #[error("unknown locale '{0}'; supported: en-US, hi-IN, kn-IN")]
    UnknownLocale(String),

    /// Invalid configuration or rule table.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed JSON input.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error reported by a speech-capture session.
///
/// Variants mirror the error codes browser recognizers emit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("no speech detected")]
    NoSpeech,
    #[error("capture aborted")]
    Aborted,
    #[error("no audio input device")]
    AudioCapture,
    #[error("network unavailable for recognition")]
    Network,
    #[error("microphone permission denied")]
    NotAllowed,
    #[error("recognition service not allowed")]
    ServiceNotAllowed,
    #[error("language not supported by recognizer")]
    LanguageNotSupported,
    #[error("{0}")]
    Other(String),
}

impl CaptureError {
    /// Map a host error code (`"no-speech"`, `"not-allowed"`, ...) to a variant.
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }
}

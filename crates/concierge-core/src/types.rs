//! Shared types for the voice concierge.
//!
//! Kept free of tokio and host bindings so front ends can depend on the
//! types alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};

/// Greeting the conversation opens with.
pub const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

// ─── Conversation types ────────────────────────────────────────────────────

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation log. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

// ─── Locale / theme ────────────────────────────────────────────────────────

/// Recognition and synthesis locale offered by the language selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "hi-IN")]
    HiIn,
    #[serde(rename = "kn-IN")]
    KnIn,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::EnUs, Locale::HiIn, Locale::KnIn];

    /// BCP-47 code passed to the host capability.
    pub fn code(self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::HiIn => "hi-IN",
            Locale::KnIn => "kn-IN",
        }
    }

    /// Label shown in the language selector.
    pub fn label(self) -> &'static str {
        match self {
            Locale::EnUs => "English",
            Locale::HiIn => "Hindi",
            Locale::KnIn => "Kannada",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ConciergeError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConciergeError::UnknownLocale(s.to_string()))
    }
}

/// Colour scheme of the conversation view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ConciergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ConciergeError::Config(format!("unknown theme '{other}'"))),
        }
    }
}

// ─── Capture types ─────────────────────────────────────────────────────────

/// Settings handed to the host recognizer for one capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    pub locale: Locale,
    pub interim_results: bool,
    pub continuous: bool,
    pub max_alternatives: u32,
}

impl CaptureConfig {
    /// Single-shot, final-only, one-best capture in `locale`.
    pub fn single_shot(locale: Locale) -> Self {
        Self {
            locale,
            interim_results: false,
            continuous: false,
            max_alternatives: 1,
        }
    }
}

/// Observable mic controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MicState {
    #[default]
    Idle,
    Listening,
    Finalizing,
}

// ─── Config ────────────────────────────────────────────────────────────────

/// Concierge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConciergeConfig {
    pub locale: Locale,
    pub theme: Theme,
    pub greeting: String,
    /// Speak assistant replies aloud.
    pub speak_replies: bool,
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            theme: Theme::default(),
            greeting: DEFAULT_GREETING.into(),
            speak_replies: true,
        }
    }
}

impl ConciergeConfig {
    /// Parse a JSON config; absent fields keep their defaults, unknown keys
    /// are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ─── Status ────────────────────────────────────────────────────────────────

/// Concierge status snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConciergeStatus {
    pub mic: MicState,
    pub speaking: bool,
    pub locale: Locale,
    pub theme: Theme,
    pub messages: usize,
}

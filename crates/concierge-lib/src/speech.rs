//! Speech output — one utterance at a time, each new call preempts the last.
//!
//! Utterances get increasing ids. Only start/end events for the current
//! utterance move the `speaking` flag; events from preempted utterances are
//! ignored, and cancellation clears the flag itself, so it cannot stay stuck
//! on `true` when a host never reports the end of a cancelled utterance.

use std::fmt;

use tokio::sync::watch;
use tracing::debug;

use concierge_core::types::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One unit of synthesized speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub locale: Locale,
}

/// Lifecycle event reported by the host synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechEvent {
    Started(UtteranceId),
    Ended(UtteranceId),
}

/// Host text-to-speech capability.
pub trait SpeechSynthesizer {
    fn speak(&mut self, utterance: Utterance);
    fn cancel_all(&mut self);
}

pub struct SpeechOutput<S> {
    synth: S,
    current: Option<UtteranceId>,
    next_id: u64,
    speaking_tx: watch::Sender<bool>,
}

impl<S: SpeechSynthesizer> SpeechOutput<S> {
    pub fn new(synth: S) -> Self {
        let (speaking_tx, _) = watch::channel(false);
        Self {
            synth,
            current: None,
            next_id: 0,
            speaking_tx,
        }
    }

    pub fn is_speaking(&self) -> bool {
        *self.speaking_tx.borrow()
    }

    /// Subscribe to the `speaking` flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.speaking_tx.subscribe()
    }

    pub fn synth(&self) -> &S {
        &self.synth
    }

    /// Cancel whatever is playing and speak `text`. Blank text only cancels.
    pub fn speak(&mut self, text: &str, locale: Locale) -> Option<UtteranceId> {
        self.cancel();

        if text.trim().is_empty() {
            return None;
        }

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        self.current = Some(id);
        debug!("speech: utterance {id} ({} chars, {locale})", text.len());
        self.synth.speak(Utterance {
            id,
            text: text.to_string(),
            locale,
        });
        Some(id)
    }

    /// Stop all speech immediately.
    pub fn cancel(&mut self) {
        if let Some(id) = self.current.take() {
            debug!("speech: cancelling utterance {id}");
        }
        self.synth.cancel_all();
        self.set_speaking(false);
    }

    pub fn handle_event(&mut self, event: SpeechEvent) {
        match event {
            SpeechEvent::Started(id) if self.current == Some(id) => self.set_speaking(true),
            SpeechEvent::Ended(id) if self.current == Some(id) => {
                self.current = None;
                self.set_speaking(false);
            }
            other => debug!("speech: ignoring {other:?} for preempted utterance"),
        }
    }

    fn set_speaking(&self, speaking: bool) {
        self.speaking_tx.send_if_modified(|s| {
            let changed = *s != speaking;
            *s = speaking;
            changed
        });
    }
}

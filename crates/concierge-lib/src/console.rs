//! Console host bindings — typed lines stand in for recognized speech.
//!
//! Both bindings report back over unbounded tokio channels, the same way a
//! browser delivers recognition and synthesis callbacks: asynchronously and in
//! order. The event loop drains the receivers and feeds the [`Concierge`].
//!
//! [`Concierge`]: crate::concierge::Concierge

use tokio::sync::mpsc;
use tracing::debug;

use concierge_core::error::Result;
use concierge_core::types::CaptureConfig;

use crate::mic::{CaptureEvent, CaptureEventKind, SessionId, SpeechCapture};
use crate::speech::{SpeechEvent, SpeechSynthesizer, Utterance};

pub struct ConsoleCapture {
    available: bool,
    active: Option<SessionId>,
    tx: mpsc::UnboundedSender<CaptureEvent>,
}

impl ConsoleCapture {
    pub fn new(available: bool) -> (Self, mpsc::UnboundedReceiver<CaptureEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let capture = Self {
            available,
            active: None,
            tx,
        };
        (capture, rx)
    }

    /// Deliver `line` as the final result of the open session, followed by
    /// the end event. Returns `false` when no session is open.
    pub fn hear(&mut self, line: &str) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        let _ = self
            .tx
            .send(CaptureEvent::new(id, CaptureEventKind::Final(line.to_string())));
        let _ = self.tx.send(CaptureEvent::new(id, CaptureEventKind::End));
        true
    }
}

impl SpeechCapture for ConsoleCapture {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self, session: SessionId, config: &CaptureConfig) -> Result<()> {
        debug!("console capture: session {session} open ({})", config.locale);
        self.active = Some(session);
        Ok(())
    }

    fn stop(&mut self, session: SessionId) {
        if self.active == Some(session) {
            self.active = None;
        }
    }

    fn abort(&mut self, session: SessionId) {
        if self.active == Some(session) {
            self.active = None;
            let _ = self.tx.send(CaptureEvent::new(session, CaptureEventKind::End));
        }
    }
}

/// Synthesizer that "plays" utterances instantly, optionally echoing them to stderr.
pub struct ConsoleSynthesizer {
    echo: bool,
    tx: mpsc::UnboundedSender<SpeechEvent>,
}

impl ConsoleSynthesizer {
    pub fn new(echo: bool) -> (Self, mpsc::UnboundedReceiver<SpeechEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { echo, tx }, rx)
    }
}

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn speak(&mut self, utterance: Utterance) {
        let _ = self.tx.send(SpeechEvent::Started(utterance.id));
        if self.echo {
            eprintln!("🔊 [{}] {}", utterance.locale, utterance.text);
        }
        let _ = self.tx.send(SpeechEvent::Ended(utterance.id));
    }

    fn cancel_all(&mut self) {
        debug!("console synth: cancel all");
    }
}

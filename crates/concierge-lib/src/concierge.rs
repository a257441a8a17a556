//! Concierge — wires mic sessions, the responder, speech output and the log together.

use tracing::{debug, info};

use concierge_core::error::Result;
use concierge_core::responder::RuleTable;
use concierge_core::types::{ConciergeConfig, ConciergeStatus, Locale, Message, Role, Theme};

use crate::conversation::Conversation;
use crate::mic::{CaptureEvent, MicController, SpeechCapture, StartOutcome};
use crate::speech::{SpeechEvent, SpeechOutput, SpeechSynthesizer};

pub struct Concierge<C, S> {
    mic: MicController<C>,
    speech: SpeechOutput<S>,
    rules: RuleTable,
    conversation: Conversation,
    config: ConciergeConfig,
}

impl<C: SpeechCapture, S: SpeechSynthesizer> Concierge<C, S> {
    pub fn new(config: ConciergeConfig, rules: RuleTable, capture: C, synth: S) -> Self {
        Self {
            mic: MicController::new(capture),
            speech: SpeechOutput::new(synth),
            rules,
            conversation: Conversation::with_greeting(&config.greeting),
            config,
        }
    }

    /// Open a capture session in the current locale.
    ///
    /// Speech output is cancelled first so the recognizer does not hear the
    /// assistant's own voice.
    pub fn start_listening(&mut self) -> Result<StartOutcome> {
        if self.mic.capture().is_available() && !self.mic.is_listening() {
            self.speech.cancel();
        }
        self.mic.start(self.config.locale)
    }

    pub fn stop_listening(&mut self) {
        self.mic.stop();
    }

    /// Feed a capture event. Returns the assistant reply when it completed an exchange.
    pub fn on_capture_event(&mut self, event: CaptureEvent) -> Option<String> {
        let transcript = self.mic.handle_event(event)?;
        self.handle_transcript(&transcript)
    }

    pub fn on_speech_event(&mut self, event: SpeechEvent) {
        self.speech.handle_event(event);
    }

    /// Answer one transcript: log it, log the reply and speak the reply.
    ///
    /// Blank transcripts are ignored. The reply is not spoken while the mic is
    /// listening, which would feed it back into the recognizer.
    pub fn handle_transcript(&mut self, transcript: &str) -> Option<String> {
        if transcript.trim().is_empty() {
            debug!("concierge: ignoring blank transcript");
            return None;
        }

        let reply = match self.rules.find(transcript) {
            Some(rule) => {
                debug!("concierge: matched rule {:?}", rule.keywords);
                rule.response.clone()
            }
            None => {
                debug!("concierge: no rule matched");
                self.rules.fallback().to_string()
            }
        };

        self.conversation.push(Message::user(transcript));
        self.conversation.push(Message::assistant(reply.clone()));

        if self.config.speak_replies && !self.mic.is_listening() {
            self.speech.speak(&reply, self.config.locale);
        }

        Some(reply)
    }

    pub fn set_locale(&mut self, locale: Locale) {
        if locale != self.config.locale {
            info!("concierge: locale {} -> {locale}", self.config.locale);
            self.config.locale = locale;
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.config.theme = self.config.theme.toggled();
        self.config.theme
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    pub fn theme(&self) -> Theme {
        self.config.theme
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Most recent assistant reply, the greeting if nothing was asked yet.
    pub fn last_reply(&self) -> Option<&str> {
        self.conversation
            .last_from(Role::Assistant)
            .map(|m| m.text.as_str())
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn mic(&self) -> &MicController<C> {
        &self.mic
    }

    pub fn mic_mut(&mut self) -> &mut MicController<C> {
        &mut self.mic
    }

    pub fn speech(&self) -> &SpeechOutput<S> {
        &self.speech
    }

    pub fn is_listening(&self) -> bool {
        self.mic.is_listening()
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.is_speaking()
    }

    pub fn status(&self) -> ConciergeStatus {
        ConciergeStatus {
            mic: self.mic.state(),
            speaking: self.speech.is_speaking(),
            locale: self.config.locale,
            theme: self.config.theme,
            messages: self.conversation.len(),
        }
    }
}

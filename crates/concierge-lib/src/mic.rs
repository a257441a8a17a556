//! Mic session controller — single-shot capture with an at-most-once transcript guard.
//!
//! ```text
//! start() ─▶ Listening ──Final──▶ Finalizing ─▶ Idle   (transcript returned once)
//!                │ ──Error/End──▶ Idle                 (no transcript)
//!                └── stop() ────▶ Idle                 (silent cancel)
//! ```
//!
//! Every `start()` allocates a fresh [`SessionId`] and resets the session's
//! `handled` flag. Events carrying another session's id are dropped, and a
//! second final result for the current session is dropped too, so hosts that
//! redeliver the final event cannot trigger the transcript handler twice.

use std::fmt;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use concierge_core::error::{CaptureError, ConciergeError, Result};
use concierge_core::types::{CaptureConfig, Locale, MicState};

/// Identifies one capture session (one `start()` call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host speech-recognition capability.
///
/// Implementations deliver results back as [`CaptureEvent`]s tagged with the
/// session id passed to `start`.
pub trait SpeechCapture {
    fn is_available(&self) -> bool;
    fn start(&mut self, session: SessionId, config: &CaptureConfig) -> Result<()>;
    /// Graceful stop after a result has arrived.
    fn stop(&mut self, session: SessionId);
    /// Forced teardown; pending results are discarded.
    fn abort(&mut self, session: SessionId);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEventKind {
    Interim(String),
    Final(String),
    Error(CaptureError),
    End,
}

/// Event delivered by the host recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEvent {
    pub session: SessionId,
    pub kind: CaptureEventKind,
}

impl CaptureEvent {
    pub fn new(session: SessionId, kind: CaptureEventKind) -> Self {
        Self { session, kind }
    }
}

/// Outcome of [`MicController::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(SessionId),
    /// A session is already open; nothing changed.
    AlreadyListening(SessionId),
}

#[derive(Debug)]
struct ActiveSession {
    id: SessionId,
    handled: bool,
}

pub struct MicController<C> {
    capture: C,
    session: Option<ActiveSession>,
    next_id: u64,
    state_tx: watch::Sender<MicState>,
}

impl<C: SpeechCapture> MicController<C> {
    pub fn new(capture: C) -> Self {
        let (state_tx, _) = watch::channel(MicState::Idle);
        Self {
            capture,
            session: None,
            next_id: 0,
            state_tx,
        }
    }

    pub fn state(&self) -> MicState {
        *self.state_tx.borrow()
    }

    pub fn is_listening(&self) -> bool {
        self.state() == MicState::Listening
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<MicState> {
        self.state_tx.subscribe()
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    pub fn capture_mut(&mut self) -> &mut C {
        &mut self.capture
    }

    /// Open a new single-shot capture session in `locale`.
    pub fn start(&mut self, locale: Locale) -> Result<StartOutcome> {
        if !self.capture.is_available() {
            warn!("mic: speech capture unavailable on this host");
            return Err(ConciergeError::CapabilityUnavailable);
        }

        if self.is_listening() {
            if let Some(session) = &self.session {
                debug!("mic: start ignored, session {} already listening", session.id);
                return Ok(StartOutcome::AlreadyListening(session.id));
            }
        }

        self.next_id += 1;
        let id = SessionId(self.next_id);
        self.session = Some(ActiveSession { id, handled: false });

        let config = CaptureConfig::single_shot(locale);
        if let Err(e) = self.capture.start(id, &config) {
            warn!("mic: session {id} failed to start: {e}");
            self.close_session();
            self.set_state(MicState::Idle);
            return Err(e);
        }

        info!("mic: session {id} listening ({locale})");
        self.set_state(MicState::Listening);
        Ok(StartOutcome::Started(id))
    }

    /// Cancel the open session without producing a transcript.
    pub fn stop(&mut self) {
        if !self.is_listening() {
            return;
        }
        if let Some(id) = self.close_session() {
            self.capture.abort(id);
            info!("mic: session {id} stopped by user");
        }
        self.set_state(MicState::Idle);
    }

    /// Feed one host event. Returns the transcript the first time a final
    /// result arrives for the current session, `None` otherwise.
    pub fn handle_event(&mut self, event: CaptureEvent) -> Option<String> {
        let Some(session) = self.session.as_mut().filter(|s| s.id == event.session) else {
            debug!("mic: dropping event for stale session {}", event.session);
            return None;
        };

        match event.kind {
            CaptureEventKind::Interim(text) => {
                debug!("mic: interim result ({} chars)", text.len());
                None
            }

            CaptureEventKind::Final(text) => {
                if session.handled {
                    debug!("mic: duplicate final result for session {}", event.session);
                    return None;
                }
                session.handled = true;
                let id = session.id;

                self.set_state(MicState::Finalizing);
                self.capture.stop(id);
                self.set_state(MicState::Idle);
                debug!("mic: session {id} final result ({} chars)", text.len());
                Some(text)
            }

            CaptureEventKind::Error(err) => {
                let closing = !session.handled;
                session.handled = true;
                if closing {
                    warn!("mic: session {} error: {err}", event.session);
                    self.set_state(MicState::Idle);
                } else {
                    debug!("mic: late error for session {}: {err}", event.session);
                }
                None
            }

            CaptureEventKind::End => {
                if !session.handled {
                    session.handled = true;
                    debug!("mic: session {} ended without a result", event.session);
                    self.set_state(MicState::Idle);
                }
                None
            }
        }
    }

    /// Mark the current session handled and return its id.
    fn close_session(&mut self) -> Option<SessionId> {
        self.session.as_mut().map(|s| {
            s.handled = true;
            s.id
        })
    }

    fn set_state(&self, state: MicState) {
        self.state_tx.send_replace(state);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records host calls instead of touching a recognizer.
    #[derive(Debug, Default)]
    pub(crate) struct FakeCapture {
        pub unavailable: bool,
        pub fail_start: bool,
        pub started: Vec<(SessionId, CaptureConfig)>,
        pub stopped: Vec<SessionId>,
        pub aborted: Vec<SessionId>,
    }

    impl SpeechCapture for FakeCapture {
        fn is_available(&self) -> bool {
            !self.unavailable
        }

        fn start(&mut self, session: SessionId, config: &CaptureConfig) -> Result<()> {
            if self.fail_start {
                return Err(CaptureError::NotAllowed.into());
            }
            self.started.push((session, config.clone()));
            Ok(())
        }

        fn stop(&mut self, session: SessionId) {
            self.stopped.push(session);
        }

        fn abort(&mut self, session: SessionId) {
            self.aborted.push(session);
        }
    }

    fn started(mic: &mut MicController<FakeCapture>) -> SessionId {
        match mic.start(Locale::EnUs).unwrap() {
            StartOutcome::Started(id) => id,
            other => panic!("expected a new session, got {other:?}"),
        }
    }

    fn final_result(id: SessionId, text: &str) -> CaptureEvent {
        CaptureEvent::new(id, CaptureEventKind::Final(text.into()))
    }

    #[test]
    fn start_configures_single_shot_session() {
        let mut mic = MicController::new(FakeCapture::default());
        let id = mic.start(Locale::HiIn).unwrap();
        assert_eq!(id, StartOutcome::Started(SessionId(1)));
        assert_eq!(mic.state(), MicState::Listening);
        let (_, cfg) = &mic.capture().started[0];
        assert_eq!(cfg, &CaptureConfig::single_shot(Locale::HiIn));
    }

    #[test]
    fn unavailable_capability_is_an_error() {
        let mut mic = MicController::new(FakeCapture {
            unavailable: true,
            ..Default::default()
        });
        assert!(matches!(
            mic.start(Locale::EnUs),
            Err(ConciergeError::CapabilityUnavailable)
        ));
        assert_eq!(mic.state(), MicState::Idle);
        assert!(mic.capture().started.is_empty());
    }

    #[test]
    fn host_start_failure_returns_to_idle() {
        let mut mic = MicController::new(FakeCapture {
            fail_start: true,
            ..Default::default()
        });
        assert!(matches!(
            mic.start(Locale::EnUs),
            Err(ConciergeError::Capture(CaptureError::NotAllowed))
        ));
        assert_eq!(mic.state(), MicState::Idle);
    }

    #[test]
    fn final_result_returned_once() {
        let mut mic = MicController::new(FakeCapture::default());
        let id = started(&mut mic);

        let first = mic.handle_event(final_result(id, "wifi please"));
        assert_eq!(first.as_deref(), Some("wifi please"));
        assert_eq!(mic.handle_event(final_result(id, "wifi please")), None);

        assert_eq!(mic.state(), MicState::Idle);
        assert_eq!(mic.capture().stopped, vec![id]);
    }

    #[test]
    fn duplicate_finals_invoke_handler_once() {
        let mut mic = MicController::new(FakeCapture::default());
        let mut calls = 0;
        let id = started(&mut mic);
        for event in [final_result(id, "gym"), final_result(id, "gym")] {
            if mic.handle_event(event).is_some() {
                calls += 1;
            }
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn guard_resets_on_each_start() {
        let mut mic = MicController::new(FakeCapture::default());
        let first = started(&mut mic);
        assert!(mic.handle_event(final_result(first, "one")).is_some());

        let second = started(&mut mic);
        assert_ne!(first, second);
        assert!(mic.handle_event(final_result(second, "two")).is_some());
    }

    #[test]
    fn stale_session_events_dropped() {
        let mut mic = MicController::new(FakeCapture::default());
        let first = started(&mut mic);
        mic.stop();
        let second = started(&mut mic);

        assert_eq!(mic.handle_event(final_result(first, "late")), None);
        assert_eq!(mic.state(), MicState::Listening);
        assert_eq!(mic.handle_event(final_result(second, "now")).as_deref(), Some("now"));
    }

    #[test]
    fn stop_before_final_is_silent() {
        let mut mic = MicController::new(FakeCapture::default());
        let id = started(&mut mic);
        mic.stop();

        assert_eq!(mic.state(), MicState::Idle);
        assert_eq!(mic.capture().aborted, vec![id]);
        assert_eq!(mic.handle_event(final_result(id, "too late")), None);
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let mut mic = MicController::new(FakeCapture::default());
        mic.stop();
        assert!(mic.capture().aborted.is_empty());
        assert_eq!(mic.state(), MicState::Idle);
    }

    #[test]
    fn start_while_listening_is_noop() {
        let mut mic = MicController::new(FakeCapture::default());
        let id = started(&mut mic);
        assert_eq!(mic.start(Locale::EnUs).unwrap(), StartOutcome::AlreadyListening(id));
        assert_eq!(mic.capture().started.len(), 1);
    }

    #[test]
    fn error_returns_to_idle_without_transcript() {
        let mut mic = MicController::new(FakeCapture::default());
        let id = started(&mut mic);
        let err = CaptureEvent::new(id, CaptureEventKind::Error(CaptureError::NoSpeech));
        assert_eq!(mic.handle_event(err), None);
        assert_eq!(mic.state(), MicState::Idle);
        assert_eq!(mic.handle_event(final_result(id, "after error")), None);
    }

    #[test]
    fn end_without_result_returns_to_idle() {
        let mut mic = MicController::new(FakeCapture::default());
        let id = started(&mut mic);
        assert_eq!(mic.handle_event(CaptureEvent::new(id, CaptureEventKind::End)), None);
        assert_eq!(mic.state(), MicState::Idle);
    }

    #[test]
    fn interim_results_keep_listening() {
        let mut mic = MicController::new(FakeCapture::default());
        let id = started(&mut mic);
        let interim = CaptureEvent::new(id, CaptureEventKind::Interim("wi".into()));
        assert_eq!(mic.handle_event(interim), None);
        assert!(mic.is_listening());
    }

    #[test]
    fn state_changes_are_observable() {
        let mut mic = MicController::new(FakeCapture::default());
        let rx = mic.subscribe();
        let id = started(&mut mic);
        assert_eq!(*rx.borrow(), MicState::Listening);
        mic.handle_event(final_result(id, "pool"));
        assert_eq!(*rx.borrow(), MicState::Idle);
    }
}

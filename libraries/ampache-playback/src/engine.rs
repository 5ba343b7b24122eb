//! Playback engine state machine
//!
//! Wraps the single media backend and enforces its lifecycle:
//!
//! ```text
//! Idle ──play──▶ Initialized ─▶ Prepared ─▶ Playing ◀──resume── Paused
//!                                              │ ──────pause──────▶ │
//!   any ──stop──▶ Stopped        Playing ──completion──▶ Stopped
//!   backend failure ──▶ Error (stop required)      release ──▶ Ended
//! ```
//!
//! Progress is derived from a monotonic [`Clock`], not from the backend, so
//! buffering stalls in the backend do not make the reported position drift.

use crate::backend::MediaBackend;
use crate::clock::Clock;
use crate::error::{PlaybackError, Result};
use crate::types::EngineState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Receives the generation of the track that ran to its end
pub type CompletionListener = Arc<dyn Fn(u64) + Send + Sync>;

/// State machine around one media backend
///
/// Every started track gets a new generation number. Completion signals carry
/// the generation they were armed with, so a signal that arrives after the
/// track was replaced or stopped can be recognized as stale.
pub struct PlaybackEngine {
    backend: Box<dyn MediaBackend>,
    clock: Arc<dyn Clock>,
    state: EngineState,
    current_url: Option<String>,
    started_at: Duration,
    paused_at: Option<Duration>,
    generation: u64,
    listener: Option<CompletionListener>,
}

impl PlaybackEngine {
    pub fn new(backend: Box<dyn MediaBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            state: EngineState::Idle,
            current_url: None,
            started_at: Duration::ZERO,
            paused_at: None,
            generation: 0,
            listener: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// URL of the loaded stream, `None` when idle or stopped
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Generation of the current (or last) track
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Register the end-of-track listener
    ///
    /// Takes effect immediately when a track is playing.
    pub fn set_completion_listener(&mut self, listener: Option<CompletionListener>) {
        self.listener = listener;
        if matches!(self.state, EngineState::Playing | EngineState::Paused) {
            self.arm_completion();
        }
    }

    /// Load `url` and start playing it, tearing down whatever played before
    ///
    /// # Errors
    /// `InvalidState` after a failure (until `stop`) or after `release`;
    /// `Backend` when the stream cannot be loaded, which leaves the engine
    /// in `Error`.
    pub fn play_url(&mut self, url: &str) -> Result<()> {
        if matches!(self.state, EngineState::Error | EngineState::Ended) {
            return Err(self.invalid("play"));
        }

        debug!(url = %url, from = ?self.state, "Playing stream");
        self.load_and_start(url).map_err(|e| self.fail(e))
    }

    fn load_and_start(&mut self, url: &str) -> Result<()> {
        match self.state {
            EngineState::Idle => {}
            EngineState::Initialized | EngineState::Prepared | EngineState::Stopped => {
                self.reset()?;
            }
            EngineState::Playing | EngineState::Paused => {
                self.halt()?;
                self.reset()?;
            }
            EngineState::Error | EngineState::Ended => return Err(self.invalid("play")),
        }

        // Completions armed for the previous track are stale from here on
        self.generation += 1;

        self.backend.set_source(url)?;
        self.current_url = Some(url.to_string());
        self.state = EngineState::Initialized;

        self.backend.prepare()?;
        self.paused_at = None;
        self.state = EngineState::Prepared;

        self.arm_completion();
        self.backend.start()?;
        self.started_at = self.clock.now();
        self.state = EngineState::Playing;
        Ok(())
    }

    /// Pause the playing track, freezing progress
    pub fn pause(&mut self) -> Result<()> {
        if self.state != EngineState::Playing {
            return Err(self.invalid("pause"));
        }

        self.backend.pause().map_err(|e| self.fail(e))?;
        self.paused_at = Some(self.clock.now());
        self.state = EngineState::Paused;
        Ok(())
    }

    /// Continue a paused track, or restart the loaded stream otherwise
    ///
    /// The time spent paused is excluded from progress.
    pub fn resume(&mut self) -> Result<()> {
        match self.state {
            EngineState::Playing => Ok(()),
            EngineState::Paused => {
                self.backend.start().map_err(|e| self.fail(e))?;
                let now = self.clock.now();
                if let Some(paused_at) = self.paused_at.take() {
                    self.started_at += now.saturating_sub(paused_at);
                }
                self.state = EngineState::Playing;
                Ok(())
            }
            EngineState::Error | EngineState::Ended => Err(self.invalid("resume")),
            _ => match self.current_url.clone() {
                Some(url) => self.play_url(&url),
                None => Err(self.invalid("resume")),
            },
        }
    }

    /// Stop playback from any state
    ///
    /// Clears an `Error` condition. Backend failures while stopping are
    /// logged; the engine is `Stopped` afterwards regardless.
    pub fn stop(&mut self) {
        if self.state == EngineState::Ended {
            return;
        }

        self.disarm_completion();
        if let Err(e) = self.halt() {
            warn!(error = %e, "Backend failed to stop");
        }
    }

    /// Handle an end-of-track signal armed with `generation`
    ///
    /// Only accepted while `Playing`: a signal that arrives after a pause (or
    /// for a replaced track) is stale and leaves the engine untouched.
    /// Otherwise the engine is `Stopped` when this returns.
    pub fn complete(&mut self, generation: u64) -> bool {
        let active = self.state == EngineState::Playing;
        if generation != self.generation || !active {
            debug!(
                generation,
                current = self.generation,
                state = ?self.state,
                "Ignoring stale completion"
            );
            return false;
        }

        debug!(generation, url = ?self.current_url, "Track completed");
        self.stop();
        true
    }

    /// Release the backend; the engine cannot play afterwards
    pub fn release(&mut self) {
        if self.state == EngineState::Ended {
            return;
        }

        self.disarm_completion();
        self.backend.release();
        self.current_url = None;
        self.paused_at = None;
        self.state = EngineState::Ended;
        debug!("Playback engine released");
    }

    /// Elapsed time of the current track
    ///
    /// Frozen while paused, zero when nothing plays.
    pub fn progress(&self) -> Duration {
        match (self.state, self.paused_at) {
            (EngineState::Playing, _) => self.clock.now().saturating_sub(self.started_at),
            (EngineState::Paused, Some(paused_at)) => paused_at.saturating_sub(self.started_at),
            _ => Duration::ZERO,
        }
    }

    fn halt(&mut self) -> Result<()> {
        self.current_url = None;
        self.paused_at = None;
        self.state = EngineState::Stopped;
        self.backend.stop()
    }

    fn reset(&mut self) -> Result<()> {
        self.backend.reset()?;
        self.paused_at = None;
        self.state = EngineState::Idle;
        Ok(())
    }

    fn arm_completion(&mut self) {
        let callback = self.listener.as_ref().map(|listener| {
            let listener = Arc::clone(listener);
            let generation = self.generation;
            Box::new(move || listener(generation)) as crate::backend::CompletionCallback
        });
        self.backend.set_completion_callback(callback);
    }

    fn disarm_completion(&mut self) {
        self.backend.set_completion_callback(None);
        self.generation += 1;
    }

    fn fail(&mut self, error: PlaybackError) -> PlaybackError {
        warn!(error = %error, url = ?self.current_url, "Playback failed");
        self.disarm_completion();
        self.paused_at = None;
        self.state = EngineState::Error;
        error
    }

    fn invalid(&self, operation: &'static str) -> PlaybackError {
        PlaybackError::InvalidState {
            state: self.state,
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::RecordingBackend;
    use crate::clock::ManualClock;
    use std::sync::Mutex;

    fn engine() -> (PlaybackEngine, RecordingBackend, Arc<ManualClock>) {
        let backend = RecordingBackend::default();
        let clock = Arc::new(ManualClock::new());
        let engine = PlaybackEngine::new(Box::new(backend.clone()), clock.clone());
        (engine, backend, clock)
    }

    #[test]
    fn play_from_idle() {
        let (mut engine, backend, _) = engine();
        engine.play_url("http://srv/play/1").unwrap();

        assert_eq!(engine.state(), EngineState::Playing);
        assert_eq!(engine.current_url(), Some("http://srv/play/1"));
        assert_eq!(
            backend.calls(),
            vec!["set_source http://srv/play/1", "prepare", "start"]
        );
    }

    #[test]
    fn play_replaces_running_track() {
        let (mut engine, backend, _) = engine();
        engine.play_url("a").unwrap();
        backend.clear_calls();

        engine.play_url("b").unwrap();

        assert_eq!(engine.state(), EngineState::Playing);
        assert_eq!(engine.current_url(), Some("b"));
        assert_eq!(
            backend.calls(),
            vec!["stop", "reset", "set_source b", "prepare", "start"]
        );
    }

    #[test]
    fn play_after_stop_resets_first() {
        let (mut engine, backend, _) = engine();
        engine.play_url("a").unwrap();
        engine.stop();
        assert_eq!(engine.current_url(), None);
        backend.clear_calls();

        engine.play_url("b").unwrap();
        assert_eq!(backend.calls(), vec!["reset", "set_source b", "prepare", "start"]);
    }

    #[test]
    fn pause_resume_excludes_paused_time() {
        let (mut engine, _, clock) = engine();
        engine.play_url("a").unwrap();

        clock.advance(Duration::from_secs(3));
        engine.pause().unwrap();
        assert_eq!(engine.state(), EngineState::Paused);

        clock.advance(Duration::from_secs(5));
        assert_eq!(engine.progress(), Duration::from_secs(3));

        engine.resume().unwrap();
        assert_eq!(engine.state(), EngineState::Playing);
        assert_eq!(engine.progress(), Duration::from_secs(3));

        clock.advance(Duration::from_secs(1));
        assert_eq!(engine.progress(), Duration::from_secs(4));
    }

    #[test]
    fn progress_is_zero_when_not_playing() {
        let (mut engine, _, clock) = engine();
        clock.advance(Duration::from_secs(10));
        assert_eq!(engine.progress(), Duration::ZERO);

        engine.play_url("a").unwrap();
        clock.advance(Duration::from_secs(2));
        engine.stop();
        assert_eq!(engine.progress(), Duration::ZERO);
    }

    #[test]
    fn pause_requires_playing() {
        let (mut engine, backend, _) = engine();

        assert!(matches!(
            engine.pause(),
            Err(PlaybackError::InvalidState {
                state: EngineState::Idle,
                operation: "pause"
            })
        ));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn resume_without_stream_is_rejected() {
        let (mut engine, _, _) = engine();
        assert!(engine.resume().is_err());
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn backend_failure_requires_stop() {
        let (mut engine, backend, _) = engine();
        *backend.fail_prepare.lock().unwrap() = true;

        assert!(matches!(engine.play_url("a"), Err(PlaybackError::Backend(_))));
        assert_eq!(engine.state(), EngineState::Error);

        *backend.fail_prepare.lock().unwrap() = false;
        assert!(matches!(
            engine.play_url("a"),
            Err(PlaybackError::InvalidState { .. })
        ));

        engine.stop();
        assert_eq!(engine.state(), EngineState::Stopped);
        engine.play_url("a").unwrap();
        assert_eq!(engine.state(), EngineState::Playing);
    }

    #[test]
    fn completion_stops_before_listener_handles_it() {
        let (mut engine, backend, _) = engine();
        let signalled = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&signalled);
        engine.set_completion_listener(Some(Arc::new(move |generation| {
            sink.lock().unwrap().push(generation);
        })));

        engine.play_url("a").unwrap();
        backend.complete();

        let generation = signalled.lock().unwrap()[0];
        assert_eq!(generation, engine.generation());
        assert!(engine.complete(generation));
        assert_eq!(engine.state(), EngineState::Stopped);

        // A duplicate signal is stale
        assert!(!engine.complete(generation));
    }

    #[test]
    fn completion_of_replaced_track_is_stale() {
        let (mut engine, _, _) = engine();
        engine.play_url("a").unwrap();
        let first = engine.generation();

        engine.play_url("b").unwrap();
        assert!(!engine.complete(first));
        assert_eq!(engine.state(), EngineState::Playing);
        assert_eq!(engine.current_url(), Some("b"));
    }

    #[test]
    fn completion_while_paused_is_ignored() {
        let (mut engine, _, clock) = engine();
        engine.play_url("a").unwrap();
        let generation = engine.generation();

        clock.advance(Duration::from_secs(2));
        engine.pause().unwrap();
        assert!(!engine.complete(generation));
        assert_eq!(engine.state(), EngineState::Paused);
        assert_eq!(engine.progress(), Duration::from_secs(2));

        engine.resume().unwrap();
        assert!(engine.complete(generation));
        assert_eq!(engine.state(), EngineState::Stopped);
    }

    #[test]
    fn stop_disarms_completion() {
        let (mut engine, backend, _) = engine();
        engine.set_completion_listener(Some(Arc::new(|_| panic!("callback after stop"))));
        engine.play_url("a").unwrap();
        engine.stop();

        backend.complete();
        assert!(backend.callback.lock().unwrap().is_none());
    }

    #[test]
    fn released_engine_refuses_playback() {
        let (mut engine, backend, _) = engine();
        engine.play_url("a").unwrap();
        engine.release();

        assert_eq!(engine.state(), EngineState::Ended);
        assert!(backend.calls().contains(&"release".to_string()));
        assert!(engine.play_url("b").is_err());

        engine.stop();
        assert_eq!(engine.state(), EngineState::Ended);
    }
}

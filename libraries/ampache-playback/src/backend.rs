//! Media backend trait
//!
//! Abstracts the platform media player (network stream decoding and output)
//! so the engine state machine can run on any platform and in tests.

use crate::error::Result;

/// Invoked by the backend, from any thread, when the current track ended
pub type CompletionCallback = Box<dyn Fn() + Send + Sync>;

/// Platform media player
///
/// Implementors render one stream at a time. Every method is called from the
/// playback worker only; the completion callback is the single way back.
pub trait MediaBackend: Send {
    /// Set the stream to play
    fn set_source(&mut self, url: &str) -> Result<()>;

    /// Prepare the source for playback (may block while buffering)
    fn prepare(&mut self) -> Result<()>;

    /// Start or resume rendering
    fn start(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Drop the current source, returning to the idle state
    fn reset(&mut self) -> Result<()>;

    /// Release all resources; the backend is not used afterwards
    fn release(&mut self) {}

    /// Install (or remove) the end-of-track callback
    ///
    /// The callback must not be invoked after it was replaced or removed.
    fn set_completion_callback(&mut self, callback: Option<CompletionCallback>);
}

/// Backend that records calls, for unit tests
#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use crate::error::PlaybackError;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct RecordingBackend {
        pub calls: Arc<Mutex<Vec<String>>>,
        pub callback: Arc<Mutex<Option<CompletionCallback>>>,
        pub fail_prepare: Arc<Mutex<bool>>,
    }

    impl RecordingBackend {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        pub fn complete(&self) {
            if let Some(callback) = self.callback.lock().unwrap().as_ref() {
                callback();
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    impl MediaBackend for RecordingBackend {
        fn set_source(&mut self, url: &str) -> Result<()> {
            self.record(format!("set_source {}", url));
            Ok(())
        }

        fn prepare(&mut self) -> Result<()> {
            self.record("prepare");
            if *self.fail_prepare.lock().unwrap() {
                return Err(PlaybackError::backend("unsupported codec"));
            }
            Ok(())
        }

        fn start(&mut self) -> Result<()> {
            self.record("start");
            Ok(())
        }

        fn pause(&mut self) -> Result<()> {
            self.record("pause");
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.record("stop");
            Ok(())
        }

        fn reset(&mut self) -> Result<()> {
            self.record("reset");
            Ok(())
        }

        fn release(&mut self) {
            self.record("release");
        }

        fn set_completion_callback(&mut self, callback: Option<CompletionCallback>) {
            *self.callback.lock().unwrap() = callback;
        }
    }
}

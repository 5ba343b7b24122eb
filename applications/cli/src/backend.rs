//! Simulated media output
//!
//! The CLI has no audio device; this backend "plays" a stream by running a
//! timer for the track's duration and firing the completion callback when it
//! runs out. Pausing keeps the remaining time.

use ampache_playback::{CompletionCallback, MediaBackend, PlaybackError, PlaylistEntry, Result};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

type SharedCallback = Arc<Mutex<Option<CompletionCallback>>>;

/// Running countdown; dropping `cancel` stops the timer thread
struct Timer {
    cancel: Sender<()>,
    started: Instant,
}

pub struct SimulatedBackend {
    durations: HashMap<String, Duration>,
    time_scale: f64,
    source: Option<String>,
    prepared: bool,
    /// Time left on the current track
    remaining: Duration,
    timer: Option<Timer>,
    callback: SharedCallback,
}

impl SimulatedBackend {
    /// Backend that knows the duration of every entry in `entries`
    ///
    /// `time_scale` speeds playback up (values above 1.0) or slows it down.
    pub fn new(entries: &[PlaylistEntry], time_scale: f64) -> Self {
        let durations = entries
            .iter()
            .map(|entry| {
                (
                    entry.url.clone(),
                    Duration::from_secs(u64::from(entry.duration_seconds)),
                )
            })
            .collect();

        Self {
            durations,
            time_scale: if time_scale > 0.0 { time_scale } else { 1.0 },
            source: None,
            prepared: false,
            remaining: Duration::ZERO,
            timer: None,
            callback: Arc::new(Mutex::new(None)),
        }
    }

    fn cancel_timer(&mut self) -> Option<Duration> {
        self.timer.take().map(|timer| timer.started.elapsed())
    }

    fn spawn_timer(&mut self) -> Result<()> {
        let (cancel, cancelled) = bounded::<()>(0);
        let remaining = self.remaining;
        let callback = Arc::clone(&self.callback);

        thread::Builder::new()
            .name("simulated-output".into())
            .spawn(move || match cancelled.recv_timeout(remaining) {
                Err(RecvTimeoutError::Timeout) => {
                    trace!("Simulated track finished");
                    let guard = callback.lock().unwrap_or_else(|e| e.into_inner());
                    if let Some(callback) = guard.as_ref() {
                        callback();
                    }
                }
                // Sender dropped: paused, stopped or reset
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            })?;

        self.timer = Some(Timer {
            cancel,
            started: Instant::now(),
        });
        Ok(())
    }

    fn scaled(&self, duration: Duration) -> Duration {
        duration.div_f64(self.time_scale)
    }
}

impl MediaBackend for SimulatedBackend {
    fn set_source(&mut self, url: &str) -> Result<()> {
        if !self.durations.contains_key(url) {
            return Err(PlaybackError::backend(format!("Unknown stream: {}", url)));
        }
        self.source = Some(url.to_string());
        self.prepared = false;
        Ok(())
    }

    fn prepare(&mut self) -> Result<()> {
        let duration = self
            .source
            .as_ref()
            .and_then(|url| self.durations.get(url))
            .copied()
            .ok_or_else(|| PlaybackError::backend("No source set"))?;

        self.remaining = self.scaled(duration);
        self.prepared = true;
        debug!(remaining_ms = self.remaining.as_millis() as u64, "Prepared simulated stream");
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if !self.prepared {
            return Err(PlaybackError::backend("Start before prepare"));
        }
        if self.timer.is_none() {
            self.spawn_timer()?;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if let Some(elapsed) = self.cancel_timer() {
            self.remaining = self.remaining.saturating_sub(elapsed);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.cancel_timer();
        self.prepared = false;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.cancel_timer();
        self.source = None;
        self.prepared = false;
        self.remaining = Duration::ZERO;
        Ok(())
    }

    fn release(&mut self) {
        self.cancel_timer();
        self.set_completion_callback(None);
    }

    fn set_completion_callback(&mut self, callback: Option<CompletionCallback>) {
        *self.callback.lock().unwrap_or_else(|e| e.into_inner()) = callback;
    }
}

impl Drop for SimulatedBackend {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampache_core::{AlbumId, SongId};
    use crossbeam_channel::unbounded;

    fn entry(song: u64, seconds: u32) -> PlaylistEntry {
        PlaylistEntry {
            album_id: AlbumId::new(1),
            song_id: SongId::new(song),
            track_index: 0,
            url: format!("sim://{}", song),
            duration_seconds: seconds,
        }
    }

    /// Played 50x faster: track 1 lasts 20 ms, track 2 lasts 200 ms
    fn fast_backend() -> (SimulatedBackend, crossbeam_channel::Receiver<()>) {
        let mut backend = SimulatedBackend::new(&[entry(1, 1), entry(2, 10)], 50.0);
        let (tx, rx) = unbounded();
        backend.set_completion_callback(Some(Box::new(move || {
            let _ = tx.send(());
        })));
        (backend, rx)
    }

    #[test]
    fn completes_after_scaled_duration() {
        let (mut backend, done) = fast_backend();

        backend.set_source("sim://1").unwrap();
        backend.prepare().unwrap();
        backend.start().unwrap();

        assert!(done.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn stop_cancels_completion() {
        let (mut backend, done) = fast_backend();

        backend.set_source("sim://2").unwrap();
        backend.prepare().unwrap();
        backend.start().unwrap();
        backend.stop().unwrap();

        assert!(done.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let (mut backend, done) = fast_backend();

        backend.set_source("sim://2").unwrap();
        backend.prepare().unwrap();
        backend.start().unwrap();
        backend.pause().unwrap();

        assert!(backend.remaining > Duration::ZERO);
        assert!(backend.remaining <= Duration::from_millis(200));
        assert!(done.recv_timeout(Duration::from_millis(300)).is_err());

        backend.start().unwrap();
        assert!(done.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn unknown_source_is_a_backend_error() {
        let (mut backend, _done) = fast_backend();

        let err = backend.set_source("sim://99").unwrap_err();
        assert!(matches!(err, PlaybackError::Backend(_)));
        assert!(backend.start().is_err());
    }

    #[test]
    fn removed_callback_is_not_invoked() {
        let (mut backend, done) = fast_backend();

        backend.set_source("sim://1").unwrap();
        backend.prepare().unwrap();
        backend.set_completion_callback(None);
        backend.start().unwrap();

        assert!(done.recv_timeout(Duration::from_millis(200)).is_err());
    }
}

//! Serialized playback controller
//!
//! All playback mutations run on one dedicated worker thread that drains a
//! multi-producer command queue in FIFO order. Callers (UI surfaces, the
//! engine's completion callback) only enqueue, which never blocks.
//!
//! Every processed command publishes exactly one [`StatusEvent`], including
//! no-ops and failed commands (with `error` set).

use crate::backend::MediaBackend;
use crate::clock::{Clock, SystemClock};
use crate::engine::PlaybackEngine;
use crate::error::{PlaybackError, Result};
use crate::events::StatusBroadcaster;
use crate::playlist::Playlist;
use crate::types::{EngineState, PlayerState, StatusEvent};
use ampache_core::PlaylistEntry;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Playback commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register the completion listener; send once before playing
    Start,

    /// Resume when paused, otherwise start the current entry
    Play,

    Pause,

    Stop,

    /// Stop and empty the playlist
    Clear,

    /// Add entries to the back of the playlist, or right after the current one
    AddTracks {
        entries: Vec<PlaylistEntry>,
        append_to_back: bool,
    },

    /// Skip to the next entry and play it (no-op on the last entry)
    Next,

    /// Go back one entry and play it (no-op on the first entry)
    Previous,

    /// Jump to an entry and play it
    SelectTrack(usize),

    /// Publish the current status without changing anything
    RequestStatus,
}

impl Command {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Stop => "stop",
            Command::Clear => "clear",
            Command::AddTracks { .. } => "add_tracks",
            Command::Next => "next",
            Command::Previous => "previous",
            Command::SelectTrack(_) => "select_track",
            Command::RequestStatus => "request_status",
        }
    }
}

/// Queue messages; completions and shutdown share the command queue so they
/// are ordered with user commands
enum Message {
    Command(Command),
    TrackCompleted(u64),
    Shutdown,
}

/// Handle to the playback worker
///
/// # Example
///
/// ```rust,ignore
/// use ampache_playback::{PlaybackController, PlayerState};
///
/// let controller = PlaybackController::new(Box::new(backend))?;
/// let events = controller.subscribe();
///
/// controller.start()?;
/// controller.add_tracks(catalog.album_playlist(album_id).await?, true)?;
/// controller.play()?;
///
/// for event in events.iter() {
///     println!("{:?} track {} at {} ms", event.new_state, event.track_index, event.progress_ms);
/// }
/// ```
pub struct PlaybackController {
    sender: Sender<Message>,
    status: Arc<StatusBroadcaster>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackController {
    /// Spawn the worker around `backend`, measuring progress with the system clock
    pub fn new(backend: Box<dyn MediaBackend>) -> Result<Self> {
        Self::with_clock(backend, Arc::new(SystemClock::new()))
    }

    /// Spawn the worker with an explicit clock
    pub fn with_clock(backend: Box<dyn MediaBackend>, clock: Arc<dyn Clock>) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let status = Arc::new(StatusBroadcaster::default());

        let worker = Worker {
            engine: PlaybackEngine::new(backend, clock),
            playlist: Playlist::new(),
            status: Arc::clone(&status),
            queue: sender.clone(),
            last_state: PlayerState::Undefined,
        };

        let handle = thread::Builder::new()
            .name("ampache-playback".into())
            .spawn(move || worker.run(&receiver))?;

        Ok(Self {
            sender,
            status,
            worker: Some(handle),
        })
    }

    /// Enqueue a command
    ///
    /// # Errors
    /// `WorkerUnavailable` after shutdown.
    pub fn send(&self, command: Command) -> Result<()> {
        self.sender
            .send(Message::Command(command))
            .map_err(|_| PlaybackError::WorkerUnavailable)
    }

    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn play(&self) -> Result<()> {
        self.send(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    pub fn clear(&self) -> Result<()> {
        self.send(Command::Clear)
    }

    pub fn add_tracks(&self, entries: Vec<PlaylistEntry>, append_to_back: bool) -> Result<()> {
        self.send(Command::AddTracks {
            entries,
            append_to_back,
        })
    }

    pub fn next(&self) -> Result<()> {
        self.send(Command::Next)
    }

    pub fn previous(&self) -> Result<()> {
        self.send(Command::Previous)
    }

    pub fn select_track(&self, index: usize) -> Result<()> {
        self.send(Command::SelectTrack(index))
    }

    pub fn request_status(&self) -> Result<()> {
        self.send(Command::RequestStatus)
    }

    /// Receive every status event published from now on
    pub fn subscribe(&self) -> Receiver<StatusEvent> {
        self.status.subscribe()
    }

    /// Most recently published status
    pub fn last_status(&self) -> Option<StatusEvent> {
        self.status.last()
    }

    /// Process the pending commands, release the backend and join the worker
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // Fails only if the worker is already gone
        let _ = self.sender.send(Message::Shutdown);
        if worker.join().is_err() {
            warn!("Playback worker panicked");
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// State owned by the worker thread
struct Worker {
    engine: PlaybackEngine,
    playlist: Playlist,
    status: Arc<StatusBroadcaster>,
    /// Sender side of the worker's own queue, handed to the engine for completions
    queue: Sender<Message>,
    last_state: PlayerState,
}

impl Worker {
    fn run(mut self, receiver: &Receiver<Message>) {
        info!("Playback worker started");

        for message in receiver.iter() {
            match message {
                Message::Command(command) => {
                    let name = command.name();
                    debug!(command = name, "Processing command");

                    let error = self.process(command).err().map(|e| {
                        warn!(command = name, error = %e, "Command failed");
                        e.to_string()
                    });
                    self.publish(error);
                }
                Message::TrackCompleted(generation) => {
                    if self.engine.complete(generation) {
                        let error = self.advance_or_stop().err().map(|e| {
                            warn!(error = %e, "Auto-advance failed");
                            e.to_string()
                        });
                        self.publish(error);
                    }
                }
                Message::Shutdown => break,
            }
        }

        self.engine.release();
        info!("Playback worker stopped");
    }

    fn process(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Start => {
                let queue = self.queue.clone();
                self.engine.set_completion_listener(Some(Arc::new(move |generation| {
                    // The worker may already be gone during shutdown
                    let _ = queue.send(Message::TrackCompleted(generation));
                })));
                Ok(())
            }
            Command::Play => {
                if self.engine.state() == EngineState::Paused {
                    self.engine.resume()
                } else {
                    self.play_current()
                }
            }
            Command::Pause => {
                if self.engine.state() == EngineState::Playing {
                    self.engine.pause()
                } else {
                    Ok(())
                }
            }
            Command::Stop => {
                self.engine.stop();
                Ok(())
            }
            Command::Clear => {
                self.engine.stop();
                self.playlist.clear();
                Ok(())
            }
            Command::AddTracks {
                entries,
                append_to_back,
            } => {
                debug!(count = entries.len(), append_to_back, "Adding tracks");
                self.playlist.add(entries, append_to_back);
                Ok(())
            }
            Command::Next => {
                if self.playlist.has_next() {
                    self.playlist.next();
                    self.play_current()
                } else {
                    Ok(())
                }
            }
            Command::Previous => {
                if self.playlist.has_previous() {
                    self.playlist.previous();
                    self.play_current()
                } else {
                    Ok(())
                }
            }
            Command::SelectTrack(index) => {
                if !self.playlist.has_index(index) {
                    return Err(PlaybackError::IndexOutOfRange {
                        index,
                        len: self.playlist.len(),
                    });
                }
                self.playlist.select(index);
                self.play_current()
            }
            Command::RequestStatus => Ok(()),
        }
    }

    fn advance_or_stop(&mut self) -> Result<()> {
        if self.playlist.has_next() {
            self.playlist.next();
            self.play_current()
        } else {
            info!("Reached end of playlist");
            self.engine.stop();
            Ok(())
        }
    }

    fn play_current(&mut self) -> Result<()> {
        match self.playlist.current().map(|entry| entry.url.clone()) {
            Some(url) => self.engine.play_url(&url),
            None => {
                debug!("Playlist is empty, nothing to play");
                Ok(())
            }
        }
    }

    fn publish(&mut self, error: Option<String>) {
        let mut event = StatusEvent::new(self.playlist.current());
        event.progress_ms = u64::try_from(self.engine.progress().as_millis()).unwrap_or(u64::MAX);
        event.playlist_index = self.playlist.current_index();
        event.playlist_len = self.playlist.len();
        event.new_state = self.engine.state().into();
        event.old_state = self.last_state;
        event.error = error;

        self.last_state = event.new_state;
        self.status.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::RecordingBackend;
    use std::time::Duration;

    #[test]
    fn commands_have_log_names() {
        assert_eq!(Command::SelectTrack(3).name(), "select_track");
        assert_eq!(
            Command::AddTracks {
                entries: vec![],
                append_to_back: true
            }
            .name(),
            "add_tracks"
        );
    }

    #[test]
    fn shutdown_releases_backend() {
        let backend = RecordingBackend::default();
        let mut controller = PlaybackController::new(Box::new(backend.clone())).unwrap();
        let events = controller.subscribe();

        controller.request_status().unwrap();
        controller.shutdown();

        // Pending commands are processed before the worker exits
        let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.new_state, PlayerState::Stopped);
        assert_eq!(backend.calls(), vec!["release"]);
        assert!(matches!(
            controller.play(),
            Err(PlaybackError::WorkerUnavailable)
        ));
    }
}

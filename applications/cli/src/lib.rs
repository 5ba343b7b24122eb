//! Ampache CLI support
//!
//! Configuration layering and the simulated media output used by the
//! `ampache-cli` binary.

pub mod backend;
pub mod settings;

pub use backend::SimulatedBackend;
pub use settings::{AppSettings, Overrides, PlayerSettings};

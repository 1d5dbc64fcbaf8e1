//! Playback queue: ordered tracks plus the identity of the current one.
//!
//! The queue never activates anything itself. Navigation returns the track
//! that should be activated next and the controller takes it from there.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;

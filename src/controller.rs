//! The playback state machine.
//!
//! One `PlaybackController` owns the queue, the audio engine and the resolved
//! stream. Everything that mutates it runs on the event loop through
//! `&mut self`; asynchronous work (resolution, audio notifications) reports
//! back as `ControllerEvent`s on the channel returned by `new`.

mod model;
mod playback;

pub use model::*;
pub use playback::PlaybackController;

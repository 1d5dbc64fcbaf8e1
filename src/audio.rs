//! Audio output.
//!
//! `AudioEngine` owns at most one live resource and the session volume. The
//! actual output is behind `AudioBackend`; `RodioBackend` plays through a
//! dedicated audio thread. Resources report progress/ended/error through an
//! `EventEmitter` that goes quiet the moment its `Subscription` is detached.

mod engine;
mod player;
mod sink;
mod thread;
mod types;

pub use engine::AudioEngine;
pub use player::RodioBackend;
pub use types::*;

#[cfg(test)]
mod tests;

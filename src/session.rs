//! Durable session state: the last activated track and the volume.
//!
//! Reads are forgiving (absent or malformed records mean "nothing to
//! restore"); writes report errors so the caller can log them.

mod store;

pub use store::*;

#[cfg(test)]
mod tests;

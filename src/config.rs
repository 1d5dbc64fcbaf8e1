//! Settings for the playback session.
//!
//! Sections: `resolver` (lookup service and quality tiers), `playback`
//! (autoplay, restart threshold, volume), `audio`, `session` (where the
//! last track and volume are kept), `auth`, `controls`, `logging` and `ui`.
//! Values come from `LEGATO__SECTION__KEY` variables layered over an
//! optional TOML file; anything unset keeps its default.

mod load;
mod schema;

pub use load::resolve_config_path;
pub use schema::*;

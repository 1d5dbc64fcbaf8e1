//! Catalog track data.
//!
//! `TrackDescriptor` is what the catalog hands us; `ResolvedStream` is what
//! the resolver turns it into. The catalog itself is external: `catalog`
//! only reads its JSON output from disk.

pub mod catalog;
pub mod display;
mod model;

pub use catalog::{CatalogError, load_tracks};
pub use model::*;

//! Stream resolution: catalog track -> playable URL.
//!
//! `StreamLookup` is the seam to the external streaming-resolution service
//! (`SaavnClient` talks to the real one). `StreamResolver` sits on top: it
//! picks a quality tier, maps failures onto `PlaybackError` and single-flights
//! concurrent requests for the same track id.

mod lookup;
mod policy;
mod resolve;
mod saavn;

pub use lookup::*;
pub use policy::QualityPolicy;
pub use resolve::{ResolveFuture, StreamResolver};
pub use saavn::SaavnClient;

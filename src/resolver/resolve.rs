use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::auth::AuthGateway;
use crate::error::PlaybackError;
use crate::track::{ResolvedStream, TrackDescriptor};

use super::lookup::{LookupError, LookupKey, StreamLookup};
use super::policy::QualityPolicy;

/// A resolution in progress. Clones share one underlying lookup.
pub type ResolveFuture = Shared<BoxFuture<'static, Result<ResolvedStream, PlaybackError>>>;

type FlightTable = Arc<Mutex<HashMap<String, ResolveFuture>>>;

pub struct StreamResolver {
    lookup: Arc<dyn StreamLookup>,
    auth: Arc<dyn AuthGateway>,
    policy: QualityPolicy,
    timeout: Duration,
    in_flight: FlightTable,
}

fn lock_table(table: &Mutex<HashMap<String, ResolveFuture>>) -> MutexGuard<'_, HashMap<String, ResolveFuture>> {
    match table.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl StreamResolver {
    pub fn new(
        lookup: Arc<dyn StreamLookup>,
        auth: Arc<dyn AuthGateway>,
        policy: QualityPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            lookup,
            auth,
            policy,
            timeout,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Resolve `track` to a playable stream.
    ///
    /// The flight is registered before this returns, so a second call for the
    /// same id made before the first settles joins it instead of issuing
    /// another lookup. The entry is dropped once the lookup settles.
    pub fn resolve(&self, track: &TrackDescriptor) -> ResolveFuture {
        let mut table = lock_table(&self.in_flight);
        if let Some(existing) = table.get(&track.id) {
            tracing::debug!(track_id = %track.id, "joining in-flight resolution");
            return existing.clone();
        }

        let key = LookupKey::for_track(track);
        let lookup = self.lookup.clone();
        let auth = self.auth.clone();
        let policy = self.policy.clone();
        let timeout = self.timeout;
        let flights = self.in_flight.clone();

        let flight = async move {
            let id = key.track_id.clone();
            let result = run_lookup(lookup.as_ref(), auth.as_ref(), &policy, timeout, key).await;
            lock_table(&flights).remove(&id);
            result
        }
        .boxed()
        .shared();

        tracing::debug!(track_id = %track.id, "starting resolution");
        table.insert(track.id.clone(), flight.clone());
        flight
    }

    /// Number of distinct track ids currently being resolved.
    pub fn in_flight_count(&self) -> usize {
        lock_table(&self.in_flight).len()
    }
}

async fn run_lookup(
    lookup: &dyn StreamLookup,
    auth: &dyn AuthGateway,
    policy: &QualityPolicy,
    timeout: Duration,
    key: LookupKey,
) -> Result<ResolvedStream, PlaybackError> {
    if auth.access_token().is_none() {
        return Err(PlaybackError::Unauthenticated);
    }

    let candidates = match tokio::time::timeout(timeout, lookup.lookup(&key)).await {
        Err(_) => {
            tracing::warn!(track_id = %key.track_id, ?timeout, "resolution timed out");
            return Err(PlaybackError::ResolutionFailed(format!(
                "timed out after {}ms",
                timeout.as_millis()
            )));
        }
        Ok(Err(LookupError::Unauthorized)) => {
            auth.on_unauthorized();
            return Err(PlaybackError::Unauthenticated);
        }
        Ok(Err(e)) => {
            tracing::warn!(track_id = %key.track_id, error = %e, "resolution failed");
            return Err(PlaybackError::ResolutionFailed(e.to_string()));
        }
        Ok(Ok(candidates)) => candidates,
    };

    let chosen = policy.select(&candidates).ok_or_else(|| {
        tracing::info!(
            track_id = %key.track_id,
            offered = ?candidates.iter().map(|c| c.quality_tag.as_str()).collect::<Vec<_>>(),
            "no candidate in an accepted quality tier"
        );
        PlaybackError::NoStreamAvailable
    })?;

    Ok(ResolvedStream {
        source_track_id: key.track_id,
        stream_url: chosen.url.clone(),
        quality_tag: chosen.quality_tag.clone(),
    })
}

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::StaticToken;
use crate::config;
use crate::controller::PlaybackController;
use crate::resolver::{QualityPolicy, SaavnClient, StreamResolver};
use crate::session::SessionStore;
use crate::track;

pub fn build_resolver(settings: &config::Settings, http: reqwest::Client) -> StreamResolver {
    let lookup = Arc::new(SaavnClient::new(settings.resolver.base_url.clone(), http));
    let auth = Arc::new(StaticToken::new(settings.auth.access_token.clone()));
    let policy = QualityPolicy::new(
        settings.resolver.preferred_quality.clone(),
        settings.resolver.fallback_quality.clone(),
    );
    StreamResolver::new(
        lookup,
        auth,
        policy,
        Duration::from_millis(settings.resolver.timeout_ms),
    )
}

pub fn session_store(settings: &config::Settings) -> SessionStore {
    match settings.session_dir() {
        Some(dir) => SessionStore::new(dir),
        None => SessionStore::disabled(),
    }
}

/// Restore the last session, then load the catalog file (if any) into the queue.
pub fn prepare(controller: &mut PlaybackController, catalog: Option<&Path>) {
    if controller.restore_session() {
        tracing::info!("last session restored");
    }

    let Some(path) = catalog else {
        return;
    };
    match track::load_tracks(path) {
        Ok(tracks) => {
            tracing::info!(path = %path.display(), count = tracks.len(), "catalog loaded");
            controller.set_queue(tracks);
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not load catalog");
            eprintln!("legato: could not load catalog {}: {e}", path.display());
        }
    }
}

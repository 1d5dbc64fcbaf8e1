//! Building `rodio` sinks from downloaded stream bytes.

use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::AudioError;

/// Decode `bytes` into a paused `Sink` on `stream`, with the stream's own duration if it reports one.
pub(super) fn create_sink(
    stream: &OutputStream,
    bytes: Vec<u8>,
    volume: f32,
) -> Result<(Sink, Option<Duration>), AudioError> {
    let source = Decoder::new(Cursor::new(bytes)).map_err(|e| AudioError::Decode(e.to_string()))?;
    let duration = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok((sink, duration))
}

/// Download the whole stream body.
pub(super) async fn fetch_stream(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, AudioError> {
    let resp = http
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| AudioError::Fetch(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(AudioError::Fetch(format!("upstream status {}", resp.status())));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| AudioError::Fetch(e.to_string()))?;
    Ok(bytes.to_vec())
}

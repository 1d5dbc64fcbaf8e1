use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use super::lookup::{LookupError, LookupKey, StreamCandidate, StreamLookup};

/// Client for a saavn.dev-style song API.
///
/// `GET {base}/songs/{id}` first; when the id is unknown there, one
/// `GET {base}/search/songs?query=<title> <artist>` and the first hit wins.
pub struct SaavnClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SongsEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<SaavnSong>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    results: Vec<SaavnSong>,
}

#[derive(Debug, Deserialize)]
struct SaavnSong {
    #[serde(rename = "downloadUrl", default)]
    download_url: Vec<SaavnDownload>,
}

#[derive(Debug, Deserialize)]
struct SaavnDownload {
    quality: String,
    #[serde(alias = "link")]
    url: String,
}

impl SaavnSong {
    fn into_candidates(self) -> Vec<StreamCandidate> {
        self.download_url
            .into_iter()
            .filter(|d| !d.url.trim().is_empty())
            .map(|d| StreamCandidate {
                quality_tag: d.quality,
                url: d.url,
            })
            .collect()
    }
}

/// Candidates from a `/songs/{id}` body; `None` when the service does not know the id.
pub(super) fn parse_song_body(body: &str) -> Result<Option<Vec<StreamCandidate>>, LookupError> {
    let env: SongsEnvelope =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
    if !env.success {
        return Ok(None);
    }
    Ok(env.data.into_iter().next().map(SaavnSong::into_candidates))
}

/// Candidates of the first search hit; empty when nothing matched.
pub(super) fn parse_search_body(body: &str) -> Result<Vec<StreamCandidate>, LookupError> {
    let env: SearchEnvelope =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
    if !env.success {
        return Ok(Vec::new());
    }
    Ok(env
        .data
        .and_then(|d| d.results.into_iter().next())
        .map(SaavnSong::into_candidates)
        .unwrap_or_default())
}

fn check_status(status: StatusCode) -> Result<(), LookupError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(LookupError::Unauthorized);
    }
    if !status.is_success() {
        return Err(LookupError::Status(status.as_u16()));
    }
    Ok(())
}

impl SaavnClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, LookupError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| LookupError::Malformed(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::Malformed(format!("unusable base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn song_by_id(&self, id: &str) -> Result<Option<Vec<StreamCandidate>>, LookupError> {
        let url = self.endpoint(&["songs", id])?;
        let resp = self.http.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(resp.status())?;
        let body = resp.text().await?;
        parse_song_body(&body)
    }

    async fn search_first(&self, query: &str) -> Result<Vec<StreamCandidate>, LookupError> {
        let url = self.endpoint(&["search", "songs"])?;
        let resp = self.http.get(url).query(&[("query", query)]).send().await?;
        check_status(resp.status())?;
        let body = resp.text().await?;
        parse_search_body(&body)
    }
}

#[async_trait]
impl StreamLookup for SaavnClient {
    async fn lookup(&self, key: &LookupKey) -> Result<Vec<StreamCandidate>, LookupError> {
        if let Some(found) = self.song_by_id(&key.track_id).await? {
            if !found.is_empty() {
                return Ok(found);
            }
        }

        let Some(query) = key.search_query() else {
            return Ok(Vec::new());
        };
        tracing::debug!(track_id = %key.track_id, %query, "id unknown to resolution service, searching");
        self.search_first(&query).await
    }
}

//! DotTrack live tracking API client
//!
//! Fetches the team roster and replay locations for one project through the
//! on-disk response cache. A URL that has been fetched once is served from
//! disk from then on.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::{LocationBatch, ReplayResponse, Roster, TeamsResponse};
use crate::cache::ResponseCache;

/// Base URL of the DotTrack live service
pub const DOTTRACK_BASE_URL: &str = "https://live.dottrack.asia";

/// Path of the team roster resource
pub const TEAMS_PATH: &str = "/data/teams.json";

/// Path of the replay locations resource
pub const REPLAY_PATH: &str = "/data/replay.json?v=1";

/// Errors that can occur when fetching DotTrack data
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response or cache body is not valid JSON
    #[error("Failed to parse JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON is valid but does not have the expected shape
    #[error("Unexpected response shape from {url}: {source}")]
    Schema {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Cache read/write error
    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),
}

/// Client for one DotTrack project
#[derive(Debug, Clone)]
pub struct DotTrackClient {
    client: Client,
    url_prefix: String,
    cache: ResponseCache,
}

impl DotTrackClient {
    /// Creates a client for `project` on the live DotTrack service
    pub fn new(project: &str, cache: ResponseCache) -> Self {
        Self::with_base_url(DOTTRACK_BASE_URL, project, cache)
    }

    /// Creates a client against a custom base URL
    pub fn with_base_url(base_url: &str, project: &str, cache: ResponseCache) -> Self {
        Self {
            client: Client::new(),
            url_prefix: format!("{}/{}", base_url.trim_end_matches('/'), project),
            cache,
        }
    }

    /// Full URL for a resource path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.url_prefix, path)
    }

    /// Fetches a resource as untyped JSON
    ///
    /// On a cache hit the cached body is parsed and returned without touching
    /// the network. On a miss the resource is requested once; the body is
    /// cached only if it parses as JSON. HTTP status codes are not inspected,
    /// so an error page that happens to be JSON is cached like any other body.
    pub async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url_for(path);

        if let Some(body) = self.cache.read(&url)? {
            return parse_json(&url, &body);
        }

        debug!(url = %url, "requesting");
        let response = self.client.get(&url).send().await?;
        let body = response.text().await?;
        let value = parse_json(&url, &body)?;

        self.cache.write(&url, &body)?;
        Ok(value)
    }

    /// Fetches a resource and decodes it into `T`
    async fn fetch_typed<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let value = self.fetch(path).await?;
        serde_json::from_value(value).map_err(|source| FetchError::Schema {
            url: self.url_for(path),
            source,
        })
    }

    /// Fetches the team roster
    pub async fn fetch_roster(&self) -> Result<Roster, FetchError> {
        let resp: TeamsResponse = self.fetch_typed(TEAMS_PATH).await?;
        let roster = Roster::new(resp.data);
        info!(
            classes = roster.classes().len(),
            teams = roster.teams().count(),
            "fetched roster"
        );
        Ok(roster)
    }

    /// Fetches the replay location batches in tick order
    pub async fn fetch_replay_locations(&self) -> Result<Vec<LocationBatch>, FetchError> {
        let resp: ReplayResponse = self.fetch_typed(REPLAY_PATH).await?;
        info!(ticks = resp.data.locations.len(), "fetched replay");
        Ok(resp.data.locations)
    }
}

fn parse_json(url: &str, body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Json {
        url: url.to_string(),
        source,
    })
}

//! Response cache for persisting raw API bodies to disk
//!
//! Provides a `ResponseCache` that stores each response body under the SHA-1
//! of the URL it was fetched from. Entries never expire.

use directories::ProjectDirs;
use sha1::{Digest, Sha1};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Directory used when no XDG cache directory can be determined
const FALLBACK_CACHE_DIR: &str = "cache";

/// Reads and writes raw response bodies keyed by request URL
///
/// Files live at `<cache_dir>/<sha1(url)>.json`. A file, once written, is
/// served for that URL forever; there is no TTL and no invalidation.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl ResponseCache {
    /// Creates a cache rooted at `cache_dir`
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the cache key for a URL: the lowercase hex SHA-1 of its bytes
    pub fn key_for(url: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(url.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }

    /// Returns the path of the cache file for a URL
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", Self::key_for(url)))
    }

    /// Reads the cached body for a URL
    ///
    /// # Returns
    /// * `Ok(Some(body))` on a cache hit
    /// * `Ok(None)` if nothing has been cached for this URL
    /// * `Err` if the file exists but cannot be read
    pub fn read(&self, url: &str) -> io::Result<Option<String>> {
        let path = self.path_for(url);
        match fs::read_to_string(&path) {
            Ok(body) => {
                debug!(path = %path.display(), "cache hit");
                Ok(Some(body))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "cache miss");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Writes a response body for a URL, creating the cache directory if needed
    ///
    /// An existing entry is overwritten; concurrent writers race and the last
    /// one wins.
    pub fn write(&self, url: &str, body: &str) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.path_for(url);
        fs::write(&path, body)?;
        debug!(path = %path.display(), bytes = body.len(), "cached response");
        Ok(())
    }
}

/// Resolves the default cache directory
///
/// Uses `~/.cache/dottrack-firefly/` on Linux, or `./cache` when no home
/// directory is available.
pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "dottrack-firefly")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}

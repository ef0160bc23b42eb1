use gdl_common::serde;
use gdl_common::serde::{Deserialize, Serialize};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Display;

use crate::error::ExtractorError;
use crate::server_config;

pub(crate) const CLIENT_UA_NAME: &str = "Rust Gallery Dataset Downloader";

pub(crate) const EXTRACTOR_UA_NAME: &str = "Rust Gallery Page Extractor";

pub(crate) const DEFAULT_CLI_UA: &str =
    concat!("Rust Gallery Dataset Downloader/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_EXT_UA: &str =
    concat!("Rust Gallery Page Extractor/", env!("CARGO_PKG_VERSION"));

/// Name of the server used when none is selected.
pub const DEFAULT_SERVER: &str = "pornpics";

pub mod macros;
pub mod serialize;

pub static DEFAULT_SERVERS: Lazy<HashMap<String, ServerConfig>> = Lazy::new(|| {
    let mut hmap = HashMap::with_capacity(1);
    hmap.insert(DEFAULT_SERVER.to_string(), ServerConfig::default());
    hmap
});

/// Everything needed to crawl one gallery website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ServerConfig {
    pub name: String,
    pub pretty_name: String,
    /// User agent used when fetching image files.
    pub client_user_agent: String,
    /// User agent used when fetching listings and gallery pages.
    pub extractor_user_agent: String,
    pub base_url: String,
    /// Listing endpoint used when no search query is given.
    pub popular_url: String,
    /// Listing endpoint used for search queries.
    pub search_url: String,
    /// Value of the `lang` parameter sent with search queries.
    pub search_language: String,
    /// Path segment of thumbnail URLs that selects the low resolution variant.
    pub thumbnail_segment: String,
    /// Replacement for `thumbnail_segment` that selects the high resolution variant.
    pub full_size_segment: String,
    /// Max number of galleries a single listing request may return.
    pub max_page_limit: usize,
}

impl ServerConfig {
    /// Rewrites a thumbnail URL so it points to the high resolution image.
    ///
    /// Only the first occurrence of the thumbnail segment is replaced.
    #[inline]
    pub fn full_size_url(&self, thumbnail_url: &str) -> String {
        if self.thumbnail_segment.is_empty() {
            return thumbnail_url.to_string();
        }
        thumbnail_url.replacen(&self.thumbnail_segment, &self.full_size_segment, 1)
    }

    /// Looks up a server by name in the given server table.
    pub fn lookup(
        servers: &HashMap<String, ServerConfig>,
        name: &str,
    ) -> Result<Self, ExtractorError> {
        servers
            .get(name)
            .cloned()
            .ok_or_else(|| ExtractorError::ServerNotExists {
                name: name.to_string(),
            })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        server_config!(
            DEFAULT_SERVER,
            "PornPics",
            DEFAULT_CLI_UA,
            DEFAULT_EXT_UA,
            "https://www.pornpics.com",
            "https://www.pornpics.com/popular/",
            "https://www.pornpics.com/search/srch.php",
            "en",
            "cdni.pornpics.com/460",
            "cdni.pornpics.com/1280",
            100
        )
    }
}

impl Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

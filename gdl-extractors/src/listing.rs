//! Listing extractor for the popular and search feeds.
//!
//! Both feeds are paginated with `limit` and `offset` and answer with a JSON array of
//! [`GalleryReference`]s.
use gdl_common::{gallery::GalleryReference, log::debug, reqwest::Client};

use crate::{error::ExtractorError, extractor::ListingSource, extractor_config::ServerConfig};

/// Which listing endpoint a crawl reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingMode {
    Popular,
    Search(String),
}

impl ListingMode {
    /// An empty (or blank) query selects the popular feed.
    pub fn from_query(query: Option<&str>) -> Self {
        match query.map(str::trim) {
            Some(q) if !q.is_empty() => Self::Search(q.to_string()),
            _ => Self::Popular,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Popular => None,
            Self::Search(q) => Some(q),
        }
    }
}

/// Builds the listing URL for a page.
pub fn listing_url(config: &ServerConfig, mode: &ListingMode, limit: usize, offset: u64) -> String {
    match mode {
        ListingMode::Popular => {
            format!("{}?limit={limit}&offset={offset}", config.popular_url)
        }
        ListingMode::Search(query) => format!(
            "{}?q={}&lang={}&limit={limit}&offset={offset}",
            config.search_url,
            urlencoding::encode(query),
            config.search_language
        ),
    }
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    config: ServerConfig,
    mode: ListingMode,
}

impl PageFetcher {
    pub fn new(config: ServerConfig, mode: ListingMode) -> Result<Self, ExtractorError> {
        let client = Client::builder()
            .user_agent(&config.extractor_user_agent)
            .build()?;

        Ok(Self::with_client(client, config, mode))
    }

    pub fn with_client(client: Client, config: ServerConfig, mode: ListingMode) -> Self {
        Self {
            client,
            config,
            mode,
        }
    }

    pub const fn mode(&self) -> &ListingMode {
        &self.mode
    }

    /// Requests one page of the feed and decodes the gallery list.
    pub async fn fetch(
        &self,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<GalleryReference>, ExtractorError> {
        let url = listing_url(&self.config, &self.mode, limit, offset);
        debug!("Fetching listing page {url}");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractorError::InvalidServerResponse {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let references: Vec<GalleryReference> = serde_json::from_str(&body)?;

        debug!("Listing returned {} galleries", references.len());
        Ok(references)
    }
}

impl ListingSource for PageFetcher {
    async fn fetch_page(
        &self,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<GalleryReference>, ExtractorError> {
        self.fetch(limit, offset).await
    }
}

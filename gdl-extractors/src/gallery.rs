//! Gallery page extractor
//!
//! Scraping is best-effort: the page layout is not under our control, so a selector that matches
//! nothing yields an empty list instead of an error. Deciding whether a gallery is usable is left
//! to the caller (see [`GalleryMetadata::is_complete`]).
use gdl_common::{
    gallery::{GalleryMetadata, GalleryPage, ImageEntry},
    log::debug,
    reqwest::Client,
};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::{error::ExtractorError, extractor::GallerySource, extractor_config::ServerConfig};

static CATEGORY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#content > div.gallery-info.to-gall-info > div.tags:nth-child(3) > div > a > span")
        .expect("valid category selector")
});
static TAG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="/tags"] > span"#).expect("valid tag selector"));
static MODEL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="/pornstars"] > span"#).expect("valid model selector"));
static CHANNEL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="/channels"]"#).expect("valid channel selector"));
static THUMBNAIL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#tiles .thumbwook img").expect("valid thumbnail selector"));

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn select_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Keeps every match, even empty ones, so that positions in the list stay meaningful.
fn select_positional_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document.select(selector).map(element_text).collect()
}

/// Protocol-relative CDN links (`//cdn/...`) are turned into https URLs.
fn normalize_image_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("//") {
        return format!("https:{url}");
    }
    url.to_string()
}

/// Parses a gallery page into its metadata and thumbnail list.
pub fn parse_gallery(html: &str) -> GalleryPage {
    let document = Html::parse_document(html);

    let metadata = GalleryMetadata {
        categories: select_texts(&document, &CATEGORY_SELECTOR),
        tags: select_texts(&document, &TAG_SELECTOR),
        models: select_texts(&document, &MODEL_SELECTOR),
        channels: select_positional_texts(&document, &CHANNEL_SELECTOR),
    };

    let images = document
        .select(&THUMBNAIL_SELECTOR)
        .filter_map(|img| {
            let url = img.value().attr("data-src")?;
            if url.trim().is_empty() {
                return None;
            }
            Some(ImageEntry {
                url: normalize_image_url(url),
                caption: img.value().attr("alt").unwrap_or_default().trim().to_string(),
            })
        })
        .collect();

    GalleryPage { metadata, images }
}

#[derive(Debug, Clone)]
pub struct GalleryExtractor {
    client: Client,
}

impl GalleryExtractor {
    pub fn new(config: &ServerConfig) -> Result<Self, ExtractorError> {
        let client = Client::builder()
            .user_agent(&config.extractor_user_agent)
            .build()?;

        Ok(Self::with_client(client))
    }

    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a gallery page and scrapes it.
    pub async fn fetch(&self, gallery_url: &str) -> Result<GalleryPage, ExtractorError> {
        debug!("Fetching gallery {gallery_url}");
        let response = self.client.get(gallery_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractorError::InvalidServerResponse {
                url: gallery_url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        let page = parse_gallery(&html);

        debug!(
            "Gallery {} has {} images and {} channel entries",
            gallery_url,
            page.images.len(),
            page.metadata.channels.len()
        );
        Ok(page)
    }
}

impl GallerySource for GalleryExtractor {
    async fn extract(&self, gallery_url: &str) -> Result<GalleryPage, ExtractorError> {
        self.fetch(gallery_url).await
    }
}

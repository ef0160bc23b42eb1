//! Traits every extractor exposes to the crawl loop.
//!
//! The crawler only talks to the website through these seams, so it can be driven by the real
//! [`PageFetcher`](crate::listing::PageFetcher) and
//! [`GalleryExtractor`](crate::gallery::GalleryExtractor) or by canned data in tests.
use gdl_common::gallery::{GalleryPage, GalleryReference};
use std::future::Future;

use crate::error::ExtractorError;

/// A paginated feed of galleries.
pub trait ListingSource {
    /// Fetches up to `limit` gallery references starting at `offset`.
    fn fetch_page(
        &self,
        limit: usize,
        offset: u64,
    ) -> impl Future<Output = Result<Vec<GalleryReference>, ExtractorError>> + Send;
}

/// Something that can turn a gallery URL into its metadata and image list.
pub trait GallerySource {
    fn extract(
        &self,
        gallery_url: &str,
    ) -> impl Future<Output = Result<GalleryPage, ExtractorError>> + Send;
}

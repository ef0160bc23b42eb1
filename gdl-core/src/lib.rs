//! Crawl loop, image downloads and resumable pagination for `gallery_dataset`.
pub mod crawl;
pub mod downloader;
pub mod error;
pub mod offset;
pub mod processor;
pub mod progress;

pub use crawl::{CrawlOptions, CrawlSummary, Crawler, PageReport};
pub use downloader::{DownloadStatus, ImageDownloader};
pub use offset::OffsetStore;
pub use processor::{GalleryDownloader, GalleryOutcome, GalleryProcessor, ImageCounts};

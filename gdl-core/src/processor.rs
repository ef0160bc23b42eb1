//! Work done for one gallery reference: extract the page, then download every image.
use std::future::Future;
use std::path::PathBuf;

use gdl_common::gallery::GalleryReference;
use gdl_extractors::extractor::GallerySource;
use log::{debug, error};
use tokio::fs::create_dir_all;

use crate::downloader::{DownloadStatus, ImageDownloader};
use crate::error::QueueError;
use crate::progress::{no_op_progress_listener, LogType, SharedProgressListener};

/// Per-gallery image counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageCounts {
    pub downloaded: u64,
    pub existing: u64,
    pub failed: u64,
}

impl ImageCounts {
    pub fn add(&mut self, other: &Self) {
        self.downloaded += other.downloaded;
        self.existing += other.existing;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryOutcome {
    /// Not enough channel entries on the page. Nothing was written.
    Skipped,
    Processed(ImageCounts),
}

/// A unit of work run by the crawler for each listed gallery.
pub trait GalleryProcessor {
    fn process(
        &self,
        gallery: GalleryReference,
    ) -> impl Future<Output = Result<GalleryOutcome, QueueError>> + Send;
}

/// Default processor: extracts the gallery and stores its images under `<output>/<channel>/`.
#[derive(Debug)]
pub struct GalleryDownloader<G> {
    source: G,
    downloader: ImageDownloader,
    output_dir: PathBuf,
    progress: SharedProgressListener,
}

impl<G> GalleryDownloader<G> {
    pub fn new(
        source: G,
        downloader: ImageDownloader,
        output_dir: impl Into<PathBuf>,
        progress: Option<SharedProgressListener>,
    ) -> Self {
        Self {
            source,
            downloader,
            output_dir: output_dir.into(),
            progress: progress.unwrap_or_else(no_op_progress_listener),
        }
    }
}

impl<G> GalleryProcessor for GalleryDownloader<G>
where
    G: GallerySource + Send + Sync,
{
    async fn process(&self, gallery: GalleryReference) -> Result<GalleryOutcome, QueueError> {
        let page = self.source.extract(&gallery.gallery_url).await?;

        let channel = match page.metadata.channel_dir() {
            Some(channel) if page.metadata.is_complete() => channel,
            _ => {
                self.progress.log_event(
                    LogType::Skip,
                    &gallery.gallery_url,
                    "No channels found for gallery",
                );
                debug!("No channels found for gallery {}", gallery.gallery_url);
                return Ok(GalleryOutcome::Skipped);
            }
        };

        let dest_dir = self.output_dir.join(&channel);
        create_dir_all(&dest_dir)
            .await
            .map_err(|error| QueueError::DirCreationError {
                message: format!("{}: {}", dest_dir.display(), error),
            })?;
        self.progress.log_event(
            LogType::Info,
            &gallery.gallery_url,
            &format!("{} images into {}", page.images.len(), channel),
        );

        let mut counts = ImageCounts::default();
        for image in &page.images {
            match self
                .downloader
                .download(image, &dest_dir, &page.metadata)
                .await
            {
                Ok(DownloadStatus::Downloaded) => counts.downloaded += 1,
                Ok(DownloadStatus::Skipped) => counts.existing += 1,
                Err(error) => {
                    counts.failed += 1;
                    error!("Failed to download {}: {}", image.url, error);
                    self.progress
                        .log_event(LogType::Error, &image.url, &error.to_string());
                }
            }
        }

        debug!(
            "Gallery {} done: {} downloaded, {} existing, {} failed",
            gallery.gallery_url, counts.downloaded, counts.existing, counts.failed
        );
        Ok(GalleryOutcome::Processed(counts))
    }
}

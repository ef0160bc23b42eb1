//! Streams gallery images to disk together with their caption sidecar.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use futures::StreamExt;
use gdl_common::error::DownloadError;
use gdl_common::gallery::{GalleryMetadata, ImageEntry};
use gdl_common::{caption_path, PARTIAL_EXTENSION};
use gdl_extractors::extractor_config::ServerConfig;
use log::debug;
use reqwest::Client;
use tokio::fs::{remove_file, rename, try_exists, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::progress::{no_op_progress_listener, LogType, SharedProgressListener};

/// Outcome of a single image download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// The image was fetched and written.
    Downloaded,
    /// The image was already on disk.
    Skipped,
}

/// Takes the last path segment of an URL, ignoring any query string or fragment.
pub fn file_name_from_url(url: &str) -> Result<String, DownloadError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(DownloadError::InvalidFileName {
            url: url.to_string(),
        }),
    }
}

static NEXT_PARTIAL_ID: AtomicU64 = AtomicU64::new(0);

/// Temporary path an image is streamed into, unique per download so that two tasks writing the
/// same file name never share it.
fn partial_path(dest_dir: &Path, file_name: &str) -> PathBuf {
    let id = NEXT_PARTIAL_ID.fetch_add(1, Ordering::Relaxed);
    dest_dir.join(format!(
        "{file_name}.{}-{id}.{PARTIAL_EXTENSION}",
        std::process::id()
    ))
}

#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    config: ServerConfig,
    progress: SharedProgressListener,
}

impl ImageDownloader {
    pub fn new(
        config: &ServerConfig,
        progress: Option<SharedProgressListener>,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .user_agent(&config.client_user_agent)
            .build()?;

        Ok(Self::with_client(client, config, progress))
    }

    pub fn with_client(
        client: Client,
        config: &ServerConfig,
        progress: Option<SharedProgressListener>,
    ) -> Self {
        Self {
            client,
            config: config.clone(),
            progress: progress.unwrap_or_else(no_op_progress_listener),
        }
    }

    /// Downloads the high resolution variant of `image` into `dest_dir` and writes its caption.
    ///
    /// The presence of the image file is the only thing that decides whether it's fetched. An
    /// image already on disk is never requested again, but its caption is written if missing.
    pub async fn download(
        &self,
        image: &ImageEntry,
        dest_dir: &Path,
        metadata: &GalleryMetadata,
    ) -> Result<DownloadStatus, DownloadError> {
        let url = self.config.full_size_url(&image.url);
        let file_name = file_name_from_url(&url)?;
        let target = dest_dir.join(&file_name);
        let caption_file = caption_path(&target);

        if try_exists(&target).await? {
            if !try_exists(&caption_file).await? {
                Self::write_caption(&caption_file, &metadata.caption(&image.caption)).await?;
                self.progress
                    .log_event(LogType::Success, &file_name, "restored missing caption");
            }
            debug!("{} already exists, skipping", target.display());
            return Ok(DownloadStatus::Skipped);
        }

        let partial = partial_path(dest_dir, &file_name);

        if let Err(error) = self.fetch(&url, &file_name, &partial).await {
            if try_exists(&partial).await.unwrap_or(false) {
                if let Err(cleanup) = remove_file(&partial).await {
                    debug!("Could not remove {}: {}", partial.display(), cleanup);
                }
            }
            return Err(error);
        }

        rename(&partial, &target).await?;
        Self::write_caption(&caption_file, &metadata.caption(&image.caption)).await?;

        debug!("Finished downloading {} successfully.", file_name);
        Ok(DownloadStatus::Downloaded)
    }

    async fn fetch(&self, url: &str, file_name: &str, out_path: &Path) -> Result<(), DownloadError> {
        debug!("Fetching {} into file {}", url, out_path.display());

        let res = self.client.get(url).send().await?;

        if res.status().is_client_error() || res.status().is_server_error() {
            self.progress.log_event(
                LogType::Skip,
                file_name,
                &format!("skipped, server returned: {}", res.status()),
            );
            return Err(DownloadError::RemoteFileNotFound {
                status: res.status().as_u16(),
            });
        }

        let known_size = res.content_length();
        let dl_updater = self
            .progress
            .add_download_task(file_name.to_string(), known_size);
        let mut downloaded_bytes = 0;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(out_path)
            .await?;

        let mut bw = BufWriter::new(file);
        let mut stream = res.bytes_stream();

        while let Some(item) = stream.next().await {
            let mut chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    dl_updater.finish();
                    return Err(DownloadError::ChunkDownloadFail {
                        message: e.to_string(),
                    });
                }
            };
            downloaded_bytes += chunk.len() as u64;
            // Chunked responses: the total grows with what was received so far.
            if known_size.is_none() {
                dl_updater.set_total_size(downloaded_bytes);
            }
            dl_updater.set_progress(downloaded_bytes);

            if let Err(e) = bw.write_all_buf(&mut chunk).await {
                dl_updater.finish();
                return Err(e.into());
            }
        }

        let flushed = bw.flush().await;
        dl_updater.finish();
        flushed?;

        Ok(())
    }

    async fn write_caption(path: &Path, caption: &str) -> Result<(), DownloadError> {
        let mut caption_file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)
            .await?;

        caption_file.write_all(caption.as_bytes()).await?;
        caption_file.flush().await?;
        debug!("Wrote caption file {}", path.display());
        Ok(())
    }
}

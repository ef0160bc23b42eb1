//! The pagination loop.
//!
//! Each iteration fetches one listing page at the saved offset, fans the galleries out to a
//! bounded pool of tasks, waits for all of them and only then advances and persists the offset.
//! A page shorter than the requested size ends the crawl.
//!
//! ```text
//! FetchingPage -> DispatchingGalleries -> AwaitingCompletion -> AdvancingOffset -> FetchingPage
//!                                                                               \-> Done
//! ```
use std::sync::Arc;
use std::time::Duration;

use gdl_common::gallery::GalleryReference;
use gdl_extractors::extractor::ListingSource;
use log::{debug, error, info, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::error::QueueError;
use crate::offset::OffsetStore;
use crate::processor::{GalleryOutcome, GalleryProcessor, ImageCounts};
use crate::progress::{no_op_progress_listener, LogType, SharedProgressListener};

/// Knobs for the crawl loop.
#[derive(Debug, Clone, Copy)]
pub struct CrawlOptions {
    /// Galleries requested per listing page.
    pub page_size: usize,
    /// Max galleries processed at the same time.
    pub concurrency: usize,
    /// Wait before retrying a failed listing request.
    pub retry_delay: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            page_size: 5,
            concurrency: 10,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Aggregated results of the galleries of one listing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageReport {
    pub galleries_processed: u64,
    pub galleries_skipped: u64,
    pub galleries_failed: u64,
    pub images: ImageCounts,
}

impl PageReport {
    fn record(&mut self, gallery_url: &str, result: Result<GalleryOutcome, QueueError>) {
        match result {
            Ok(GalleryOutcome::Processed(counts)) => {
                self.galleries_processed += 1;
                self.images.add(&counts);
            }
            Ok(GalleryOutcome::Skipped) => self.galleries_skipped += 1,
            Err(error) => {
                self.galleries_failed += 1;
                error!("Failed to process gallery {}: {}", gallery_url, error);
            }
        }
    }

    fn add(&mut self, other: &Self) {
        self.galleries_processed += other.galleries_processed;
        self.galleries_skipped += other.galleries_skipped;
        self.galleries_failed += other.galleries_failed;
        self.images.add(&other.images);
    }
}

/// Returned by [`Crawler::run`] once the listing is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: u64,
    pub start_offset: u64,
    pub final_offset: u64,
    pub fetch_retries: u64,
    pub totals: PageReport,
}

type GalleryResult = (String, Result<GalleryOutcome, QueueError>);

enum CrawlState {
    FetchingPage,
    DispatchingGalleries(Vec<GalleryReference>),
    AwaitingCompletion {
        tasks: JoinSet<GalleryResult>,
        short_page: bool,
    },
    AdvancingOffset {
        short_page: bool,
    },
    Done,
}

pub struct Crawler<L, P> {
    listing: L,
    processor: Arc<P>,
    offsets: OffsetStore,
    options: CrawlOptions,
    slots: Arc<Semaphore>,
    progress: SharedProgressListener,
}

impl<L, P> Crawler<L, P>
where
    L: ListingSource,
    P: GalleryProcessor + Send + Sync + 'static,
{
    pub fn new(
        listing: L,
        processor: P,
        offsets: OffsetStore,
        options: CrawlOptions,
        progress: Option<SharedProgressListener>,
    ) -> Self {
        let options = CrawlOptions {
            page_size: options.page_size.max(1),
            concurrency: options.concurrency.max(1),
            ..options
        };

        Self {
            listing,
            processor: Arc::new(processor),
            offsets,
            slots: Arc::new(Semaphore::new(options.concurrency)),
            options,
            progress: progress.unwrap_or_else(no_op_progress_listener),
        }
    }

    /// Crawls from the saved offset until a short page is returned.
    ///
    /// Listing errors are retried forever at the same offset; gallery errors are only counted.
    pub async fn run(&self) -> CrawlSummary {
        let mut offset = self.offsets.load().await;
        let mut summary = CrawlSummary {
            start_offset: offset,
            ..Default::default()
        };
        let mut page_report = PageReport::default();
        let mut state = CrawlState::FetchingPage;

        info!("Starting crawl at offset {}", offset);

        loop {
            state = match state {
                CrawlState::FetchingPage => {
                    match self.listing.fetch_page(self.options.page_size, offset).await {
                        Ok(galleries) => {
                            debug!("Offset {}: {} galleries", offset, galleries.len());
                            self.progress.inc_main_total(galleries.len() as u64);
                            CrawlState::DispatchingGalleries(galleries)
                        }
                        Err(error) => {
                            summary.fetch_retries += 1;
                            warn!(
                                "Error fetching galleries at offset {}: {}. Retrying in {:?}",
                                offset, error, self.options.retry_delay
                            );
                            self.progress.log_event(
                                LogType::Warning,
                                &format!("offset {offset}"),
                                &error.to_string(),
                            );
                            sleep(self.options.retry_delay).await;
                            CrawlState::FetchingPage
                        }
                    }
                }
                CrawlState::DispatchingGalleries(galleries) => {
                    let short_page = galleries.len() < self.options.page_size;
                    let mut tasks = JoinSet::new();
                    for gallery in galleries {
                        let processor = self.processor.clone();
                        let slots = self.slots.clone();

                        tasks.spawn(async move {
                            let url = gallery.gallery_url.clone();
                            let _permit = match slots.acquire_owned().await {
                                Ok(permit) => permit,
                                Err(_) => return (url, Err(QueueError::WorkerPoolClosed)),
                            };
                            let result = processor.process(gallery).await;
                            (url, result)
                        });
                    }
                    CrawlState::AwaitingCompletion { tasks, short_page }
                }
                CrawlState::AwaitingCompletion {
                    mut tasks,
                    short_page,
                } => {
                    page_report = PageReport::default();
                    while let Some(joined) = tasks.join_next().await {
                        self.progress.main_tick();
                        match joined {
                            Ok((url, result)) => page_report.record(&url, result),
                            Err(join_error) => {
                                page_report.galleries_failed += 1;
                                error!("Gallery task failed to execute: {}", join_error);
                            }
                        }
                    }
                    CrawlState::AdvancingOffset { short_page }
                }
                CrawlState::AdvancingOffset { short_page } => {
                    summary.pages += 1;
                    summary.totals.add(&page_report);
                    offset += self.options.page_size as u64;

                    if let Err(error) = self.offsets.save(offset).await {
                        error!(
                            "Error saving offset {} to {}: {}",
                            offset,
                            self.offsets.path().display(),
                            error
                        );
                    }
                    info!(
                        "Page done ({} processed, {} skipped, {} failed), next offset {}",
                        page_report.galleries_processed,
                        page_report.galleries_skipped,
                        page_report.galleries_failed,
                        offset
                    );

                    if short_page {
                        CrawlState::Done
                    } else {
                        CrawlState::FetchingPage
                    }
                }
                CrawlState::Done => break,
            };
        }

        summary.final_offset = offset;
        self.progress.main_done();
        info!("No more galleries, crawl finished at offset {}", offset);
        summary
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use gdl_extractors::error::ExtractorError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays canned pages. `None` entries simulate a failed request.
    #[derive(Clone)]
    struct ScriptedListing {
        pages: Arc<Mutex<VecDeque<Option<Vec<GalleryReference>>>>>,
        requested: Arc<Mutex<Vec<u64>>>,
    }

    impl ScriptedListing {
        fn new(pages: Vec<Option<Vec<GalleryReference>>>) -> Self {
            Self {
                pages: Arc::new(Mutex::new(pages.into())),
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl ListingSource for ScriptedListing {
        async fn fetch_page(
            &self,
            _limit: usize,
            offset: u64,
        ) -> Result<Vec<GalleryReference>, ExtractorError> {
            self.requested.lock().unwrap().push(offset);
            let next = self.pages.lock().unwrap().pop_front();
            match next {
                Some(Some(page)) => Ok(page),
                Some(None) => Err(ExtractorError::InvalidServerResponse {
                    url: format!("listing?offset={offset}"),
                    status: 503,
                }),
                None => panic!("fetched past the end of the listing"),
            }
        }
    }

    #[derive(Default)]
    struct RecordingProcessor {
        running: AtomicUsize,
        max_running: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl GalleryProcessor for Arc<RecordingProcessor> {
        async fn process(&self, gallery: GalleryReference) -> Result<GalleryOutcome, QueueError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(gallery.gallery_url.clone());

            if gallery.gallery_url.contains("fail") {
                return Err(QueueError::DirCreationError {
                    message: "denied".to_string(),
                });
            }
            if gallery.gallery_url.contains("nochannel") {
                return Ok(GalleryOutcome::Skipped);
            }
            Ok(GalleryOutcome::Processed(ImageCounts {
                downloaded: 2,
                existing: 1,
                failed: 0,
            }))
        }
    }

    fn refs(prefix: &str, count: usize) -> Vec<GalleryReference> {
        (0..count)
            .map(|i| GalleryReference {
                gallery_url: format!("http://gallery.test/{prefix}-{i}/"),
                description: String::new(),
            })
            .collect()
    }

    fn options(page_size: usize, concurrency: usize) -> CrawlOptions {
        CrawlOptions {
            page_size,
            concurrency,
            retry_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn stops_after_short_page() {
        let dir = tempfile::tempdir().unwrap();
        let listing = ScriptedListing::new(vec![
            Some(refs("a", 5)),
            Some(refs("b", 5)),
            Some(refs("c", 2)),
        ]);
        let processor = Arc::new(RecordingProcessor::default());
        let store = OffsetStore::for_query(dir.path(), None);

        let crawler = Crawler::new(
            listing.clone(),
            processor.clone(),
            store.clone(),
            options(5, 10),
            None,
        );
        let summary = crawler.run().await;

        assert_eq!(*listing.requested.lock().unwrap(), vec![1, 6, 11]);
        assert!(listing.pages.lock().unwrap().is_empty());
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.start_offset, 1);
        assert_eq!(summary.final_offset, 16);
        assert_eq!(summary.totals.galleries_processed, 12);
        assert_eq!(summary.totals.images.downloaded, 24);
        assert_eq!(processor.seen.lock().unwrap().len(), 12);
        // The short page still advances the saved offset.
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "16\n");
    }

    #[tokio::test]
    async fn failed_fetch_retries_same_offset() {
        let dir = tempfile::tempdir().unwrap();
        let listing = ScriptedListing::new(vec![
            Some(refs("a", 5)),
            None,
            None,
            Some(vec![]),
        ]);
        let processor = Arc::new(RecordingProcessor::default());

        let crawler = Crawler::new(
            listing.clone(),
            processor,
            OffsetStore::for_query(dir.path(), None),
            options(5, 10),
            None,
        );
        let summary = crawler.run().await;

        assert_eq!(*listing.requested.lock().unwrap(), vec![1, 6, 6, 6]);
        assert_eq!(summary.fetch_retries, 2);
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.final_offset, 11);
    }

    #[tokio::test]
    async fn resumes_from_saved_offset() {
        let dir = tempfile::tempdir().unwrap();
        let store = OffsetStore::for_query(dir.path(), Some("red hair"));
        store.save(41).await.unwrap();

        let listing = ScriptedListing::new(vec![Some(refs("a", 1))]);
        let crawler = Crawler::new(
            listing.clone(),
            Arc::new(RecordingProcessor::default()),
            store.clone(),
            options(5, 10),
            None,
        );
        let summary = crawler.run().await;

        assert_eq!(*listing.requested.lock().unwrap(), vec![41]);
        assert_eq!(summary.final_offset, 46);
        assert_eq!(store.load().await, 46);
    }

    #[tokio::test]
    async fn respects_concurrency_bound() {
        let dir = tempfile::tempdir().unwrap();
        let listing = ScriptedListing::new(vec![
            Some(refs("a", 12)),
            Some(refs("b", 3)),
        ]);
        let processor = Arc::new(RecordingProcessor::default());

        let crawler = Crawler::new(
            listing,
            processor.clone(),
            OffsetStore::for_query(dir.path(), None),
            options(12, 3),
            None,
        );
        crawler.run().await;

        let max = processor.max_running.load(Ordering::SeqCst);
        assert!(max <= 3, "ran {max} galleries at once");
        assert!(max >= 1);
        assert_eq!(processor.seen.lock().unwrap().len(), 15);
    }

    #[tokio::test]
    async fn failing_gallery_does_not_stop_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = refs("ok", 3);
        page.push(GalleryReference {
            gallery_url: "http://gallery.test/fail/".to_string(),
            description: String::new(),
        });
        page.push(GalleryReference {
            gallery_url: "http://gallery.test/nochannel/".to_string(),
            description: String::new(),
        });
        let listing = ScriptedListing::new(vec![Some(page), Some(vec![])]);

        let crawler = Crawler::new(
            listing,
            Arc::new(RecordingProcessor::default()),
            OffsetStore::for_query(dir.path(), None),
            options(5, 2),
            None,
        );
        let summary = crawler.run().await;

        assert_eq!(summary.totals.galleries_processed, 3);
        assert_eq!(summary.totals.galleries_failed, 1);
        assert_eq!(summary.totals.galleries_skipped, 1);
        assert_eq!(summary.pages, 2);
    }
}

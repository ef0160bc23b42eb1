use std::fmt::Debug;
use std::sync::Arc;

/// Type of log event, used for styling or filtering messages in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    /// General informational message.
    Info,
    /// A gallery or image was skipped (already on disk, no channel found).
    Skip,
    /// A caption file or image was written.
    Success,
    /// A listing request failed and will be retried.
    Warning,
    /// A gallery or image failed and was abandoned.
    Error,
}

/// Reports crawl progress. The main counter tracks galleries.
///
/// All methods should be thread-safe.
pub trait ProgressListener: Send + Sync + Debug {
    /// Increments the number of galleries expected, called once per fetched listing page.
    fn inc_main_total(&self, delta: u64);
    /// Signals that one gallery has been handled (processed, skipped or failed).
    fn main_tick(&self);
    /// Signals that the crawl has finished.
    fn main_done(&self);

    /// Adds a per-file progress task for an image being streamed to disk.
    fn add_download_task(
        &self,
        name: String,
        total_size: Option<u64>,
    ) -> Box<dyn DownloadProgressUpdater>;

    /// Logs a categorized event message to be displayed in the progress UI.
    ///
    /// * `target`: what the message is about (image file name, gallery URL).
    fn log_event(&self, log_type: LogType, target: &str, message: &str);
}

/// Updates the progress of a single image download.
pub trait DownloadProgressUpdater: Send + Sync + Debug {
    fn set_progress(&self, bytes_downloaded: u64);
    fn set_total_size(&self, total_size: u64);
    /// Signals that this download task is finished (successfully or not).
    fn finish(&self);
}

/// Used as a default when the caller doesn't want progress output.
#[derive(Debug, Clone)]
pub struct NoOpProgressListener;

impl ProgressListener for NoOpProgressListener {
    fn inc_main_total(&self, _delta: u64) {}
    fn main_tick(&self) {}
    fn main_done(&self) {}
    fn add_download_task(
        &self,
        _name: String,
        _total_size: Option<u64>,
    ) -> Box<dyn DownloadProgressUpdater> {
        Box::new(NoOpDownloadProgressUpdater)
    }
    fn log_event(&self, _log_type: LogType, _target: &str, _message: &str) {}
}

#[derive(Debug, Clone)]
pub struct NoOpDownloadProgressUpdater;

impl DownloadProgressUpdater for NoOpDownloadProgressUpdater {
    fn set_progress(&self, _bytes_downloaded: u64) {}
    fn set_total_size(&self, _total_size: u64) {}
    fn finish(&self) {}
}

pub type SharedProgressListener = Arc<dyn ProgressListener>;

pub fn no_op_progress_listener() -> SharedProgressListener {
    Arc::new(NoOpProgressListener)
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every event and total size update it receives.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingListener {
        pub events: Mutex<Vec<(LogType, String)>>,
        pub totals: Arc<Mutex<Vec<u64>>>,
    }

    #[derive(Debug)]
    struct RecordingUpdater {
        totals: Arc<Mutex<Vec<u64>>>,
    }

    impl DownloadProgressUpdater for RecordingUpdater {
        fn set_progress(&self, _bytes_downloaded: u64) {}
        fn set_total_size(&self, total_size: u64) {
            self.totals.lock().unwrap().push(total_size);
        }
        fn finish(&self) {}
    }

    impl ProgressListener for RecordingListener {
        fn inc_main_total(&self, _delta: u64) {}
        fn main_tick(&self) {}
        fn main_done(&self) {}
        fn add_download_task(
            &self,
            _name: String,
            _total_size: Option<u64>,
        ) -> Box<dyn DownloadProgressUpdater> {
            Box::new(RecordingUpdater {
                totals: self.totals.clone(),
            })
        }
        fn log_event(&self, log_type: LogType, _target: &str, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push((log_type, message.to_string()));
        }
    }
}

use std::io;

use gdl_extractors::error::ExtractorError;
use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to access file: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    #[error("Failed to create destination directory. error: {message}")]
    DirCreationError { message: String },

    #[error("Failed to extract gallery: {source}")]
    ExtractorError {
        #[from]
        source: ExtractorError,
    },

    #[error("Worker pool was closed before the gallery could start")]
    WorkerPoolClosed,
}

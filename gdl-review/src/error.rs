use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Failed to access file: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    #[error("Failed to walk dataset directory: {source}")]
    DatasetWalkFail {
        #[from]
        source: walkdir::Error,
    },

    #[error("Failed to encode processed records: {source}")]
    JsonSerializeFail {
        #[from]
        source: serde_json::Error,
    },

    #[error("{name} is not a valid dataset file name")]
    InvalidFileName { name: String },

    #[error("Background task failed: {source}")]
    TaskJoinFail {
        #[from]
        source: tokio::task::JoinError,
    },
}

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Failed to access file: {source}")]
    FileIOError {
        #[from]
        source: io::Error,
    },

    #[error("Failed to connect to download URL: {source}")]
    ConnectionFail {
        #[from]
        source: reqwest::Error,
    },

    #[error("Image URL is valid but the remote file doesn't exist (status {status})")]
    RemoteFileNotFound { status: u16 },

    #[error("Error while fetching chunk: {message}")]
    ChunkDownloadFail { message: String },

    #[error("Image URL {url} has no usable file name")]
    InvalidFileName { url: String },
}

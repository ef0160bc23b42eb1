use std::io;

use gdl_extractors::error::ExtractorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to access file: {source}")]
    IOError {
        #[from]
        source: io::Error,
    },

    #[error("Failed to read server config: {source}")]
    ServerConfigFail {
        #[from]
        source: ExtractorError,
    },

    #[error("Could not determine a config directory for this platform")]
    ConfigDirNotFound,
}

use std::path::PathBuf;

use thiserror::Error;

/// Enumerates the possible errors that can arise while talking to the gallery website.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The server answered with a non-success status code.
    #[error("Server returned an invalid response (status {status}) for {url}")]
    InvalidServerResponse { url: String, status: u16 },

    /// An error occurred during a network request (e.g., connection timeout, DNS resolution failure).
    /// Wraps an underlying `reqwest::Error`.
    #[error("Connection Error: {0}")]
    ConnectionError(#[from] reqwest::Error),

    /// An error occurred while deserializing a JSON response from the listing API.
    #[error("Error while deserializing JSON: {0}")]
    JsonSerializeFail(#[from] serde_json::Error),

    /// The requested server name is not part of the built-in or configured servers.
    #[error("Selected server does not exist: {name}")]
    ServerNotExists { name: String },

    /// The server configuration file could not be read or written.
    #[error("Failed to access server config file {path}: {source}")]
    ServerConfigIO {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The server configuration file is not valid TOML for a server table.
    #[error("Failed to parse server config file: {0}")]
    ServerConfigParse(#[from] toml::de::Error),
}

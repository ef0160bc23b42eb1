use gdl_common::{
    log::debug,
    serde::{self, Deserialize},
};
use std::collections::HashMap;
use std::fs::{read_to_string, write};
use std::path::Path;

use super::{ServerConfig, CLIENT_UA_NAME, EXTRACTOR_UA_NAME};
use crate::error::ExtractorError;

pub const SAMPLE_SERVER_TOML: &str = include_str!("sample.toml");

#[derive(Debug, Deserialize)]
#[serde(crate = "self::serde")]
struct Config {
    #[serde(default)]
    servers: HashMap<String, Server>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "self::serde")]
struct Server {
    pretty_name: String,
    base_url: String,
    popular_url: String,
    search_url: String,
    #[serde(default = "default_language")]
    search_language: String,
    #[serde(default)]
    thumbnail_segment: String,
    #[serde(default)]
    full_size_segment: String,
    max_page_limit: usize,
}

fn default_language() -> String {
    String::from("en")
}

/// Parses a server table in TOML form and merges it into `smap`.
pub fn parse_server_cfg(
    contents: &str,
    smap: &mut HashMap<String, ServerConfig>,
) -> Result<(), ExtractorError> {
    let config: Config = toml::from_str(contents)?;

    for (id, data) in config.servers {
        let config = ServerConfig {
            name: id.clone(),
            pretty_name: data.pretty_name,
            client_user_agent: format!("{}/{}", CLIENT_UA_NAME, env!("CARGO_PKG_VERSION")),
            extractor_user_agent: format!("{}/{}", EXTRACTOR_UA_NAME, env!("CARGO_PKG_VERSION")),
            base_url: data.base_url,
            popular_url: data.popular_url,
            search_url: data.search_url,
            search_language: data.search_language,
            thumbnail_segment: data.thumbnail_segment,
            full_size_segment: data.full_size_segment,
            max_page_limit: data.max_page_limit,
        };
        smap.insert(id, config);
    }

    debug!("Configured servers: {:?}", smap.keys());
    Ok(())
}

/// Reads the server config file at `path`, writing the commented sample first if it doesn't exist.
pub fn read_server_cfg_file(
    path: &Path,
    smap: &mut HashMap<String, ServerConfig>,
) -> Result<(), ExtractorError> {
    let io_err = |source| ExtractorError::ServerConfigIO {
        path: path.to_path_buf(),
        source,
    };

    if !path.exists() {
        write(path, SAMPLE_SERVER_TOML).map_err(io_err)?;
    }

    let contents = read_to_string(path).map_err(io_err)?;
    parse_server_cfg(&contents, smap)
}

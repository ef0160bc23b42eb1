use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use gdl_extractors::extractor_config::{
    DEFAULT_SERVERS, ServerConfig, serialize::read_server_cfg_file,
};
use log::{debug, warn};

use super::AVAILABLE_SERVERS;
use crate::error::CliError;

/// Env var overriding the directory that holds `servers.toml`.
pub const SERVER_CFG_ENV: &str = "GDL_SERVER_CFG";

fn config_dir() -> Result<PathBuf, CliError> {
    let cfg_path = match env::var(SERVER_CFG_ENV) {
        Ok(path) => PathBuf::from(path),
        Err(_) => ProjectDirs::from("com", "gallery-dataset", "gallery-dataset")
            .ok_or(CliError::ConfigDirNotFound)?
            .config_dir()
            .to_path_buf(),
    };

    if !cfg_path.exists() {
        fs::create_dir_all(&cfg_path)?;
    }

    Ok(cfg_path)
}

fn load_user_servers(servers: &mut HashMap<String, ServerConfig>) -> Result<(), CliError> {
    let cfg_path = config_dir()?.join(Path::new("servers.toml"));
    debug!("Reading servers from {}", cfg_path.display());
    read_server_cfg_file(&cfg_path, servers)?;
    Ok(())
}

/// Built-in servers merged with the ones from `servers.toml`.
///
/// A broken or unreadable config file only costs the user-defined servers.
pub fn get_servers<'a>() -> &'a HashMap<String, ServerConfig> {
    AVAILABLE_SERVERS.get_or_init(|| {
        let mut servers = DEFAULT_SERVERS.clone();

        if let Err(error) = load_user_servers(&mut servers) {
            warn!("Ignoring custom servers: {}", error);
        }

        servers
    })
}

pub fn validate_server(input: &str) -> Result<ServerConfig, String> {
    let servers = get_servers();

    servers.get(input).map_or_else(
        || {
            Err(format!(
                "Invalid server: {}. Allowed servers are: {:?}",
                input,
                servers.keys()
            ))
        },
        |server| Ok(server.clone()),
    )
}

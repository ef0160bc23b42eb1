use gdl_core::crawl::CrawlOptions;
use gdl_core::offset::OffsetStore;
use gdl_extractors::extractor_config::ServerConfig;
use gdl_extractors::listing::ListingMode;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use self::extra::validate_server;

pub(crate) mod extra;

pub use extra::get_servers;

pub static AVAILABLE_SERVERS: OnceCell<HashMap<String, ServerConfig>> = OnceCell::new();

#[derive(Parser, Debug)]
#[clap(name = "Gallery Dataset Downloader", author, version, about, long_about = None)]
pub struct Cli {
    /// Specify which website to crawl
    ///
    /// Extra websites can be added in servers.toml
    #[clap(short, long, ignore_case = true, default_value_t = ServerConfig::default(), value_parser = validate_server)]
    pub server: ServerConfig,

    /// Print all available servers and exit
    #[clap(long)]
    pub servers: bool,

    /// Search for galleries matching this text instead of crawling the popular feed
    #[clap(short, long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Where to save images and captions (If the path doesn't exist, it will be created.)
    #[clap(
        short = 'o',
        long,
        value_name = "PATH",
        default_value = "dataset",
        help_heading = "SAVE"
    )]
    pub output: PathBuf,

    /// Directory holding the resumable offset files
    #[clap(long, value_name = "PATH", default_value = ".", help_heading = "SAVE")]
    pub offset_dir: PathBuf,

    /// Number of galleries requested per listing page
    ///
    /// [max: 100]
    #[clap(
        short,
        long,
        value_name = "NUMBER",
        value_parser(clap::value_parser!(u8).range(1..=100)),
        default_value_t = 5,
        help_heading = "DOWNLOAD"
    )]
    pub limit: u8,

    /// Number of galleries processed at the same time
    ///
    /// [max: 20]
    #[clap(
        short = 'd',
        value_name = "NUMBER",
        value_parser(clap::value_parser!(u8).range(1..=20)),
        default_value_t = 10,
        help_heading = "DOWNLOAD"
    )]
    pub simultaneous_downloads: u8,

    /// Seconds to wait before retrying a failed listing request
    #[clap(
        long,
        value_name = "SECONDS",
        default_value_t = 5,
        help_heading = "DOWNLOAD"
    )]
    pub retry_delay: u64,
}

impl Cli {
    /// Page size, capped by what the selected server accepts.
    pub fn page_size(&self) -> usize {
        let limit = usize::from(self.limit);
        if self.server.max_page_limit == 0 {
            return limit;
        }
        limit.min(self.server.max_page_limit)
    }

    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            page_size: self.page_size(),
            concurrency: usize::from(self.simultaneous_downloads),
            retry_delay: Duration::from_secs(self.retry_delay),
        }
    }

    pub fn listing_mode(&self) -> ListingMode {
        ListingMode::from_query(self.query.as_deref())
    }

    pub fn offset_store(&self) -> OffsetStore {
        OffsetStore::for_query(&self.offset_dir, self.listing_mode().query())
    }
}

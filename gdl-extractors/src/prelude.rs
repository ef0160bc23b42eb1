pub use crate::error::ExtractorError;
pub use crate::extractor::{GallerySource, ListingSource};
pub use crate::extractor_config::{ServerConfig, DEFAULT_SERVER, DEFAULT_SERVERS};
pub use crate::gallery::{parse_gallery, GalleryExtractor};
pub use crate::listing::{ListingMode, PageFetcher};

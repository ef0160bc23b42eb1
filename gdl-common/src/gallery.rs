//! Main representation of a scraped gallery
//!
//! # Gallery
//! A gallery is reached through a [`GalleryReference`] listed by the site's feed. Its page
//! yields a [`GalleryPage`]: the shared [`GalleryMetadata`] and one [`ImageEntry`] per thumbnail.
use serde::{Deserialize, Serialize};

/// Minimum number of channel entries a gallery needs to be processed.
///
/// The first entry is the breadcrumb label, so at least one real channel must follow it.
pub const MIN_CHANNEL_ENTRIES: usize = 2;

/// Entry returned by the listing endpoints (popular feed or search).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryReference {
    /// Absolute URL of the gallery page.
    #[serde(rename = "g_url")]
    pub gallery_url: String,
    /// Short description given by the feed.
    #[serde(rename = "desc", default)]
    pub description: String,
}

/// Metadata shared by every image of a gallery.
///
/// All fields are best-effort: a selector that matches nothing leaves its list empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryMetadata {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub models: Vec<String>,
    /// Channel links in page order. Index 0 is a generic breadcrumb, not a channel.
    pub channels: Vec<String>,
}

impl GalleryMetadata {
    /// A gallery without at least one real channel is skipped entirely.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.channels.len() >= MIN_CHANNEL_ENTRIES
    }

    /// Channel names without the leading breadcrumb entry.
    #[inline]
    pub fn real_channels(&self) -> &[String] {
        self.channels.get(1..).unwrap_or_default()
    }

    /// Name of the dataset subdirectory for this gallery, taken from the first real channel.
    ///
    /// Path separators are replaced so a channel name can never escape the dataset root.
    pub fn channel_dir(&self) -> Option<String> {
        let channel = self.real_channels().first()?;
        let name = channel
            .trim()
            .replace(['/', '\\'], "_")
            .replace("..", "_");

        if name.is_empty() {
            return None;
        }

        if cfg!(windows) {
            return Some(name.replace(':', "_"));
        }
        Some(name)
    }

    /// Builds the caption written next to each downloaded image.
    pub fn caption(&self, description: &str) -> String {
        format!(
            "{}, Categories: {}, Tags: {}, Models: {}, Channels: {}",
            description,
            self.categories.join(", "),
            self.tags.join(", "),
            self.models.join(", "),
            self.real_channels().join(", ")
        )
    }
}

/// A single image found in a gallery's thumbnail grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Thumbnail URL as listed on the page.
    pub url: String,
    /// The `alt` text of the thumbnail, used as the caption prefix.
    pub caption: String,
}

/// Everything extracted from a single gallery page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryPage {
    pub metadata: GalleryMetadata,
    pub images: Vec<ImageEntry>,
}

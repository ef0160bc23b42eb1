use std::path::{Path, PathBuf};

// Public Exports
pub use log;
pub use reqwest;
pub use serde;
pub use serde_json;
pub use tokio;

pub mod error;
pub mod gallery;

/// Extension appended to an image's file name to build its caption sidecar.
pub const CAPTION_EXTENSION: &str = "txt";

/// Returns the caption sidecar path for an image, keeping the image's own extension.
///
/// `dataset/channel/photo.jpg` becomes `dataset/channel/photo.jpg.txt`.
#[inline]
pub fn caption_path(image: &Path) -> PathBuf {
    let mut name = image.as_os_str().to_owned();
    name.push(".");
    name.push(CAPTION_EXTENSION);
    PathBuf::from(name)
}

/// Extension of an image that is still being streamed to disk.
pub const PARTIAL_EXTENSION: &str = "part";

/// Checks whether a dataset file is a caption sidecar rather than an image.
#[inline]
pub fn is_caption_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CAPTION_EXTENSION))
}

/// Checks whether a dataset file is an unfinished download.
#[inline]
pub fn is_partial_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PARTIAL_EXTENSION))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn caption_path_keeps_image_extension() {
        let path = caption_path(Path::new("dataset/studio/photo_01.jpg"));
        assert_eq!(path, PathBuf::from("dataset/studio/photo_01.jpg.txt"));
        assert!(is_caption_file(&path));
        assert!(!is_caption_file(Path::new("dataset/studio/photo_01.jpg")));
    }
}

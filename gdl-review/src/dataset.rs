//! Read side of the scraped dataset and the write side of the refined one.
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use gdl_common::{caption_path, is_caption_file, is_partial_file};
use log::debug;
use tokio::fs::{copy, create_dir_all, read_to_string, write};
use tokio::task::spawn_blocking;
use walkdir::WalkDir;

use crate::error::ReviewError;

/// A directory tree of images with caption sidecars.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
}

impl Dataset {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative `/`-separated paths of every image under the root, sorted.
    pub async fn image_files(&self) -> Result<Vec<String>, ReviewError> {
        let root = self.root.clone();
        spawn_blocking(move || list_images(&root)).await?
    }

    /// Absolute path of a dataset file, rejecting names that would leave the root.
    pub fn resolve(&self, file: &str) -> Result<PathBuf, ReviewError> {
        let relative = Path::new(file);
        let is_plain = !file.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_plain {
            return Err(ReviewError::InvalidFileName {
                name: file.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }

    /// Caption of an image, or an empty string if it has none.
    pub async fn load_caption(&self, file: &str) -> Result<String, ReviewError> {
        let path = caption_path(&self.resolve(file)?);
        match read_to_string(&path).await {
            Ok(caption) => Ok(caption),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(error) => Err(error.into()),
        }
    }
}

fn list_images(root: &Path) -> Result<Vec<String>, ReviewError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type().is_file() || is_caption_file(path) || is_partial_file(path) {
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(name);
    }

    files.sort();
    debug!("Found {} images under {}", files.len(), root.display());
    Ok(files)
}

/// Copies the image into `refined_root`, keeping its subdirectory, and writes `label` as its caption.
pub async fn save_to_refined(
    dataset: &Dataset,
    refined_root: &Path,
    file: &str,
    label: &str,
) -> Result<(), ReviewError> {
    let source = dataset.resolve(file)?;
    let target = Dataset::new(refined_root).resolve(file)?;

    if let Some(parent) = target.parent() {
        create_dir_all(parent).await?;
    }

    copy(&source, &target).await?;
    write(caption_path(&target), label).await?;

    debug!("Saved {} to {}", file, target.display());
    Ok(())
}

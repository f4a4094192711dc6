//! Responsive image selection and download.
//!
//! Articles carry an `srcset` such as
//! `https://img/a_400.jpg 400w, https://img/a_1200.jpg 1200w`. The widest
//! candidate is picked, resolved against the page it came from, and later
//! saved under the images folder named after its final path segment.

use std::path::{Path, PathBuf};

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

use crate::error::{Error, Result};

/// One entry of a responsive image descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub width: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error("empty image descriptor")]
    Empty,
    #[error("malformed descriptor entry `{0}`")]
    Malformed(String),
}

/// Parse every `"url 640w"` entry. Blank entries (trailing commas) are ignored.
pub fn parse_srcset(descriptor: &str) -> std::result::Result<Vec<ImageCandidate>, CandidateError> {
    let mut candidates = Vec::new();
    for entry in descriptor.split(',') {
        let parts: Vec<&str> = entry.split_whitespace().collect();
        let (url, width) = match parts.as_slice() {
            [] => continue,
            [url, .., width] => (*url, *width),
            [_] => return Err(CandidateError::Malformed(entry.trim().to_string())),
        };
        let digits = width.strip_suffix(|c: char| c.is_ascii_alphabetic()).unwrap_or(width);
        let width = digits
            .parse::<u32>()
            .map_err(|_| CandidateError::Malformed(entry.trim().to_string()))?;
        candidates.push(ImageCandidate {
            url: url.to_string(),
            width,
        });
    }
    if candidates.is_empty() {
        return Err(CandidateError::Empty);
    }
    Ok(candidates)
}

/// URL of the widest candidate; the first one wins a tie.
pub fn best_candidate(descriptor: &str) -> std::result::Result<String, CandidateError> {
    let mut candidates = parse_srcset(descriptor)?;
    candidates.sort_by(|a, b| b.width.cmp(&a.width));
    Ok(candidates.swap_remove(0).url)
}

/// File name for a downloaded image: last path segment, query and fragment removed.
pub fn image_file_name(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let name = url.path_segments()?.next_back()?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Destination for selected images.
pub trait ImageStore {
    /// Fetch `url` and persist it, returning where it was written.
    async fn save(&self, url: &str) -> Result<PathBuf>;
}

/// Folder the selected images are saved into, relative to the working directory.
pub const IMAGES_DIR: &str = "images";

/// Saves images fetched over HTTP into a local folder.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    dir: PathBuf,
}

impl ImageDownloader {
    pub fn new(client: Client, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageStore for ImageDownloader {
    #[instrument(level = "info", skip(self))]
    async fn save(&self, url: &str) -> Result<PathBuf> {
        let name = image_file_name(url)
            .ok_or_else(|| Error::InvalidUrl(format!("no file name in {url}")))?;

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(Error::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await?;

        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&name);
        fs::write(&path, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "Image saved");
        Ok(path)
    }
}

/// Make a candidate URL absolute against the page it was found on.
pub fn resolve_candidate(base: &Url, candidate: &str) -> Result<String> {
    base.join(candidate)
        .map(String::from)
        .map_err(|e| Error::InvalidUrl(format!("{candidate}: {e}")))
}

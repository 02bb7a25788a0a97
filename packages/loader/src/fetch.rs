//! One-time download of the dataset when it is not present locally.
//!
//! The file is written to a `.part` sibling first and renamed into place
//! once complete, so an interrupted download is retried on the next run
//! instead of being mistaken for a finished one.

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::LoadError;
use crate::progress::ProgressCallback;

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Downloads `url` to `path` unless `path` already exists.
///
/// Bodies of URLs ending in `.gz` are gunzipped before being written.
/// Returns `true` when a download happened and `false` when the local file
/// was already there.
///
/// # Errors
///
/// Returns [`LoadError::Http`] if the request fails or the server returns
/// an error status, and [`LoadError::Io`] if the file cannot be written.
pub async fn ensure_local(
    path: &Path,
    url: &str,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<bool, LoadError> {
    if tokio::fs::try_exists(path).await? {
        log::debug!("{} already present, skipping download", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    log::info!("Downloading dataset from {url}");
    progress.set_message(format!("Downloading {url}"));

    let mut response = reqwest::get(url).await?.error_for_status()?;
    if let Some(len) = response.content_length() {
        progress.set_total(len);
    }

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        progress.inc(chunk.len() as u64);
        body.extend_from_slice(&chunk);
    }

    log::debug!("Downloaded {} bytes from {url}", body.len());

    let body = if url.ends_with(".gz") {
        let mut decoder = flate2::read::GzDecoder::new(body.as_slice());
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        log::debug!("Decompressed to {} bytes", decompressed.len());
        decompressed
    } else {
        body
    };

    let part = part_path(path);
    tokio::fs::write(&part, &body).await?;
    tokio::fs::rename(&part, path).await?;

    log::info!("Saved dataset to {}", path.display());
    progress.finish(format!("Saved {} bytes to {}", body.len(), path.display()));

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::null_progress;

    #[test]
    fn part_path_is_a_sibling() {
        assert_eq!(
            part_path(Path::new("data/crime.csv")),
            PathBuf::from("data/crime.csv.part")
        );
    }

    #[tokio::test]
    async fn existing_file_is_not_fetched() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // The URL is never contacted because the file exists.
        let fetched = ensure_local(file.path(), "http://invalid.invalid/x.csv", &null_progress())
            .await
            .unwrap();
        assert!(!fetched);
    }
}

//! # Downloads
//!
//! Handing a generated file to the user. Mirrors the browser flow: the payload is
//! registered under a transient object URL, a download of that URL is triggered, and the URL
//! is revoked. [`download`] guarantees the revoke, even when triggering fails.

/// MIME type of scene documents.
pub const MIME_JSON: &str = "application/json";

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime: String,
}
impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>, mime: &str) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.to_owned(),
        }
    }
}

/// A transient reference to a registered [`Blob`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ObjectUrl(pub String);
impl std::fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    #[error("object url {0} is not registered")]
    UnknownUrl(ObjectUrl),
    #[error("invalid download name {0:?}")]
    InvalidName(String),
    #[error("failed to write download: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Downloader {
    /// Register a blob, giving an URL to reach it by until revoked.
    /// # Errors
    /// If the blob could not be registered.
    fn create_object_url(&self, blob: Blob) -> Result<ObjectUrl, DownloadError>;
    /// Start delivering the blob at `url` to the user under `filename`. Completion is not
    /// reported, only failure to start.
    /// # Errors
    /// If the download could not be started.
    fn trigger(&self, url: &ObjectUrl, filename: &str) -> Result<(), DownloadError>;
    /// Release a registered blob. Unknown URLs are ignored.
    fn revoke_object_url(&self, url: &ObjectUrl);
}

/// Revokes the URL on drop.
struct Revoke<'d, D: Downloader + ?Sized> {
    downloader: &'d D,
    url: ObjectUrl,
}
impl<D: Downloader + ?Sized> Drop for Revoke<'_, D> {
    fn drop(&mut self) {
        self.downloader.revoke_object_url(&self.url);
    }
}

/// Offer `blob` to the user as `filename`, releasing every resource taken on the way.
/// # Errors
/// Forwarded from the downloader.
pub fn download<D: Downloader + ?Sized>(
    downloader: &D,
    blob: Blob,
    filename: &str,
) -> Result<(), DownloadError> {
    let url = downloader.create_object_url(blob)?;
    let guard = Revoke { downloader, url };
    downloader.trigger(&guard.url, filename)
}

/// Delivers downloads as files in a directory.
pub struct DirectoryDownloader {
    directory: std::path::PathBuf,
    registry: parking_lot::Mutex<hashbrown::HashMap<ObjectUrl, Blob>>,
}
impl DirectoryDownloader {
    pub fn new(directory: impl Into<std::path::PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            registry: parking_lot::Mutex::default(),
        }
    }
    #[must_use]
    pub fn directory(&self) -> &std::path::Path {
        &self.directory
    }
    /// Number of blobs currently registered.
    #[must_use]
    pub fn live_urls(&self) -> usize {
        self.registry.lock().len()
    }
    /// Find a name not already taken in the directory, the way browsers do:
    /// `name.ext`, `name (1).ext`, `name (2).ext`...
    fn free_path(&self, filename: &str) -> std::path::PathBuf {
        let candidate = self.directory.join(filename);
        if !candidate.exists() {
            return candidate;
        }
        let (stem, extension) = match filename.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
            _ => (filename, None),
        };
        (1u32..)
            .map(|n| match extension {
                Some(extension) => self.directory.join(format!("{stem} ({n}).{extension}")),
                None => self.directory.join(format!("{stem} ({n})")),
            })
            .find(|path| !path.exists())
            // The range is practically endless.
            .unwrap_or(candidate)
    }
}
impl Downloader for DirectoryDownloader {
    fn create_object_url(&self, blob: Blob) -> Result<ObjectUrl, DownloadError> {
        let url = ObjectUrl(format!("blob:sheetdesk/{}", uuid::Uuid::new_v4()));
        self.registry.lock().insert(url.clone(), blob);
        Ok(url)
    }
    fn trigger(&self, url: &ObjectUrl, filename: &str) -> Result<(), DownloadError> {
        // Names come from the page, never let them pick a directory.
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename == "."
            || filename == ".."
        {
            return Err(DownloadError::InvalidName(filename.to_owned()));
        }
        let registry = self.registry.lock();
        let blob = registry
            .get(url)
            .ok_or_else(|| DownloadError::UnknownUrl(url.clone()))?;
        let path = self.free_path(filename);
        std::fs::write(&path, &blob.bytes)?;
        log::info!(
            "downloaded {} ({}) to {}",
            filename,
            blob.mime,
            path.display()
        );
        Ok(())
    }
    fn revoke_object_url(&self, url: &ObjectUrl) {
        self.registry.lock().remove(url);
    }
}

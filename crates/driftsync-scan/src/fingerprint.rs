//! Content fingerprinting for duplicate and relocation detection
//!
//! Fingerprints are BLAKE3 hex digests of full file content. They are
//! computed lazily, only for files the comparison actually needs to
//! match by content, and hashing runs on the blocking thread pool.

use driftsync_types::{Error, Result};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Computes content fingerprints with bounded concurrency
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    concurrency: usize,
}

impl Fingerprinter {
    /// Create a fingerprinter hashing up to `concurrency` files at once
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Create a fingerprinter sized to the number of CPUs
    pub fn with_defaults() -> Self {
        Self::new(num_cpus::get())
    }

    /// Fingerprint every unique path, returning hex digests by path
    ///
    /// Files that cannot be read are logged and omitted from the result,
    /// so a single unreadable file never aborts resolution.
    pub async fn fingerprint_all(
        &self,
        paths: impl IntoIterator<Item = PathBuf>,
    ) -> HashMap<PathBuf, String> {
        let unique: HashSet<PathBuf> = paths.into_iter().collect();
        let results = stream::iter(unique.into_iter().map(|path| async move {
            let digest = hash_file(&path).await;
            (path, digest)
        }))
        .buffer_unordered(self.concurrency)
        .collect::<Vec<_>>()
        .await;

        let mut digests = HashMap::new();
        for (path, digest) in results {
            match digest {
                Ok(digest) => {
                    digests.insert(path, digest);
                }
                Err(err) => warn!("Failed to fingerprint '{}': {}", path.display(), err),
            }
        }
        digests
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Hash one file's content on the blocking thread pool
pub async fn hash_file(path: &Path) -> Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || hash_file_blocking(&path))
        .await
        .map_err(|e| Error::other(format!("Fingerprint task failed: {}", e)))?
}

/// Hash one file's content with a streaming read
pub fn hash_file_blocking(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| Error::io(format!("Failed to open '{}': {}", path.display(), e)))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|e| Error::io(format!("Failed to read '{}': {}", path.display(), e)))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

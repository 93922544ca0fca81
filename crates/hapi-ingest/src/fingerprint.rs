//! Content fingerprints for resources available as local files.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use hapi_model::DatasetDescriptor;

use crate::error::{IngestError, Result};

/// Lower-case hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| IngestError::file(path.to_path_buf(), e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| IngestError::file(path.to_path_buf(), e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Local file behind a download URL, if it names one.
///
/// `file://` URLs and scheme-less paths are local; relative paths resolve
/// against `base_dir`.
pub fn local_path(base_dir: &Path, url: &str) -> Option<PathBuf> {
    let path = match url.strip_prefix("file://") {
        Some(path) => path,
        None if url.contains("://") => return None,
        None => url,
    };
    if path.is_empty() {
        return None;
    }
    let path = Path::new(path);
    Some(if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    })
}

/// Fill `content_sha256` for every resource of `dataset` that exists on disk.
pub fn fingerprint_dataset(base_dir: &Path, dataset: &mut DatasetDescriptor) -> Result<()> {
    for resource in &mut dataset.resources {
        if resource.content_sha256.is_some() {
            continue;
        }
        let Some(path) = local_path(base_dir, &resource.download_url) else {
            continue;
        };
        if !path.is_file() {
            debug!(resource = %resource.hdx_id, path = %path.display(), "resource file not present");
            continue;
        }
        resource.content_sha256 = Some(sha256_file(&path)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn only_local_urls_resolve() {
        let base = Path::new("/data");
        assert_eq!(
            local_path(base, "pop.csv"),
            Some(PathBuf::from("/data/pop.csv"))
        );
        assert_eq!(
            local_path(base, "file:///tmp/pop.csv"),
            Some(PathBuf::from("/tmp/pop.csv"))
        );
        assert_eq!(local_path(base, "https://data.example.org/pop.csv"), None);
        assert_eq!(local_path(base, ""), None);
    }
}

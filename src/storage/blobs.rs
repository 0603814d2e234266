use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use mime::Mime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServerError;

/// Object storage for listing images.
pub trait BlobStore: Send + Sync {
    /// Store `data` under a fresh random key and return the key.
    fn put(&self, data: &[u8], content_type: &Mime) -> Result<String, ServerError>;

    /// Fetch an object and its content type. `None` if the key is unknown.
    fn get(&self, key: &str) -> Result<Option<(Vec<u8>, Mime)>, ServerError>;

    /// Remove an object. Removing a missing object is not an error.
    fn remove(&self, key: &str) -> Result<(), ServerError>;
}

/// Each object is a single flat file at `{dir}/{uuid}.{ext}`.
pub struct FsBlobStore {
    dir: PathBuf,
}

impl FsBlobStore {
    pub fn new(dir: PathBuf) -> Result<Self, ServerError> {
        fs::create_dir_all(&dir)
            .map_err(|e| ServerError::StorageError(format!("create blob dir failed: {e}")))?;
        info!("Blob storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        is_valid_key(key).then(|| self.dir.join(key))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, data: &[u8], content_type: &Mime) -> Result<String, ServerError> {
        let key = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        let path = self.dir.join(&key);
        fs::write(&path, data)
            .map_err(|e| ServerError::StorageError(format!("write blob {key} failed: {e}")))?;
        Ok(key)
    }

    fn get(&self, key: &str) -> Result<Option<(Vec<u8>, Mime)>, ServerError> {
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(data) => Ok(Some((data, content_type_for(key)))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServerError::StorageError(format!(
                "read blob {key} failed: {e}"
            ))),
        }
    }

    fn remove(&self, key: &str) -> Result<(), ServerError> {
        let Some(path) = self.path_for(key) else {
            return Err(ServerError::StorageError(format!("invalid blob key {key:?}")));
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted blob {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Blob {} already gone", key);
                Ok(())
            }
            Err(e) => Err(ServerError::StorageError(format!(
                "remove blob {key} failed: {e}"
            ))),
        }
    }
}

fn extension_for(content_type: &Mime) -> &'static str {
    match content_type.subtype().as_str() {
        "jpeg" | "jpg" | "pjpeg" => "jpg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        _ => "bin",
    }
}

fn content_type_for(key: &str) -> Mime {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Keys look like `<uuid>.<ext>`; anything else could escape the directory.
pub fn is_valid_key(key: &str) -> bool {
    let Some((stem, ext)) = key.split_once('.') else {
        return false;
    };
    Uuid::parse_str(stem).is_ok()
        && stem.len() == 36
        && !ext.is_empty()
        && ext.len() <= 5
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

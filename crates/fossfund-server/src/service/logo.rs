//! Logo image storage
//!
//! Logos are plain files named after the record id, below
//! `<static_dir>/project` and `<static_dir>/organisation`, so the static
//! file handler (or the reverse proxy) can serve them directly.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use fossfund_common::{FossfundError, RecordKind};

use crate::model::constants::STATIC_PATH;

/// Permissions of stored logo files
#[cfg(unix)]
const LOGO_FILE_MODE: u32 = 0o660;

#[derive(Debug, Clone)]
pub struct LogoStore {
    static_dir: PathBuf,
    max_size: usize,
}

impl LogoStore {
    pub fn new(static_dir: PathBuf, max_size: usize) -> Self {
        Self {
            static_dir,
            max_size,
        }
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn dir(&self, kind: RecordKind) -> PathBuf {
        self.static_dir.join(kind.as_str())
    }

    pub fn path(&self, kind: RecordKind, id: i32) -> PathBuf {
        self.dir(kind).join(id.to_string())
    }

    /// Public URL of a record's logo
    pub fn url(kind: RecordKind, id: i32) -> String {
        format!("{}/{}/{}", STATIC_PATH, kind, id)
    }

    /// Create the logo directories
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        for kind in [RecordKind::Project, RecordKind::Organisation] {
            tokio::fs::create_dir_all(self.dir(kind)).await?;
        }
        Ok(())
    }

    /// Reject uploads that are not images
    pub fn validate_content_type(content_type: Option<&str>) -> Result<(), FossfundError> {
        match content_type {
            Some(mime) if mime.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
            _ => Err(FossfundError::InvalidLogo(
                "Logo is not an image".to_string(),
            )),
        }
    }

    /// Reject uploads above the size limit
    pub fn validate_size(&self, size: usize) -> Result<(), FossfundError> {
        if size > self.max_size {
            return Err(FossfundError::LogoTooLarge(self.max_size));
        }
        Ok(())
    }

    /// Write a record's logo, replacing any previous one
    pub async fn save(&self, kind: RecordKind, id: i32, data: &[u8]) -> anyhow::Result<()> {
        self.validate_size(data.len())?;

        let path = self.path(kind, id);
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(LOGO_FILE_MODE);

        let mut file = options.open(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        info!(%kind, id, size = data.len(), "Stored logo");
        Ok(())
    }

    /// Delete a record's logo; a missing file is not an error
    pub async fn remove(&self, kind: RecordKind, id: i32) -> anyhow::Result<bool> {
        match tokio::fs::remove_file(self.path(kind, id)).await {
            Ok(()) => {
                info!(%kind, id, "Removed logo");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(%kind, id, "No logo to remove");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

//! Scratch space: an isolated, request-scoped temporary directory.
//!
//! ## Why RAII instead of explicit cleanup?
//!
//! Every conversion request stages its input into a private directory, lets a
//! codec or subprocess work there, and must delete the directory on *every*
//! exit path — success, client error, tool failure, panic. Routing all of
//! that through `Drop` (via [`tempfile::TempDir`]) means release cannot be
//! forgotten on a new error path. Archive responses move the `ScratchSpace`
//! into the response body stream, so a client that disconnects mid-download
//! still triggers cleanup when the stream is dropped.
//!
//! Directory names combine the unix timestamp with a random suffix
//! (`fileconv-1724500000-a1b2c3`), so concurrent requests sharing the temp
//! root cannot collide without any locking.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::TempDir;
use tracing::debug;

/// Prefix of every scratch directory created by this crate.
pub const SCRATCH_PREFIX: &str = "fileconv-";

/// An exclusively-owned temporary directory, deleted recursively on drop.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a fresh scratch directory under the platform temp root.
    ///
    /// Fails only on filesystem-level errors (disk full, permissions),
    /// surfaced as [`ConvertError::Infrastructure`].
    pub fn acquire() -> Result<Self, ConvertError> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let dir = tempfile::Builder::new()
            .prefix(&format!("{SCRATCH_PREFIX}{secs}-"))
            .tempdir()
            .map_err(|e| ConvertError::Infrastructure(e.to_string()))?;
        debug!(path = %dir.path().display(), "scratch space acquired");
        Ok(Self { dir })
    }

    /// Root path of this scratch space, used as the working directory for
    /// external tool invocations.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `bytes` to `<scratch>/<name>` and return the full path.
    ///
    /// Callers pick `name` deterministically (e.g. `input.pdf`) so tool
    /// argument lists can reference it by convention.
    pub async fn stage(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ConvertError> {
        let path = self.dir.path().join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ConvertError::Infrastructure(e.to_string()))?;
        debug!(path = %path.display(), len = bytes.len(), "staged input");
        Ok(path)
    }

    /// Read a produced file fully into memory.
    ///
    /// Outputs are bounded, request-scoped documents, so whole-file reads are
    /// acceptable here.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, ConvertError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| ConvertError::Infrastructure(e.to_string()))
    }

    /// List files directly under the scratch root with the given extension,
    /// sorted by file name.
    ///
    /// Used both to enumerate multi-file tool output (`pdftoppm` page
    /// renders) and as the last level of the convert-or-scan fallback chain.
    pub async fn list_ext(&self, ext: &str) -> Result<Vec<PathBuf>, ConvertError> {
        let mut entries = tokio::fs::read_dir(self.dir.path())
            .await
            .map_err(|e| ConvertError::Infrastructure(e.to_string()))?;
        let mut found = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ConvertError::Infrastructure(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ext) {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }
}

use crate::Result;
use crate::error::AbyssError;
use fs2::FileExt;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const WORKSPACE_DIR: &str = ".abyss";
const WORKSPACE_FILE: &str = "workspace.json";

/// The single, process-wide workspace document on disk.
#[derive(Debug, Clone)]
pub struct WorkspaceStorage {
    file_path: PathBuf,
}

/// `~/.abyss`, or `./.abyss` when no home directory can be determined.
pub fn default_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(WORKSPACE_DIR))
        .unwrap_or_else(|| PathBuf::from(WORKSPACE_DIR))
}

impl WorkspaceStorage {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            file_path: dir.as_ref().join(WORKSPACE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(AbyssError::IoError)?;
        }
        Ok(())
    }

    /// Readers and the writer coordinate through a sibling lock file, so the
    /// document itself can be swapped by rename.
    fn open_lock(&self) -> Result<File> {
        self.ensure_dir()?;
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.file_path.with_extension("lock"))
            .map_err(AbyssError::IoError)
    }

    /// Current document, or `None` when there is none yet.
    ///
    /// A corrupt file counts as "no workspace yet"; only I/O failures other
    /// than a missing file are reported as errors.
    pub fn read(&self) -> Result<Option<Value>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        FileExt::lock_shared(&lock).map_err(AbyssError::IoError)?;

        let content = match fs::read(&self.file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AbyssError::IoError(e)),
        };
        // Unlock on drop
        drop(lock);

        match serde_json::from_slice::<Value>(&content) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                warn!(
                    "Workspace file {} is corrupt, treating as empty: {}",
                    self.file_path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Replace the whole document.
    ///
    /// # Atomicity
    /// The new content is written to a temporary sibling and renamed over the
    /// target while holding an exclusive lock, so readers see either the old
    /// or the new document, never a partial one.
    pub fn replace(&self, doc: &Value) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;

        let lock = self.open_lock()?;
        FileExt::lock_exclusive(&lock).map_err(AbyssError::IoError)?;

        let tmp_path = self.file_path.with_extension("json.tmp");
        let mut tmp = File::create(&tmp_path).map_err(AbyssError::IoError)?;
        tmp.write_all(json.as_bytes())
            .map_err(AbyssError::IoError)?;
        tmp.sync_all().map_err(AbyssError::IoError)?;
        drop(tmp);

        fs::rename(&tmp_path, &self.file_path).map_err(AbyssError::IoError)?;
        drop(lock);

        debug!(
            "Workspace saved to {} ({} bytes)",
            self.file_path.display(),
            json.len()
        );
        Ok(())
    }
}

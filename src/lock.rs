//! Advisory locking for the store directory.
//!
//! The execution model is single-writer, single-process. The lock turns
//! accidental multi-process access into a typed error instead of undefined
//! behavior: persist takes the lock exclusively, load takes it shared, and
//! neither holds it across user calls.

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::{CorpusError, Result};

/// Lock file name inside the store directory.
pub const LOCK_FILE: &str = ".corpus.lock";

/// An acquired advisory lock on a store directory. Released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Acquire the lock exclusively. Fails fast with
    /// [`CorpusError::Lock`] when any other holder exists.
    pub fn exclusive(dir: &Path) -> Result<Self> {
        let file = Self::lock_file(dir)?;
        fs2::FileExt::try_lock_exclusive(&file).map_err(|err| lock_error(dir, &err))?;
        Ok(Self { file })
    }

    /// Acquire the lock shared. Fails fast with [`CorpusError::Lock`] when
    /// an exclusive holder exists.
    pub fn shared(dir: &Path) -> Result<Self> {
        let file = Self::lock_file(dir)?;
        fs2::FileExt::try_lock_shared(&file).map_err(|err| lock_error(dir, &err))?;
        Ok(Self { file })
    }

    fn lock_file(dir: &Path) -> Result<File> {
        fs_err::create_dir_all(dir)?;
        let path = dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        Ok(file)
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

fn lock_error(dir: &Path, err: &std::io::Error) -> CorpusError {
    if err.kind() == std::io::ErrorKind::WouldBlock {
        CorpusError::Lock(format!(
            "store at {} is locked by another process",
            dir.display()
        ))
    } else {
        CorpusError::Lock(format!(
            "could not lock store at {}: {err}",
            dir.display()
        ))
    }
}

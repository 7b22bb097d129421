use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use fs4::FileExt;
use crate::error::{KegError, Result};

/// Exclusive per-package advisory lock, scoped to the install directory.
///
/// Held from resolution until the install reaches `Installed` or
/// `Failed`; dropping the guard releases the lock. Acquisition never
/// blocks: a held lock surfaces [`KegError::AlreadyInProgress`]
/// immediately.
#[derive(Debug)]
pub struct InstallLock {
    _file: File,
}

impl InstallLock {
    pub fn acquire(cellar_dir: &Path, name: &str) -> Result<Self> {
        let path = lock_path(cellar_dir, name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| KegError::filesystem(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| KegError::filesystem(&path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(InstallLock { _file: file }),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Err(KegError::AlreadyInProgress {
                name: name.to_string(),
            }),
            #[cfg(windows)]
            Err(e) if matches!(e.raw_os_error(), Some(32 | 33)) => {
                Err(KegError::AlreadyInProgress {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(KegError::filesystem(&path, e)),
        }
    }
}

/// Lock file location for one package.
pub fn lock_path(cellar_dir: &Path, name: &str) -> PathBuf {
    cellar_dir.join(format!(".{name}.lock"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_acquire_and_release() {
        let dir = tempdir().unwrap();
        let lock = InstallLock::acquire(dir.path(), "foo").unwrap();
        drop(lock);
        // Re-acquirable after release.
        InstallLock::acquire(dir.path(), "foo").unwrap();
    }

    #[test]
    fn test_contention_is_already_in_progress() {
        let dir = tempdir().unwrap();
        let _held = InstallLock::acquire(dir.path(), "foo").unwrap();
        let err = InstallLock::acquire(dir.path(), "foo").unwrap_err();
        assert!(matches!(err, KegError::AlreadyInProgress { .. }));
    }

    #[test]
    fn test_locks_are_per_package() {
        let dir = tempdir().unwrap();
        let _held = InstallLock::acquire(dir.path(), "foo").unwrap();
        InstallLock::acquire(dir.path(), "bar").unwrap();
    }
}

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use crate::error::{KegError, Result};

/// Caller-supplied cancellation signal for the blocking pipeline stages.
///
/// Cloning shares the flag; raising it makes the current fetch or
/// extraction abort with [`KegError::Interrupted`] at the next
/// checkpoint, after which the installer runs the same cleanup as a
/// stage failure.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Errors with [`KegError::Interrupted`] once the token is raised.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(KegError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Derives the staging file name from the archive URL's last path
/// segment, e.g. `https://x/foo-1.0.tar.gz` -> `foo-1.0.tar.gz`.
pub fn archive_file_name(url: &str) -> Result<String> {
    let name = url
        .trim_end_matches('/')
        .split('/')
        .next_back()
        .unwrap_or_default();
    // Strip any query string a mirror may append.
    let name = name.split('?').next().unwrap_or_default();
    if name.is_empty() {
        return Err(KegError::UnsupportedFormat {
            file_name: url.to_string(),
        });
    }
    Ok(name.to_string())
}

/// The sole source of truth for "already installed": a package directory
/// that exists and has at least one entry.
pub fn is_non_empty_dir(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}

use std::fs::File;
use std::io::Read;
use std::path::Path;
use sha2::{Digest, Sha256};
use crate::error::{KegError, Result};

/// Outcome of the verification stage, kept distinct so a skipped check
/// never masquerades as a verified one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Skipped,
}

/// Computes the SHA-256 of the file and compares it (case-insensitively)
/// to `expected`.
///
/// On mismatch the file is deleted before [`KegError::Integrity`]
/// propagates, so a corrupt archive never survives on disk.
pub fn verify(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    let expected = expected.to_ascii_lowercase();
    if actual != expected {
        std::fs::remove_file(path).map_err(|e| KegError::filesystem(path, e))?;
        return Err(KegError::Integrity { expected, actual });
    }
    Ok(())
}

/// Runs [`verify`] when a digest is expected, otherwise reports the
/// check as skipped.
pub fn verify_if_expected(path: &Path, expected: Option<&str>) -> Result<Verification> {
    match expected {
        Some(digest) => {
            verify(path, digest)?;
            Ok(Verification::Verified)
        }
        None => Ok(Verification::Skipped),
    }
}

fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| KegError::filesystem(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(|e| KegError::filesystem(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // SHA-256 of "hello"
    const HELLO_SHA: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_verify_matching_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive");
        std::fs::write(&path, b"hello").unwrap();
        verify(&path, HELLO_SHA).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_verify_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive");
        std::fs::write(&path, b"hello").unwrap();
        verify(&path, &HELLO_SHA.to_ascii_uppercase()).unwrap();
    }

    #[test]
    fn test_mismatch_deletes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive");
        std::fs::write(&path, b"corrupted").unwrap();
        let err = verify(&path, HELLO_SHA).unwrap_err();
        assert!(matches!(err, KegError::Integrity { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_skip_is_observable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive");
        std::fs::write(&path, b"hello").unwrap();
        assert_eq!(verify_if_expected(&path, None).unwrap(), Verification::Skipped);
        assert_eq!(
            verify_if_expected(&path, Some(HELLO_SHA)).unwrap(),
            Verification::Verified
        );
    }
}

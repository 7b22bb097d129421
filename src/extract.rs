use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use flate2::read::GzDecoder;
use tar::EntryType;
use xz2::read::XzDecoder;
use crate::error::{KegError, Result};
use crate::util::CancelToken;

/// Archive formats handled by the extractor, chosen purely from the
/// filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    TarGz,
    TarXz,
}

impl ArchiveFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar.xz") {
            Some(ArchiveFormat::TarXz)
        } else {
            None
        }
    }
}

/// Extracts `archive` into `dest`, creating `dest` (and parents) as
/// needed.
///
/// Entries are recreated with their relative paths preserved, parent
/// directories created on demand, and existing files overwritten.
/// Symlink and hardlink entries, absolute entry paths, and paths with
/// `..` segments are rejected with [`KegError::UnsafeArchive`].
///
/// # Errors
///
/// [`KegError::UnsupportedFormat`] for an unrecognized suffix; in that
/// case `dest` is not created.
pub fn extract(archive: &Path, dest: &Path, cancel: &CancelToken) -> Result<()> {
    let format = ArchiveFormat::from_path(archive).ok_or_else(|| KegError::UnsupportedFormat {
        file_name: archive
            .file_name()
            .unwrap_or(archive.as_os_str())
            .to_string_lossy()
            .into_owned(),
    })?;

    std::fs::create_dir_all(dest).map_err(|e| KegError::filesystem(dest, e))?;

    let file = File::open(archive).map_err(|e| KegError::filesystem(archive, e))?;
    match format {
        ArchiveFormat::TarGz => unpack_tar(GzDecoder::new(file), archive, dest, cancel),
        ArchiveFormat::TarXz => unpack_tar(XzDecoder::new(file), archive, dest, cancel),
    }
}

fn unpack_tar<R: Read>(
    reader: R,
    archive: &Path,
    dest: &Path,
    cancel: &CancelToken,
) -> Result<()> {
    let mut tar = tar::Archive::new(reader);
    let entries = tar
        .entries()
        .map_err(|e| KegError::filesystem(archive, e))?;

    for entry in entries {
        cancel.check()?;
        let mut entry = entry.map_err(|e| KegError::filesystem(archive, e))?;
        let entry_path = entry
            .path()
            .map_err(|e| KegError::filesystem(archive, e))?
            .into_owned();

        match entry.header().entry_type() {
            EntryType::Directory => {
                let target = dest.join(sanitize_entry_path(&entry_path)?);
                std::fs::create_dir_all(&target).map_err(|e| KegError::filesystem(&target, e))?;
            }
            EntryType::Regular | EntryType::Continuous => {
                let target = dest.join(sanitize_entry_path(&entry_path)?);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| KegError::filesystem(parent, e))?;
                }
                let mut out =
                    File::create(&target).map_err(|e| KegError::filesystem(&target, e))?;
                std::io::copy(&mut entry, &mut out)
                    .map_err(|e| KegError::filesystem(&target, e))?;
            }
            EntryType::Symlink | EntryType::Link => {
                return Err(KegError::UnsafeArchive {
                    entry: entry_path.display().to_string(),
                });
            }
            // pax headers, long-name markers and the like carry no data
            // of their own.
            _ => continue,
        }
    }
    Ok(())
}

/// Validates an entry path and returns it relative to the destination.
/// Absolute paths and any `..` segment escape the destination and are
/// rejected; `.` segments are dropped.
fn sanitize_entry_path(path: &Path) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(KegError::UnsafeArchive {
                    entry: path.display().to_string(),
                });
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(KegError::UnsafeArchive {
            entry: path.display().to_string(),
        });
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;
    use xz2::write::XzEncoder;

    fn tar_with_files(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            // Write the name bytes directly; Header::set_path refuses the
            // `..` segments the traversal test needs to craft.
            header.as_gnu_mut().unwrap().name[..path.len()]
                .copy_from_slice(path.as_bytes());
            header.set_cksum();
            builder.append(&header, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn write_tar_gz(path: &Path, files: &[(&str, &[u8])]) {
        let tar_bytes = tar_with_files(files);
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        encoder.finish().unwrap();
    }

    fn write_tar_xz(path: &Path, files: &[(&str, &[u8])]) {
        let tar_bytes = tar_with_files(files);
        let mut encoder = XzEncoder::new(File::create(path).unwrap(), 6);
        encoder.write_all(&tar_bytes).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_tar_gz_round_trip() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("pkg-1.0.tar.gz");
        write_tar_gz(&archive, &[("a/b.txt", b"alpha"), ("c.txt", b"gamma")]);

        let dest = dir.path().join("out");
        extract(&archive, &dest, &CancelToken::new()).unwrap();

        assert_eq!(std::fs::read(dest.join("a/b.txt")).unwrap(), b"alpha");
        assert_eq!(std::fs::read(dest.join("c.txt")).unwrap(), b"gamma");
        assert_eq!(std::fs::read_dir(&dest).unwrap().count(), 2);
    }

    #[test]
    fn test_tgz_suffix_selects_gzip() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("pkg.tgz");
        write_tar_gz(&archive, &[("only.txt", b"x")]);
        let dest = dir.path().join("out");
        extract(&archive, &dest, &CancelToken::new()).unwrap();
        assert!(dest.join("only.txt").exists());
    }

    #[test]
    fn test_tar_xz_round_trip() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("pkg-1.0.tar.xz");
        write_tar_xz(&archive, &[("lib/mod.c", b"int main;")]);
        let dest = dir.path().join("out");
        extract(&archive, &dest, &CancelToken::new()).unwrap();
        assert_eq!(std::fs::read(dest.join("lib/mod.c")).unwrap(), b"int main;");
    }

    #[test]
    fn test_unsupported_suffix_creates_nothing() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("foo.zip");
        std::fs::write(&archive, b"PK").unwrap();
        let dest = dir.path().join("out");
        let err = extract(&archive, &dest, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, KegError::UnsupportedFormat { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_traversal_entry_rejected() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("evil.tar.gz");
        write_tar_gz(&archive, &[("../evil.txt", b"pwned")]);
        let dest = dir.path().join("out");
        let err = extract(&archive, &dest, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, KegError::UnsafeArchive { .. }));
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn test_symlink_entry_rejected() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("link.tar.gz");
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_size(0);
        builder
            .append_link(&mut header, "innocent", "/etc/passwd")
            .unwrap();
        let tar_bytes = builder.into_inner().unwrap();
        let mut encoder = GzEncoder::new(File::create(&archive).unwrap(), Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        encoder.finish().unwrap();

        let dest = dir.path().join("out");
        let err = extract(&archive, &dest, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, KegError::UnsafeArchive { .. }));
        assert!(!dest.join("innocent").exists());
    }

    #[test]
    fn test_existing_files_overwritten() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("pkg.tar.gz");
        write_tar_gz(&archive, &[("c.txt", b"new")]);
        let dest = dir.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("c.txt"), b"old").unwrap();
        extract(&archive, &dest, &CancelToken::new()).unwrap();
        assert_eq!(std::fs::read(dest.join("c.txt")).unwrap(), b"new");
    }

    #[test]
    fn test_cancelled_extraction_interrupts() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("pkg.tar.gz");
        write_tar_gz(&archive, &[("c.txt", b"data")]);
        let token = CancelToken::new();
        token.cancel();
        let err = extract(&archive, &dir.path().join("out"), &token).unwrap_err();
        assert!(matches!(err, KegError::Interrupted));
    }

    #[test]
    fn test_sanitize_rejects_absolute() {
        assert!(sanitize_entry_path(Path::new("/etc/passwd")).is_err());
        assert!(sanitize_entry_path(Path::new("a/../../b")).is_err());
        assert_eq!(
            sanitize_entry_path(Path::new("./a/b.txt")).unwrap(),
            PathBuf::from("a/b.txt")
        );
    }
}

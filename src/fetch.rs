use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use crate::error::{KegError, Result};
use crate::util::CancelToken;

const CHUNK_SIZE: usize = 64 * 1024;

/// Streams the resource at `url` to `dest`.
///
/// The body is copied in fixed-size chunks, so memory use stays constant
/// regardless of archive size. A single attempt is made; retry policy
/// belongs to the caller.
///
/// # Errors
///
/// [`KegError::Network`] on transport failure or a non-success HTTP
/// status, [`KegError::Filesystem`] if `dest` cannot be created or
/// written, [`KegError::Interrupted`] if `cancel` is raised mid-stream.
pub fn fetch(url: &str, dest: &Path, cancel: &CancelToken) -> Result<()> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| KegError::network(url, e))?;

    let mut file = File::create(dest).map_err(|e| KegError::filesystem(dest, e))?;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        cancel.check()?;
        // Read errors here come from the transport, not the local disk.
        let n = response
            .read(&mut buf)
            .map_err(|e| KegError::network(url, e))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .map_err(|e| KegError::filesystem(dest, e))?;
    }
    Ok(())
}

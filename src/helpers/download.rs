//! Streaming HTTP downloads with mirror fallback
//!
//! Sources are tried in order. The body is written next to the destination
//! as `<name>.part` and renamed into place only when complete, so an
//! interrupted run never leaves a truncated archive under the real name.
//! Any failure (connection, HTTP status, a short body or a local write error)
//! deletes the partial file and moves on to the next source. When every source has failed the download reports
//! [`Error::DownloadExhausted`] for the destination.

use crate::core::error::{Error, Result};
use crate::core::output::Sink;
use crate::helpers::progress::Meter;
use std::fs::File;
use std::io::{self, Read, Write};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const USER_AGENT: &str = concat!("exelius-bootstrap/", env!("CARGO_PKG_VERSION"));

/// Lower bound for one streamed chunk
const MIN_CHUNK_BYTES: u64 = 1024 * 1024;

/// Chunk size for a body of known length: a thousandth of it, at least 1 MiB.
pub fn chunk_size(total: u64) -> usize {
    (total / 1000).max(MIN_CHUNK_BYTES) as usize
}

/// Download the first reachable source in `urls` to `dest`.
///
/// Parent directories of `dest` are created as needed.
pub fn download(urls: &[String], dest: &Path, sink: &dyn Sink) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("cannot create directory {}", parent.display()), e)
            })?;
        }
    }

    let part = partial_path(dest);
    for url in urls {
        sink.detail(&format!("downloading {} to {}", url, dest.display()));
        match fetch(url, &part) {
            Ok(bytes) => {
                std::fs::rename(&part, dest).map_err(|e| {
                    discard_partial(&part);
                    Error::io(format!("cannot move download into {}", dest.display()), e)
                })?;
                sink.detail(&format!("downloaded {} bytes", bytes));
                return Ok(bytes);
            }
            Err(e) => {
                sink.warn(&format!("{}; trying next source", e));
                discard_partial(&part);
            }
        }
    }

    Err(Error::DownloadExhausted {
        dest: dest.to_path_buf(),
        attempts: urls.len(),
    })
}

/// Bodies stream into `<dest>.part` and only take the real name once complete.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

fn discard_partial(part: &Path) {
    // A failed connection may not have written anything yet.
    let _ = std::fs::remove_file(part);
}

fn fetch(url: &str, dest: &Path) -> Result<u64> {
    let mut file = File::create(dest)
        .map_err(|e| Error::io(format!("cannot create {}", dest.display()), e))?;

    let response = ureq::get(url)
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| Error::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let total = response
        .header("content-length")
        .and_then(|s| s.parse::<u64>().ok());
    let mut reader = response.into_reader();

    let broken = |e: io::Error| Error::Download {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let written = match total {
        None => io::copy(&mut reader, &mut file).map_err(broken)?,
        Some(total) => {
            let mut meter = Meter::new(total);
            let mut buffer = vec![0u8; chunk_size(total)];
            let mut written = 0u64;
            loop {
                let n = fill_chunk(&mut reader, &mut buffer).map_err(broken)?;
                if n == 0 {
                    break;
                }
                file.write_all(&buffer[..n])
                    .map_err(|e| Error::io(format!("write error for {}", dest.display()), e))?;
                written += n as u64;
                meter.advance(n as u64);
            }
            meter.finish();
            if written < total {
                return Err(Error::Download {
                    url: url.to_string(),
                    reason: format!("body ended after {} of {} bytes", written, total),
                });
            }
            written
        }
    };

    file.flush()
        .map_err(|e| Error::io(format!("write error for {}", dest.display()), e))?;
    Ok(written)
}

/// Read until `buffer` is full or the stream ends.
fn fill_chunk<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size_has_one_mib_floor() {
        assert_eq!(chunk_size(0), 1024 * 1024);
        assert_eq!(chunk_size(5_000_000), 1024 * 1024);
        assert_eq!(chunk_size(2_000_000_000), 2_000_000);
    }

    #[test]
    fn test_fill_chunk_collects_short_reads() {
        struct Dribble(Vec<u8>);
        impl Read for Dribble {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0.remove(0);
                Ok(1)
            }
        }

        let mut reader = Dribble(b"abcdef".to_vec());
        let mut buf = [0u8; 4];
        assert_eq!(fill_chunk(&mut reader, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(fill_chunk(&mut reader, &mut buf).unwrap(), 2);
        assert_eq!(fill_chunk(&mut reader, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_no_sources_is_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/premake.zip");
        let sink = crate::core::output::Recorder::new();
        let err = download(&[], &dest, &sink).unwrap_err();
        assert!(matches!(err, Error::DownloadExhausted { attempts: 0, .. }));
        assert!(dest.parent().unwrap().is_dir());
    }

    #[test]
    fn test_unreachable_source_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("premake.tar.gz");
        let sink = crate::core::output::Recorder::new();
        let err = download(&["not-a-valid-url".to_string()], &dest, &sink).unwrap_err();
        assert!(matches!(err, Error::DownloadExhausted { attempts: 1, .. }));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
        assert!(sink.contains("trying next source"));
    }

    #[test]
    fn test_partial_path_sits_next_to_destination() {
        assert_eq!(
            partial_path(Path::new("packed/premake-5.0.0-alpha16-linux.tar.gz")),
            PathBuf::from("packed/premake-5.0.0-alpha16-linux.tar.gz.part")
        );
    }
}

//! Archive extraction with skip-if-exists
//!
//! The container type comes from the host platform, not from the file
//! contents. Entries are processed in archive order. An entry whose
//! destination file already exists is left alone and its size is removed
//! from the progress total, so re-running an interrupted extraction only
//! writes what is still missing.

use crate::core::error::{Error, Result};
use crate::core::output::Sink;
use crate::core::platform::ArchiveKind;
use crate::helpers::progress::Meter;
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

/// What an extraction actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub written: usize,
    pub skipped: usize,
    pub bytes_written: u64,
    /// Bytes still counted after skipped entries were removed
    pub bytes_total: u64,
}

/// Extract `archive` into `dest`.
pub fn extract(
    archive: &Path,
    dest: &Path,
    kind: ArchiveKind,
    sink: &dyn Sink,
) -> Result<ExtractSummary> {
    std::fs::create_dir_all(dest)
        .map_err(|e| Error::io(format!("cannot create directory {}", dest.display()), e))?;

    sink.detail(&format!("extracting {} to {}", archive.display(), dest.display()));
    let summary = match kind {
        ArchiveKind::Zip => extract_zip(archive, dest)?,
        ArchiveKind::TarGz => extract_tar_gz(archive, dest)?,
    };
    sink.detail(&format!(
        "extracted {} file(s), {} already present",
        summary.written, summary.skipped
    ));
    Ok(summary)
}

fn corrupt(archive: &Path, reason: impl ToString) -> Error {
    Error::Archive {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn open(archive: &Path) -> Result<File> {
    File::open(archive).map_err(|e| Error::io(format!("cannot open {}", archive.display()), e))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io(format!("cannot create directory {}", parent.display()), e))?;
    }
    Ok(())
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<ExtractSummary> {
    let mut archive = zip::ZipArchive::new(open(archive_path)?)
        .map_err(|e| corrupt(archive_path, format!("zip read error: {}", e)))?;

    let mut total = 0u64;
    for i in 0..archive.len() {
        let entry = archive
            .by_index_raw(i)
            .map_err(|e| corrupt(archive_path, format!("zip entry error: {}", e)))?;
        total += entry.size();
    }

    let mut meter = Meter::new(total);
    let mut summary = ExtractSummary::default();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| corrupt(archive_path, format!("zip entry error: {}", e)))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(corrupt(
                archive_path,
                format!("unsafe entry path: {}", entry.name()),
            ));
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| {
                Error::io(format!("cannot create directory {}", outpath.display()), e)
            })?;
            continue;
        }

        let size = entry.size();
        if outpath.is_file() {
            meter.skip(size);
            summary.skipped += 1;
            continue;
        }

        ensure_parent(&outpath)?;
        let mut outfile = File::create(&outpath)
            .map_err(|e| Error::io(format!("cannot create {}", outpath.display()), e))?;
        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| corrupt(archive_path, format!("{}: {}", outpath.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).map_err(
                    |e| Error::io(format!("cannot set mode on {}", outpath.display()), e),
                )?;
            }
        }

        meter.advance(size);
        summary.written += 1;
        summary.bytes_written += size;
    }

    summary.bytes_total = meter.finish().total;
    Ok(summary)
}

fn tar_reader(archive_path: &Path) -> Result<tar::Archive<flate2::read::GzDecoder<BufReader<File>>>> {
    let reader = BufReader::new(open(archive_path)?);
    Ok(tar::Archive::new(flate2::read::GzDecoder::new(reader)))
}

/// Reject entries that would land outside the destination.
fn checked_tar_path(archive_path: &Path, path: &Path) -> Result<Option<PathBuf>> {
    if path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(corrupt(
            archive_path,
            format!("unsafe entry path: {}", path.display()),
        ));
    }
    // Some archives contain a "." entry.
    if path.as_os_str().is_empty() || path == Path::new(".") {
        return Ok(None);
    }
    Ok(Some(path.to_path_buf()))
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Refuse to write through a symlink an earlier entry created.
fn ensure_no_symlink_components(archive_path: &Path, dest: &Path, full_path: &Path) -> Result<()> {
    let relative = full_path.strip_prefix(dest).map_err(|_| {
        corrupt(archive_path, format!("entry outside destination: {}", full_path.display()))
    })?;

    let mut current = dest.to_path_buf();
    for component in relative.components() {
        current.push(component);
        if let Ok(meta) = std::fs::symlink_metadata(&current)
            && meta.file_type().is_symlink()
        {
            return Err(corrupt(
                archive_path,
                format!("symlink in entry path: {}", current.display()),
            ));
        }
    }
    Ok(())
}

/// Link targets must resolve inside the destination.
fn ensure_link_target_within_dest(
    archive_path: &Path,
    dest: &Path,
    link_parent: &Path,
    target: &Path,
) -> Result<()> {
    if target.has_root()
        || target
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(corrupt(
            archive_path,
            format!("absolute link target: {}", target.display()),
        ));
    }

    let resolved = normalize_lexical(&link_parent.join(target));
    if !resolved.starts_with(normalize_lexical(dest)) {
        return Err(corrupt(
            archive_path,
            format!("link escapes destination: {} -> {}", link_parent.display(), target.display()),
        ));
    }
    Ok(())
}

fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<ExtractSummary> {
    // gzip streams cannot seek, so sizes come from a first pass.
    let mut total = 0u64;
    let mut listing = tar_reader(archive_path)?;
    for entry in listing
        .entries()
        .map_err(|e| corrupt(archive_path, format!("tar read error: {}", e)))?
    {
        let entry = entry.map_err(|e| corrupt(archive_path, format!("tar entry error: {}", e)))?;
        total += entry.size();
    }

    let mut meter = Meter::new(total);
    let mut summary = ExtractSummary::default();

    let mut archive = tar_reader(archive_path)?;
    for entry in archive
        .entries()
        .map_err(|e| corrupt(archive_path, format!("tar read error: {}", e)))?
    {
        let mut entry =
            entry.map_err(|e| corrupt(archive_path, format!("tar entry error: {}", e)))?;
        let path = entry
            .path()
            .map_err(|e| corrupt(archive_path, format!("tar path error: {}", e)))?
            .into_owned();
        let size = entry.size();

        let Some(relative) = checked_tar_path(archive_path, &path)? else {
            meter.skip(size);
            continue;
        };
        let full_path = dest.join(&relative);
        ensure_no_symlink_components(archive_path, dest, &full_path)?;

        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let target = entry
                .link_name()
                .map_err(|e| corrupt(archive_path, format!("tar link error: {}", e)))?
                .ok_or_else(|| {
                    corrupt(archive_path, format!("link without target: {}", path.display()))
                })?;
            let link_parent = full_path.parent().unwrap_or(dest);
            ensure_link_target_within_dest(archive_path, dest, link_parent, &target)?;
        }

        if entry_type.is_dir() {
            std::fs::create_dir_all(&full_path).map_err(|e| {
                Error::io(format!("cannot create directory {}", full_path.display()), e)
            })?;
            meter.skip(size);
            continue;
        }

        if full_path.is_file() {
            meter.skip(size);
            summary.skipped += 1;
            continue;
        }

        ensure_parent(&full_path)?;
        entry
            .unpack(&full_path)
            .map_err(|e| corrupt(archive_path, format!("unpack error for {}: {}", path.display(), e)))?;

        meter.advance(size);
        summary.written += 1;
        summary.bytes_written += size;
    }

    summary.bytes_total = meter.finish().total;
    Ok(summary)
}

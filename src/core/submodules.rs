//! Submodule validation and sync
//!
//! Submodule paths come from the manifest (`.gitmodules`), one per line that
//! carries the path marker. If any declared path is missing or empty, or the
//! operator forced it, a single bulk `git submodule update` runs.

use crate::core::error::{Error, Result};
use crate::core::output::Sink;
use crate::core::validate::{Status, submodule_status};
use crate::helpers::process::Runner;
use std::path::{Path, PathBuf};

/// Version-control executable used for the sync
pub const GIT: &str = "git";

/// Arguments of the bulk update
pub const UPDATE_ARGS: [&str; 5] = ["submodule", "update", "--init", "--recursive", "--quiet"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmoduleReport {
    pub declared: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    /// Whether the bulk update ran
    pub updated: bool,
}

/// Extract submodule paths from manifest text.
///
/// Each line containing `marker` contributes the text after it, resolved
/// against `root`.
pub fn parse_manifest(text: &str, marker: &str, root: &Path) -> Vec<PathBuf> {
    text.lines()
        .filter_map(|line| {
            let at = line.find(marker)?;
            let path = line[at + marker.len()..].trim_end();
            if path.is_empty() {
                None
            } else {
                Some(root.join(path))
            }
        })
        .collect()
}

/// Read the manifest. A missing manifest declares no submodules.
pub fn read_manifest(path: &Path, marker: &str, root: &Path, sink: &dyn Sink) -> Result<Vec<PathBuf>> {
    sink.detail(&format!("retrieving submodule list from {}", path.display()));
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(parse_manifest(&text, marker, root)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            sink.warn(&format!("no submodule manifest at {}", path.display()));
            Ok(Vec::new())
        }
        Err(source) => Err(Error::Manifest {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Validate every declared submodule and sync once if needed.
pub fn sync(
    manifest: &Path,
    marker: &str,
    root: &Path,
    force: bool,
    runner: &dyn Runner,
    sink: &dyn Sink,
) -> Result<SubmoduleReport> {
    sink.info("Validating submodules");
    let declared = read_manifest(manifest, marker, root, sink)?;

    let mut missing = Vec::new();
    for path in &declared {
        match submodule_status(path) {
            Status::Satisfied => sink.detail(&format!("submodule found at {}", path.display())),
            _ => {
                sink.detail(&format!("submodule not found at {}", path.display()));
                missing.push(path.clone());
            }
        }
    }
    sink.info("Submodule validation complete");

    let mut report = SubmoduleReport {
        declared,
        missing,
        updated: false,
    };
    if !force && report.missing.is_empty() {
        return Ok(report);
    }

    if runner.locate(GIT).is_none() {
        sink.error("git not found on PATH");
        return Err(Error::Required {
            name: GIT.to_string(),
        });
    }

    sink.info("Updating submodules");
    sink.warn("some failure messages are expected, particularly with EASTL");
    let args: Vec<String> = UPDATE_ARGS.iter().map(|s| s.to_string()).collect();
    match runner.run(Path::new(GIT), &args, root) {
        Ok(Some(0)) => {}
        Ok(code) => sink.warn(&format!("git submodule update exited with status {:?}", code)),
        Err(e) => sink.warn(&format!("failed to run git: {}", e)),
    }
    // git leaves the Windows console without VT processing.
    sink.restore_terminal();
    sink.info("Submodule update complete");

    report.updated = true;
    Ok(report)
}

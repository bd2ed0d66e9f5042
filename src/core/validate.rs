//! Existence and version checks
//!
//! A dependency is satisfied when its probe exists on disk (and, for the SDK,
//! when the install path names the required version). These checks never
//! touch the network and are cheap enough to run on every invocation.

use crate::core::descriptor::Resolution;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Satisfied,
    NeedsAcquisition,
    UnsupportedPlatform,
}

/// Check an archive-backed dependency: satisfied iff its probe file exists.
pub fn archive_status(resolution: Resolution<'_>) -> Status {
    match resolution {
        Resolution::Unsupported => Status::UnsupportedPlatform,
        Resolution::Supported(d) if d.probe.is_file() => Status::Satisfied,
        Resolution::Supported(_) => Status::NeedsAcquisition,
    }
}

/// Check the graphics SDK.
///
/// `install_root` is the value of the SDK's environment variable. The SDK is
/// satisfied iff that path exists and contains `required_version`.
pub fn sdk_status(install_root: Option<&str>, required_version: &str) -> Status {
    match install_root {
        Some(root) if Path::new(root).exists() && root.contains(required_version) => {
            Status::Satisfied
        }
        _ => Status::NeedsAcquisition,
    }
}

/// Check one submodule: satisfied iff its directory exists and is non-empty.
pub fn submodule_status(path: &Path) -> Status {
    let populated = std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if populated {
        Status::Satisfied
    } else {
        Status::NeedsAcquisition
    }
}

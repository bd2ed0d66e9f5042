//! Acquisition states for one validate-then-fetch cycle.
//!
//! Nothing here is persisted: the unpacked files on disk are the only record
//! of a finished acquisition.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Unchecked,
    /// Already installed, nothing fetched
    Present,
    Missing,
    ConsentDenied,
    Downloading,
    Downloaded,
    Unpacking,
    /// Installed during this run
    Ready,
    Failed,
}

impl AcquisitionState {
    /// Whether the dependency can be used after this cycle.
    pub fn is_satisfied(self) -> bool {
        matches!(self, AcquisitionState::Present | AcquisitionState::Ready)
    }
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AcquisitionState::Unchecked => "unchecked",
            AcquisitionState::Present => "present",
            AcquisitionState::Missing => "missing",
            AcquisitionState::ConsentDenied => "declined",
            AcquisitionState::Downloading => "downloading",
            AcquisitionState::Downloaded => "downloaded",
            AcquisitionState::Unpacking => "unpacking",
            AcquisitionState::Ready => "installed",
            AcquisitionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

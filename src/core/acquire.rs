//! Acquisition of one archive-backed dependency
//!
//! validate -> (packed archive on disk? unpack : ask, download, unpack) -> validate
//!
//! A packed archive already in the repository is unpacked without asking.
//! Only a network fetch goes through the consent gate. A packed archive that
//! fails to unpack is fetched again when the descriptor has mirrors.

use crate::core::descriptor::{Descriptor, Resolution};
use crate::core::error::{Error, Result};
use crate::core::output::Sink;
use crate::core::platform::Platform;
use crate::core::state::AcquisitionState;
use crate::core::validate::{Status, archive_status};
use crate::helpers::consent::{Prompt, request_and_fetch};
use crate::helpers::{download, extract};

/// Outcome of one validate-then-fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub state: AcquisitionState,
    /// Every state passed through, in order
    pub history: Vec<AcquisitionState>,
    /// Whether anything came over the network
    pub downloaded: bool,
}

impl Acquisition {
    fn new() -> Self {
        Self {
            state: AcquisitionState::Unchecked,
            history: vec![AcquisitionState::Unchecked],
            downloaded: false,
        }
    }

    fn enter(&mut self, state: AcquisitionState, label: &str, sink: &dyn Sink) {
        sink.detail(&format!("{}: {}", label, state));
        self.state = state;
        self.history.push(state);
    }
}

/// Make sure the dependency behind `resolution` is installed.
///
/// Returns the final state; `Present` and `Ready` mean usable. An
/// unsupported platform is an error, a declined prompt is not.
pub fn acquire(
    resolution: Resolution<'_>,
    platform: &Platform,
    prompt: &mut dyn Prompt,
    sink: &dyn Sink,
) -> Result<Acquisition> {
    let mut acq = Acquisition::new();

    let descriptor = match resolution {
        Resolution::Supported(d) => d,
        Resolution::Unsupported => {
            sink.error(&format!("OS '{}' not supported", platform));
            return Err(platform.unsupported());
        }
    };
    let label = descriptor.name.label();

    if archive_status(resolution) == Status::Satisfied {
        sink.info(&format!("{} found at {}", label, descriptor.unpack_root.display()));
        acq.enter(AcquisitionState::Present, label, sink);
        return Ok(acq);
    }

    sink.warn(&format!("{} not found at {}", label, descriptor.unpack_root.display()));
    acq.enter(AcquisitionState::Missing, label, sink);

    let unpacked = if descriptor.archive.is_file() {
        match unpack(descriptor, platform, &mut acq, sink) {
            Ok(()) => true,
            // A damaged archive is replaced from the mirrors when there are any.
            Err(e @ Error::Archive { .. }) if !descriptor.mirrors.is_empty() => {
                sink.warn(&format!("{}; fetching a fresh copy", e));
                false
            }
            Err(e) => return Err(e),
        }
    } else {
        false
    };

    if !unpacked {
        if descriptor.mirrors.is_empty() {
            sink.error(&format!(
                "no packed archive at {} and no download source",
                descriptor.archive.display()
            ));
            acq.enter(AcquisitionState::Failed, label, sink);
            return Ok(acq);
        }

        let question = match &descriptor.version {
            Some(version) => format!("Download {} {}?", label, version),
            None => format!("Download {}?", label),
        };
        let agreed = request_and_fetch(prompt, &question, || {
            acq.enter(AcquisitionState::Downloading, label, sink);
            download::download(&descriptor.mirrors, &descriptor.archive, sink)?;
            acq.downloaded = true;
            acq.enter(AcquisitionState::Downloaded, label, sink);
            unpack(descriptor, platform, &mut acq, sink)?;
            Ok(true)
        })?;
        if !agreed {
            sink.warn(&format!("{} download declined", label));
            acq.enter(AcquisitionState::ConsentDenied, label, sink);
            return Ok(acq);
        }
    }

    if archive_status(resolution) == Status::Satisfied {
        sink.info(&format!("{} installed at {}", label, descriptor.unpack_root.display()));
        acq.enter(AcquisitionState::Ready, label, sink);
    } else {
        sink.error(&format!(
            "{} still missing after unpacking: {}",
            label,
            descriptor.probe.display()
        ));
        acq.enter(AcquisitionState::Failed, label, sink);
    }
    Ok(acq)
}

fn unpack(
    descriptor: &Descriptor,
    platform: &Platform,
    acq: &mut Acquisition,
    sink: &dyn Sink,
) -> Result<()> {
    acq.enter(AcquisitionState::Unpacking, descriptor.name.label(), sink);
    extract::extract(
        &descriptor.archive,
        &descriptor.unpack_root,
        platform.archive,
        sink,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::Dependency;
    use crate::core::output::Recorder;
    use crate::helpers::consent::ScriptedPrompt;
    use std::fs::File;
    use std::path::{Path, PathBuf};

    fn linux() -> Platform {
        Platform::from_parts("linux", "x86_64").unwrap()
    }

    fn descriptor(root: &Path, mirrors: Vec<String>) -> Descriptor {
        let unpack_root = root.join("tools/premake");
        Descriptor {
            name: Dependency::Premake,
            archive: root.join("packed/premake-linux.tar.gz"),
            mirrors,
            probe: unpack_root.join("premake5"),
            unpack_root,
            version: Some("5.0.0-alpha16".into()),
        }
    }

    fn pack(path: &PathBuf, name: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let content = b"#!/bin/sh\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, name, &content[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_present_dependency_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor(dir.path(), Vec::new());
        std::fs::create_dir_all(&d.unpack_root).unwrap();
        std::fs::write(&d.probe, b"x").unwrap();

        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
        let acq = acquire(Resolution::Supported(&d), &linux(), &mut prompt, &Recorder::new())
            .unwrap();
        assert_eq!(acq.state, AcquisitionState::Present);
        assert_eq!(prompt.asked(), 0);
    }

    #[test]
    fn test_packed_archive_unpacks_without_asking() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor(dir.path(), Vec::new());
        pack(&d.archive, "premake5");

        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
        let acq = acquire(Resolution::Supported(&d), &linux(), &mut prompt, &Recorder::new())
            .unwrap();

        assert_eq!(acq.state, AcquisitionState::Ready);
        assert_eq!(
            acq.history,
            vec![
                AcquisitionState::Unchecked,
                AcquisitionState::Missing,
                AcquisitionState::Unpacking,
                AcquisitionState::Ready
            ]
        );
        assert!(!acq.downloaded);
        assert_eq!(prompt.asked(), 0);
        assert!(d.probe.is_file());
    }

    #[test]
    fn test_archive_without_probe_fails() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor(dir.path(), Vec::new());
        pack(&d.archive, "something-else");

        let rec = Recorder::new();
        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
        let acq = acquire(Resolution::Supported(&d), &linux(), &mut prompt, &rec).unwrap();
        assert_eq!(acq.state, AcquisitionState::Failed);
        assert!(rec.contains("still missing"));
    }

    #[test]
    fn test_no_archive_and_no_mirrors_fails() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor(dir.path(), Vec::new());
        let mut prompt = ScriptedPrompt::new(["y"]);
        let acq = acquire(Resolution::Supported(&d), &linux(), &mut prompt, &Recorder::new())
            .unwrap();
        assert_eq!(acq.state, AcquisitionState::Failed);
        assert_eq!(prompt.asked(), 0);
    }

    #[test]
    fn test_declined_download_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor(dir.path(), vec!["http://127.0.0.1:9/premake.tar.gz".into()]);
        let mut prompt = ScriptedPrompt::new(["x", "n"]);
        let acq = acquire(Resolution::Supported(&d), &linux(), &mut prompt, &Recorder::new())
            .unwrap();
        assert_eq!(acq.state, AcquisitionState::ConsentDenied);
        assert!(!d.archive.exists());
    }

    #[test]
    fn test_damaged_archive_without_mirrors_is_an_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor(dir.path(), Vec::new());
        std::fs::create_dir_all(d.archive.parent().unwrap()).unwrap();
        std::fs::write(&d.archive, b"\x1f\x8b truncated").unwrap();

        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
        let err = acquire(Resolution::Supported(&d), &linux(), &mut prompt, &Recorder::new())
            .unwrap_err();
        assert!(matches!(err, Error::Archive { .. }));
    }

    #[test]
    fn test_damaged_archive_with_mirrors_asks_to_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor(dir.path(), vec!["http://127.0.0.1:9/premake.tar.gz".into()]);
        std::fs::create_dir_all(d.archive.parent().unwrap()).unwrap();
        std::fs::write(&d.archive, b"\x1f\x8b truncated").unwrap();

        let rec = Recorder::new();
        let mut prompt = ScriptedPrompt::new(["n"]);
        let acq = acquire(Resolution::Supported(&d), &linux(), &mut prompt, &rec).unwrap();

        assert_eq!(prompt.asked(), 1);
        assert_eq!(acq.state, AcquisitionState::ConsentDenied);
        assert!(rec.contains("fetching a fresh copy"));
    }

    #[test]
    fn test_unsupported_platform_is_fatal() {
        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
        let err = acquire(Resolution::Unsupported, &linux(), &mut prompt, &Recorder::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform { .. }));
    }
}

//! Bootstrap error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can stop a bootstrap run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("OS '{os}' on '{arch}' is not supported")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("failed to download {}: all {attempts} source(s) failed", dest.display())]
    DownloadExhausted { dest: PathBuf, attempts: usize },

    #[error("cannot unpack {}: {reason}", archive.display())]
    Archive { archive: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read submodule manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} is required but not installed")]
    Required { name: String },

    #[error("{program} exited with status {code:?}")]
    GeneratorFailed { program: String, code: Option<i32> },

    #[error("installer saved to {}; run it, then re-run bootstrap", installer.display())]
    RestartRequired { installer: PathBuf },

    #[error("invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl Error {
    /// Wrap an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::UnsupportedPlatform { .. } => 2,
            Error::Download { .. } | Error::DownloadExhausted { .. } => 3,
            Error::Archive { .. } => 4,
            Error::Required { .. } => 5,
            Error::GeneratorFailed { .. } => 6,
            Error::RestartRequired { .. } => 7,
            Error::Config { .. } => 8,
            Error::Io { .. } | Error::Manifest { .. } => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_class() {
        let errors = [
            Error::UnsupportedPlatform {
                os: "macos".into(),
                arch: "aarch64".into(),
            },
            Error::DownloadExhausted {
                dest: PathBuf::from("premake.zip"),
                attempts: 2,
            },
            Error::Archive {
                archive: PathBuf::from("premake.zip"),
                reason: "bad header".into(),
            },
            Error::Required {
                name: "premake".into(),
            },
            Error::GeneratorFailed {
                program: "premake5".into(),
                code: Some(1),
            },
            Error::RestartRequired {
                installer: PathBuf::from("VulkanSDK.exe"),
            },
            Error::Config {
                path: PathBuf::from("bootstrap.toml"),
                reason: "unknown field".into(),
            },
        ];

        let mut codes: Vec<u8> = errors.iter().map(Error::exit_code).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_exhausted_message_names_destination() {
        let err = Error::DownloadExhausted {
            dest: PathBuf::from("packed/premake.tar.gz"),
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("packed/premake.tar.gz"));
        assert!(msg.contains("3 source(s)"));
    }
}

//! Host capability lookup
//!
//! The host is classified once at startup. Everything that used to depend on
//! the OS name (archive container, executable suffix, generator flavor) is a
//! field of [`Platform`], so nothing downstream asks the OS again.

use crate::core::error::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    Linux,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// x86 and x86_64
    Intel,
    /// 32- and 64-bit ARM (Raspberry Pi class hosts)
    Arm,
}

/// Archive container used for dependencies on a given host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::TarGz => "tar.gz",
        }
    }
}

/// Resolved host capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
    pub archive: ArchiveKind,
    pub exe_suffix: &'static str,
    /// Premake action producing native build files for this host
    pub flavor: &'static str,
}

impl Platform {
    /// Classify an OS/arch pair using the names from `std::env::consts`.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };

        let os_kind = match os {
            "windows" => Os::Windows,
            "linux" => Os::Linux,
            _ => return Err(unsupported()),
        };
        let arch_kind = match arch {
            "x86_64" | "x86" => Arch::Intel,
            "arm" | "aarch64" => Arch::Arm,
            _ => return Err(unsupported()),
        };

        let platform = match (os_kind, arch_kind) {
            (Os::Windows, _) => Platform {
                os: os_kind,
                arch: arch_kind,
                archive: ArchiveKind::Zip,
                exe_suffix: ".exe",
                flavor: "vs2019",
            },
            (Os::Linux, Arch::Intel) => Platform {
                os: os_kind,
                arch: arch_kind,
                archive: ArchiveKind::TarGz,
                exe_suffix: "",
                flavor: "gmake2",
            },
            (Os::Linux, Arch::Arm) => Platform {
                os: os_kind,
                arch: arch_kind,
                archive: ArchiveKind::TarGz,
                exe_suffix: "",
                flavor: "gmake",
            },
        };
        Ok(platform)
    }

    /// Error for a dependency that has no build for this host.
    pub fn unsupported(&self) -> Error {
        Error::UnsupportedPlatform {
            os: self.os.name().to_string(),
            arch: self.arch.name().to_string(),
        }
    }

    pub fn is_arm(&self) -> bool {
        self.arch == Arch::Arm
    }

    /// File name of an executable on this host.
    pub fn executable(&self, stem: &str) -> String {
        format!("{}{}", stem, self.exe_suffix)
    }

    /// Suffix used in Premake release archive names.
    pub fn release_tag(&self) -> &'static str {
        match (self.os, self.arch) {
            (Os::Windows, _) => "windows",
            (Os::Linux, Arch::Intel) => "linux",
            (Os::Linux, Arch::Arm) => "rpi",
        }
    }
}

impl Os {
    pub fn name(self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Linux => "linux",
        }
    }
}

impl Arch {
    pub fn name(self) -> &'static str {
        match self {
            Arch::Intel => "x86",
            Arch::Arm => "arm",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.name(), self.arch.name())
    }
}

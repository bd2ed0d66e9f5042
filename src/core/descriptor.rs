//! Dependency descriptor table
//!
//! Static description of every fetchable dependency: where its packed
//! archive lives, which mirrors can supply that archive, where it unpacks,
//! and which file proves it is installed. Built once from [`Settings`] and
//! never mutated afterwards.

use crate::core::platform::{Arch, Os, Platform};
use crate::core::settings::Settings;
use std::path::{Path, PathBuf};

/// Logical dependency names known to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    Premake,
    VulkanDebugLibs,
}

impl Dependency {
    pub fn label(self) -> &'static str {
        match self {
            Dependency::Premake => "Premake",
            Dependency::VulkanDebugLibs => "Vulkan SDK debug libs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: Dependency,
    /// Packed archive location; also the download destination
    pub archive: PathBuf,
    /// Ordered download alternatives for `archive`; empty means local only
    pub mirrors: Vec<String>,
    pub unpack_root: PathBuf,
    /// File whose presence means the dependency is installed
    pub probe: PathBuf,
    pub version: Option<String>,
}

/// Result of a table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Supported(&'a Descriptor),
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct DescriptorTable {
    entries: Vec<((Dependency, Os, Arch), Descriptor)>,
}

impl DescriptorTable {
    /// Build the table for a project rooted at `root`.
    pub fn new(root: &Path, settings: &Settings) -> Self {
        let mut entries = Vec::new();
        let premake = &settings.premake;
        let unpack_root = root.join(&premake.unpack_dir);

        for (os, arch, tag, ext, exe) in [
            (Os::Windows, Arch::Intel, "windows", "zip", "premake5.exe"),
            (Os::Linux, Arch::Intel, "linux", "tar.gz", "premake5"),
            (Os::Linux, Arch::Arm, "rpi", "tar.gz", "premake5"),
        ] {
            let file = format!("premake-{}-{}.{}", premake.version, tag, ext);
            // Premake publishes no Raspberry Pi build; that archive is vendored only.
            let mirrors = if premake.release_url.is_empty() || arch == Arch::Arm {
                Vec::new()
            } else {
                vec![format!(
                    "{}/v{}/{}",
                    premake.release_url.trim_end_matches('/'),
                    premake.version,
                    file
                )]
            };
            entries.push((
                (Dependency::Premake, os, arch),
                Descriptor {
                    name: Dependency::Premake,
                    archive: root.join(&premake.packed_dir).join(&file),
                    mirrors,
                    unpack_root: unpack_root.clone(),
                    probe: unpack_root.join(exe),
                    version: Some(premake.version.clone()),
                },
            ));
        }

        let vulkan = &settings.vulkan;
        let libs_root = root.join(&vulkan.libs_dir);
        entries.push((
            (Dependency::VulkanDebugLibs, Os::Windows, Arch::Intel),
            Descriptor {
                name: Dependency::VulkanDebugLibs,
                archive: root
                    .join(&vulkan.packed_dir)
                    .join(format!("VulkanSDK-{}-DebugLibs.zip", vulkan.required_version)),
                mirrors: vulkan.debug_lib_urls.clone(),
                probe: libs_root.join(&vulkan.debug_probe),
                unpack_root: libs_root,
                version: Some(vulkan.required_version.clone()),
            },
        ));

        Self { entries }
    }

    pub fn lookup(&self, name: Dependency, platform: &Platform) -> Resolution<'_> {
        self.entries
            .iter()
            .find(|((n, os, arch), _)| *n == name && *os == platform.os && *arch == platform.arch)
            .map(|(_, d)| Resolution::Supported(d))
            .unwrap_or(Resolution::Unsupported)
    }
}

//! Run configuration and the optional `bootstrap.toml` settings file.
//!
//! Every path, version and URL has a built-in default matching the Exelius
//! repository layout. A settings file only needs the keys it changes:
//!
//! ```toml
//! strict = true
//!
//! [premake]
//! version = "5.0.0-beta2"
//!
//! [vulkan]
//! enabled = true
//! required_version = "1.3.250.1"
//! ```

use crate::core::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings file looked up in the project root when none is named.
pub const DEFAULT_SETTINGS_FILE: &str = "bootstrap.toml";

/// Flags chosen on the command line. Immutable once built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub verbose: bool,
    pub force_submodule_update: bool,
    pub submodules_only: bool,
    /// Fail the run when the generator exits unsuccessfully
    pub strict: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Submodule manifest, relative to the project root
    pub manifest: PathBuf,
    /// Line marker preceding a submodule path in the manifest
    pub manifest_marker: String,
    pub strict: bool,
    pub premake: PremakeSettings,
    pub vulkan: VulkanSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PremakeSettings {
    pub version: String,
    pub unpack_dir: PathBuf,
    pub packed_dir: PathBuf,
    /// Project script handed to Premake with `--file=`
    pub script: PathBuf,
    /// Release download base; empty disables network fetches
    pub release_url: String,
    pub license_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VulkanSettings {
    pub enabled: bool,
    /// Environment variable holding the SDK install root
    pub env_var: String,
    pub required_version: String,
    pub installer_url: String,
    pub packed_dir: PathBuf,
    pub libs_dir: PathBuf,
    /// Probe file for the debug libraries, relative to `libs_dir`
    pub debug_probe: PathBuf,
    pub debug_lib_urls: Vec<String>,
    pub release_dlls: Vec<String>,
    pub release_dll_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(".gitmodules"),
            manifest_marker: "\tpath = ".to_string(),
            strict: false,
            premake: PremakeSettings::default(),
            vulkan: VulkanSettings::default(),
        }
    }
}

impl Default for PremakeSettings {
    fn default() -> Self {
        Self {
            version: "5.0.0-alpha16".to_string(),
            unpack_dir: PathBuf::from("tools/thirdparty/premake"),
            packed_dir: PathBuf::from("buildsystem/premakebuilds"),
            script: PathBuf::from("buildsystem/PremakeMain.lua"),
            release_url: "https://github.com/premake/premake-core/releases/download".to_string(),
            license_url: Some(
                "https://raw.githubusercontent.com/premake/premake-core/master/LICENSE.txt"
                    .to_string(),
            ),
        }
    }
}

impl Default for VulkanSettings {
    fn default() -> Self {
        let version = "1.2.170.0";
        Self {
            enabled: false,
            env_var: "VULKAN_SDK".to_string(),
            required_version: version.to_string(),
            installer_url: format!(
                "https://sdk.lunarg.com/sdk/download/{v}/windows/VulkanSDK-{v}-Installer.exe",
                v = version
            ),
            packed_dir: PathBuf::from("buildsystem/vulkan"),
            libs_dir: PathBuf::from("exelius/thirdparty/VulkanSDK"),
            debug_probe: PathBuf::from("Lib/shaderc_sharedd.lib"),
            debug_lib_urls: vec![
                format!(
                    "https://sdk.lunarg.com/sdk/download/{v}/windows/VulkanSDK-{v}-DebugLibs.zip",
                    v = version
                ),
                format!(
                    "https://files.lunarg.com/SDK-{v}/VulkanSDK-{v}-DebugLibs.zip",
                    v = version
                ),
            ],
            release_dlls: vec!["shaderc_shared.dll".to_string()],
            release_dll_dir: PathBuf::from("exelius/thirdparty/VulkanSDK"),
        }
    }
}

impl Settings {
    /// Load settings for a project.
    ///
    /// With `explicit` set the file must exist. Otherwise `bootstrap.toml` in
    /// `root` is used when present, and the defaults when it is not.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::Config {
                        path: path.to_path_buf(),
                        reason: "file not found".to_string(),
                    });
                }
                path.to_path_buf()
            }
            None => {
                let candidate = root.join(DEFAULT_SETTINGS_FILE);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|e| Error::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&text).map_err(|reason| Error::Config { path, reason })
    }

    /// Parse settings from TOML text, filling unset keys with defaults.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }
}

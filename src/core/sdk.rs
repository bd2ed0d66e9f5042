//! Vulkan SDK checks
//!
//! The SDK itself is installed by LunarG's installer, which the operator runs
//! by hand; this module only detects it, fetches the installer on request,
//! and then asks for a re-run. The debug libraries (Windows only) go through
//! the normal descriptor-table acquisition, and the release DLLs are copied
//! into the project so built binaries can find them.

use crate::core::acquire::{Acquisition, acquire};
use crate::core::descriptor::{Dependency, DescriptorTable, Resolution};
use crate::core::error::{Error, Result};
use crate::core::output::Sink;
use crate::core::platform::{Os, Platform};
use crate::core::settings::VulkanSettings;
use crate::core::validate::{Status, sdk_status};
use crate::helpers::consent::{Prompt, request_and_fetch};
use crate::helpers::download;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkReport {
    pub install_root: PathBuf,
    pub debug_libs: Option<Acquisition>,
    pub release_dlls_copied: usize,
}

/// Everything the SDK step needs from the run.
pub struct SdkContext<'a> {
    pub root: &'a Path,
    pub settings: &'a VulkanSettings,
    /// Value of the SDK environment variable, if set
    pub install_root: Option<&'a str>,
    pub table: &'a DescriptorTable,
    pub platform: &'a Platform,
}

pub fn ensure(ctx: &SdkContext<'_>, prompt: &mut dyn Prompt, sink: &dyn Sink) -> Result<SdkReport> {
    let settings = ctx.settings;
    sink.info("Validating Vulkan SDK");

    let install_root = match (sdk_status(ctx.install_root, &settings.required_version), ctx.install_root) {
        (Status::Satisfied, Some(found)) => {
            sink.info(&format!("Correct Vulkan SDK located at {}", found));
            PathBuf::from(found)
        }
        (_, found) => {
            match found {
                None => sink.warn("the Vulkan SDK is not installed"),
                Some(found) => sink.warn(&format!(
                    "Vulkan SDK at {} is not version {}",
                    found, settings.required_version
                )),
            }
            return Err(fetch_installer(ctx, prompt, sink));
        }
    };

    let mut report = SdkReport {
        install_root: install_root.clone(),
        ..SdkReport::default()
    };

    match ctx.table.lookup(Dependency::VulkanDebugLibs, ctx.platform) {
        Resolution::Unsupported => {
            sink.detail("debug libraries ship with the SDK on this platform");
        }
        resolution => {
            let acq = acquire(resolution, ctx.platform, prompt, sink)?;
            if !acq.state.is_satisfied() {
                sink.error("Vulkan SDK debug libs not installed; debug builds will not link");
            }
            report.debug_libs = Some(acq);
        }
    }

    if ctx.platform.os == Os::Windows {
        report.release_dlls_copied = copy_release_dlls(
            &install_root,
            &ctx.root.join(&settings.release_dll_dir),
            &settings.release_dlls,
            sink,
        )?;
    }

    Ok(report)
}

/// Offer the installer. Always ends the run: either the operator must run
/// the installer, or the SDK stays missing. Returns the error to stop with.
fn fetch_installer(ctx: &SdkContext<'_>, prompt: &mut dyn Prompt, sink: &dyn Sink) -> Error {
    let settings = ctx.settings;
    let missing = Error::Required {
        name: format!("Vulkan SDK {}", settings.required_version),
    };

    if ctx.platform.os != Os::Windows || settings.installer_url.is_empty() {
        sink.error(&format!(
            "install Vulkan SDK {} with your package manager and set {}",
            settings.required_version, settings.env_var
        ));
        return missing;
    }

    let installer = ctx.root.join(&settings.packed_dir).join(format!(
        "VulkanSDK-{}-Installer.exe",
        settings.required_version
    ));
    let question = format!("Download Vulkan SDK {} installer?", settings.required_version);
    let fetched = request_and_fetch(prompt, &question, || {
        download::download(&[settings.installer_url.clone()], &installer, sink)?;
        Ok(true)
    });

    match fetched {
        Ok(true) => {
            sink.warn("run the Vulkan SDK installer, then re-run bootstrap");
            Error::RestartRequired { installer }
        }
        Ok(false) => missing,
        Err(e) => e,
    }
}

/// Copy release DLLs from the SDK's `Bin` and `Bin32` into `dest`.
pub fn copy_release_dlls(sdk: &Path, dest: &Path, dlls: &[String], sink: &dyn Sink) -> Result<usize> {
    let mut copied = 0;
    for bin in ["Bin", "Bin32"] {
        let target = dest.join(bin);
        std::fs::create_dir_all(&target)
            .map_err(|e| Error::io(format!("cannot create directory {}", target.display()), e))?;
        for dll in dlls {
            let from = sdk.join(bin).join(dll);
            let to = target.join(dll);
            std::fs::copy(&from, &to).map_err(|e| {
                Error::io(format!("copy failed: {} -> {}", from.display(), to.display()), e)
            })?;
            sink.detail(&format!("copied {}", to.display()));
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::Recorder;
    use crate::core::settings::Settings;
    use crate::core::state::AcquisitionState;
    use crate::helpers::consent::ScriptedPrompt;

    fn sdk_dir(base: &Path, version: &str) -> PathBuf {
        let dir = base.join("VulkanSDK").join(version);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_matching_sdk_on_linux_skips_debug_libs() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let table = DescriptorTable::new(dir.path(), &settings);
        let platform = Platform::from_parts("linux", "x86_64").unwrap();
        let sdk = sdk_dir(dir.path(), "1.2.170.0").to_string_lossy().to_string();

        let ctx = SdkContext {
            root: dir.path(),
            settings: &settings.vulkan,
            install_root: Some(&sdk),
            table: &table,
            platform: &platform,
        };
        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
        let report = ensure(&ctx, &mut prompt, &Recorder::new()).unwrap();

        assert!(report.debug_libs.is_none());
        assert_eq!(report.release_dlls_copied, 0);
        assert_eq!(prompt.asked(), 0);
    }

    #[test]
    fn test_wrong_version_on_linux_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let table = DescriptorTable::new(dir.path(), &settings);
        let platform = Platform::from_parts("linux", "x86_64").unwrap();
        let sdk = sdk_dir(dir.path(), "1.2.131.2").to_string_lossy().to_string();

        let ctx = SdkContext {
            root: dir.path(),
            settings: &settings.vulkan,
            install_root: Some(&sdk),
            table: &table,
            platform: &platform,
        };
        let rec = Recorder::new();
        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
        let err = ensure(&ctx, &mut prompt, &rec).unwrap_err();

        assert!(matches!(err, Error::Required { .. }));
        assert!(rec.contains("is not version 1.2.170.0"));
    }

    #[test]
    fn test_declined_installer_on_windows_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let table = DescriptorTable::new(dir.path(), &settings);
        let platform = Platform::from_parts("windows", "x86_64").unwrap();

        let ctx = SdkContext {
            root: dir.path(),
            settings: &settings.vulkan,
            install_root: None,
            table: &table,
            platform: &platform,
        };
        let mut prompt = ScriptedPrompt::new(["n"]);
        let err = ensure(&ctx, &mut prompt, &Recorder::new()).unwrap_err();
        assert!(matches!(err, Error::Required { .. }));
        assert_eq!(prompt.asked(), 1);
    }

    fn pack_debug_libs(archive: &Path) {
        use std::io::Write;
        std::fs::create_dir_all(archive.parent().unwrap()).unwrap();
        let mut zip = zip::ZipWriter::new(std::fs::File::create(archive).unwrap());
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        zip.start_file("Lib/shaderc_sharedd.lib", options).unwrap();
        zip.write_all(b"debug lib").unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_windows_sdk_unpacks_debug_libs_and_copies_dlls() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let vulkan = &settings.vulkan;
        let table = DescriptorTable::new(dir.path(), &settings);
        let platform = Platform::from_parts("windows", "x86_64").unwrap();

        let sdk = sdk_dir(dir.path(), &vulkan.required_version);
        for bin in ["Bin", "Bin32"] {
            std::fs::create_dir_all(sdk.join(bin)).unwrap();
            std::fs::write(sdk.join(bin).join("shaderc_shared.dll"), bin).unwrap();
        }
        pack_debug_libs(
            &dir.path()
                .join(&vulkan.packed_dir)
                .join(format!("VulkanSDK-{}-DebugLibs.zip", vulkan.required_version)),
        );
        let sdk = sdk.to_string_lossy().to_string();

        let ctx = SdkContext {
            root: dir.path(),
            settings: vulkan,
            install_root: Some(&sdk),
            table: &table,
            platform: &platform,
        };
        let mut prompt = ScriptedPrompt::new(Vec::<String>::new());
        let report = ensure(&ctx, &mut prompt, &Recorder::new()).unwrap();

        let debug_libs = report.debug_libs.unwrap();
        assert_eq!(debug_libs.state, AcquisitionState::Ready);
        assert!(!debug_libs.downloaded);
        assert_eq!(prompt.asked(), 0);
        assert!(dir.path().join(&vulkan.libs_dir).join(&vulkan.debug_probe).is_file());

        assert_eq!(report.release_dlls_copied, 2);
        let dlls = dir.path().join(&vulkan.release_dll_dir);
        assert_eq!(std::fs::read_to_string(dlls.join("Bin/shaderc_shared.dll")).unwrap(), "Bin");
        assert_eq!(std::fs::read_to_string(dlls.join("Bin32/shaderc_shared.dll")).unwrap(), "Bin32");
    }

    #[test]
    fn test_copy_release_dlls() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = dir.path().join("sdk");
        for bin in ["Bin", "Bin32"] {
            std::fs::create_dir_all(sdk.join(bin)).unwrap();
            std::fs::write(sdk.join(bin).join("shaderc_shared.dll"), bin).unwrap();
        }
        let dest = dir.path().join("project/VulkanSDK");

        let copied =
            copy_release_dlls(&sdk, &dest, &["shaderc_shared.dll".to_string()], &Recorder::new())
                .unwrap();

        assert_eq!(copied, 2);
        assert_eq!(std::fs::read_to_string(dest.join("Bin32/shaderc_shared.dll")).unwrap(), "Bin32");
    }

    #[test]
    fn test_copy_missing_dll_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_release_dlls(
            &dir.path().join("sdk"),
            &dir.path().join("dest"),
            &["missing.dll".to_string()],
            &Recorder::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}

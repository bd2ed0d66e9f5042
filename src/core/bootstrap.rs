//! Acquisition orchestrator
//!
//! Start -> submodules -> (submodules only? stop) -> Premake -> [Vulkan SDK]
//! -> generate build files -> stop.
//!
//! There is no rollback. A dependency that could not be acquired stays
//! missing and the next run starts over from the filesystem.

use crate::core::acquire::{Acquisition, acquire};
use crate::core::descriptor::{Dependency, DescriptorTable, Resolution};
use crate::core::error::{Error, Result};
use crate::core::generator::{self, GeneratorOutcome};
use crate::core::output::Sink;
use crate::core::platform::Platform;
use crate::core::sdk::{self, SdkContext, SdkReport};
use crate::core::settings::{RunConfig, Settings};
use crate::core::submodules::{self, SubmoduleReport};
use crate::helpers::consent::Prompt;
use crate::helpers::download;
use crate::helpers::process::Runner;
use std::path::PathBuf;

/// What one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub submodules: SubmoduleReport,
    pub premake: Option<Acquisition>,
    pub sdk: Option<SdkReport>,
    pub generator: Option<GeneratorOutcome>,
}

impl Report {
    /// Number of dependencies fetched over the network.
    pub fn downloads(&self) -> usize {
        let premake = self.premake.iter().filter(|a| a.downloaded).count();
        let debug_libs = self
            .sdk
            .iter()
            .filter_map(|s| s.debug_libs.as_ref())
            .filter(|a| a.downloaded)
            .count();
        premake + debug_libs
    }
}

pub struct Bootstrap {
    root: PathBuf,
    config: RunConfig,
    settings: Settings,
    /// `None` on a host with no Premake build; submodule sync still runs
    platform: Option<Platform>,
    host: (String, String),
    table: DescriptorTable,
    sdk_root: Option<String>,
}

impl Bootstrap {
    pub fn new(root: PathBuf, config: RunConfig, settings: Settings, platform: Platform) -> Self {
        let host = (platform.os.name().to_string(), platform.arch.name().to_string());
        Self::build(root, config, settings, Some(platform), host)
    }

    /// Bootstrap for an OS/arch pair named as in `std::env::consts`.
    ///
    /// An unsupported pair is not an error here; the run fails when it
    /// reaches the first platform-specific step.
    pub fn for_host(root: PathBuf, config: RunConfig, settings: Settings, os: &str, arch: &str) -> Self {
        let platform = Platform::from_parts(os, arch).ok();
        Self::build(root, config, settings, platform, (os.to_string(), arch.to_string()))
    }

    /// Bootstrap for the machine this binary runs on.
    pub fn detect(root: PathBuf, config: RunConfig, settings: Settings) -> Self {
        Self::for_host(root, config, settings, std::env::consts::OS, std::env::consts::ARCH)
    }

    fn build(
        root: PathBuf,
        config: RunConfig,
        settings: Settings,
        platform: Option<Platform>,
        host: (String, String),
    ) -> Self {
        let table = DescriptorTable::new(&root, &settings);
        Self {
            root,
            config,
            settings,
            platform,
            host,
            table,
            sdk_root: None,
        }
    }

    /// Value of the SDK environment variable for this run.
    pub fn with_sdk_root(mut self, sdk_root: Option<String>) -> Self {
        self.sdk_root = sdk_root;
        self
    }

    pub fn table(&self) -> &DescriptorTable {
        &self.table
    }

    pub fn run(&self, runner: &dyn Runner, prompt: &mut dyn Prompt, sink: &dyn Sink) -> Result<Report> {
        sink.detail(&format!("project root {}", self.root.display()));
        sink.detail(&format!("host {}-{}", self.host.0, self.host.1));

        let mut report = Report {
            submodules: submodules::sync(
                &self.root.join(&self.settings.manifest),
                &self.settings.manifest_marker,
                &self.root,
                self.config.force_submodule_update,
                runner,
                sink,
            )?,
            ..Report::default()
        };

        if self.config.submodules_only {
            return Ok(report);
        }

        let platform = self.platform(sink)?;
        let (premake, probe) = self.ensure_premake(platform, prompt, sink)?;
        if !premake.state.is_satisfied() {
            sink.error("Premake required for project generation");
            return Err(Error::Required {
                name: "Premake".to_string(),
            });
        }
        report.premake = Some(premake);

        if self.settings.vulkan.enabled {
            let ctx = SdkContext {
                root: &self.root,
                settings: &self.settings.vulkan,
                install_root: self.sdk_root.as_deref(),
                table: &self.table,
                platform,
            };
            report.sdk = Some(sdk::ensure(&ctx, prompt, sink)?);
        }

        let invocation = generator::invocation(
            &probe,
            &self.root.join(&self.settings.premake.script),
            platform,
            self.config.verbose,
        );
        let strict = self.config.strict || self.settings.strict;
        report.generator = Some(generator::run(&invocation, &self.root, strict, runner, sink)?);

        sink.info("Exelius engine generation complete");
        Ok(report)
    }

    /// Acquire Premake; returns the acquisition and the executable path.
    fn platform(&self, sink: &dyn Sink) -> Result<&Platform> {
        self.platform.as_ref().ok_or_else(|| {
            sink.error(&format!("OS '{}' on '{}' is not supported", self.host.0, self.host.1));
            Error::UnsupportedPlatform {
                os: self.host.0.clone(),
                arch: self.host.1.clone(),
            }
        })
    }

    fn ensure_premake(
        &self,
        platform: &Platform,
        prompt: &mut dyn Prompt,
        sink: &dyn Sink,
    ) -> Result<(Acquisition, PathBuf)> {
        sink.info("Validating Premake installation");
        let resolution = self.table.lookup(Dependency::Premake, platform);
        let Resolution::Supported(descriptor) = resolution else {
            sink.error(&format!("no Premake build for {}", platform));
            return Err(platform.unsupported());
        };
        let acq = acquire(resolution, platform, prompt, sink)?;

        if acq.downloaded {
            if let Some(url) = &self.settings.premake.license_url {
                let license = descriptor.unpack_root.join("LICENSE.txt");
                if !license.exists() {
                    if let Err(e) = download::download(&[url.clone()], &license, sink) {
                        sink.warn(&format!("Premake license not downloaded: {}", e));
                    }
                }
            }
        }

        sink.info("Premake validation complete");
        Ok((acq, descriptor.probe.clone()))
    }
}

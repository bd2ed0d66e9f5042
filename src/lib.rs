//! Developer-machine bootstrap for the Exelius engine
//!
//! Run from the repository root, `bootstrap`:
//!
//! 1. checks that every submodule listed in `.gitmodules` is checked out and
//!    runs one `git submodule update --init --recursive` if any is missing,
//! 2. makes sure Premake is unpacked under `tools/thirdparty/premake`,
//!    unpacking the vendored archive or, with the operator's consent,
//!    downloading it,
//! 3. optionally checks the Vulkan SDK and its debug libraries,
//! 4. runs Premake to produce native build files.
//!
//! It never compiles the engine. Every step is an existence check first, so
//! re-running it on a prepared checkout does nothing but regenerate the
//! build files.
//!
//! # Embedding
//!
//! ```no_run
//! use exelius_bootstrap::{Bootstrap, Console, RunConfig, Settings};
//! use exelius_bootstrap::helpers::{consent::StdinPrompt, process::SystemRunner};
//! use std::path::PathBuf;
//!
//! let root = PathBuf::from(".");
//! let settings = Settings::load(&root, None)?;
//! let bootstrap = Bootstrap::detect(root, RunConfig::default(), settings);
//! let report = bootstrap.run(&SystemRunner, &mut StdinPrompt, &Console::new(false))?;
//! println!("{} download(s)", report.downloads());
//! # Ok::<(), exelius_bootstrap::Error>(())
//! ```

pub mod core;
pub mod helpers;

pub use crate::core::bootstrap::{Bootstrap, Report};
pub use crate::core::error::{Error, Result};
pub use crate::core::output::{Console, Level, Recorder, Sink};
pub use crate::core::platform::Platform;
pub use crate::core::settings::{RunConfig, Settings};
pub use crate::core::state::AcquisitionState;

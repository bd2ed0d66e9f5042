//! Build-file generator (Premake) invocation.

use crate::core::error::{Error, Result};
use crate::core::output::Sink;
use crate::core::platform::Platform;
use crate::helpers::process::Runner;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorOutcome {
    Succeeded,
    /// Failed, but the run was allowed to continue
    FailedTolerated(Option<i32>),
}

/// Build the generator command line for this host.
pub fn invocation(program: &Path, script: &Path, platform: &Platform, verbose: bool) -> Invocation {
    let mut args = vec![
        platform.flavor.to_string(),
        format!("--file={}", script.display()),
    ];
    if platform.is_arm() {
        args.push("--architecture=ARM64".to_string());
        args.push("--configuration=Release".to_string());
    }
    args.push(if verbose { "--verbosity=high" } else { "--verbosity=low" }.to_string());
    args.push("nopause".to_string());

    Invocation {
        program: program.to_path_buf(),
        args,
    }
}

/// Run the generator to completion.
///
/// A failed run is a warning unless `strict` is set.
pub fn run(
    invocation: &Invocation,
    cwd: &Path,
    strict: bool,
    runner: &dyn Runner,
    sink: &dyn Sink,
) -> Result<GeneratorOutcome> {
    sink.info("Executing Premake");
    sink.detail(&format!(
        "{} {}",
        invocation.program.display(),
        invocation.args.join(" ")
    ));

    let code = match runner.run(&invocation.program, &invocation.args, cwd) {
        Ok(Some(0)) => {
            sink.info("Premake generation completed");
            return Ok(GeneratorOutcome::Succeeded);
        }
        Ok(code) => code,
        Err(e) => {
            sink.warn(&format!("failed to start {}: {}", invocation.program.display(), e));
            None
        }
    };

    if strict {
        return Err(Error::GeneratorFailed {
            program: invocation.program.display().to_string(),
            code,
        });
    }
    sink.warn(&format!("Premake exited with status {:?}; build files may be incomplete", code));
    Ok(GeneratorOutcome::FailedTolerated(code))
}

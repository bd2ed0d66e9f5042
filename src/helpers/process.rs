//! External process seam
//!
//! Git and Premake are opaque executables. They run synchronously with the
//! terminal attached; only the exit code comes back.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub trait Runner {
    /// Run `program` in `cwd` to completion. Returns the exit code, `None`
    /// when the process was killed by a signal.
    fn run(&self, program: &Path, args: &[String], cwd: &Path) -> io::Result<Option<i32>>;

    /// Find a tool on `PATH`.
    fn locate(&self, tool: &str) -> Option<PathBuf>;
}

/// Runs real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, program: &Path, args: &[String], cwd: &Path) -> io::Result<Option<i32>> {
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(status.code())
    }

    fn locate(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let code = SystemRunner
            .run(
                Path::new("sh"),
                &["-c".to_string(), "exit 3".to_string()],
                dir.path(),
            )
            .unwrap();
        assert_eq!(code, Some(3));
    }

    #[test]
    fn test_missing_program_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemRunner.run(
            Path::new("definitely-not-a-real-tool-12345"),
            &[],
            dir.path(),
        );
        assert!(result.is_err());
        assert!(SystemRunner.locate("definitely-not-a-real-tool-12345").is_none());
    }
}

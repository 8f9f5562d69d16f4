use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Abstraction over subprocess execution for testability.
///
/// Production code uses [`SystemRunner`], tests use mockall-generated mocks.
/// `dir` is always passed to the child as its working directory; the
/// caller's own working directory is never changed.
pub trait CommandRunner {
    /// Run a command to completion and capture stdout.
    fn run(&self, program: &Path, args: &[String], dir: &Path) -> Result<String, ExecError>;

    /// Run a command to completion, streaming output to the terminal.
    fn run_streaming(&self, program: &Path, args: &[String], dir: &Path)
    -> Result<(), ExecError>;
}

/// Real process runner backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String], dir: &Path) -> Result<String, ExecError> {
        tracing::debug!(program = %program.display(), ?args, dir = %dir.display(), "exec");

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ExecError::Spawn {
                program: program.to_path_buf(),
                source: e,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ExecError::Failed {
                program: program.to_path_buf(),
                status: output.status,
                stderr: stderr.trim().to_owned(),
            })
        }
    }

    fn run_streaming(
        &self,
        program: &Path,
        args: &[String],
        dir: &Path,
    ) -> Result<(), ExecError> {
        tracing::debug!(program = %program.display(), ?args, dir = %dir.display(), "exec (streaming)");

        let status = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| ExecError::Spawn {
                program: program.to_path_buf(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::Failed {
                program: program.to_path_buf(),
                status,
                stderr: String::new(),
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to execute {program}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}{}", stderr_suffix(stderr))]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

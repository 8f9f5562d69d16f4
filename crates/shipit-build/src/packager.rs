use crate::archive::{self, ArchiveError, ArchivePlan};
use crate::exec::{CommandRunner, ExecError, SystemRunner};
use crate::git::{self, GitError};
use shipit_core::{ShipConfig, SourceLayout};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

type EnvLookup = Box<dyn Fn(&str) -> Option<OsString>>;

/// Inputs for one packaging run.
#[derive(Debug, Clone)]
pub struct PackageRequest<'a> {
    pub config: &'a ShipConfig,
    /// Directory that receives the final archive (the invocation directory).
    pub output_dir: &'a Path,
    /// Stream build script output instead of discarding it.
    pub show_build_output: bool,
}

/// Result of a successful packaging run.
#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub commit: String,
    /// Final location of the archive, inside the output directory.
    pub archive: PathBuf,
    /// Archive entry names, in stored order.
    pub entries: Vec<String>,
    pub steps: Vec<String>,
}

/// Runs the packaging pipeline, parameterized over the runner for testability.
pub struct Packager<R: CommandRunner = SystemRunner> {
    runner: R,
    env: EnvLookup,
}

impl Packager<SystemRunner> {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for Packager<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Packager<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            env: Box::new(|key| std::env::var_os(key)),
        }
    }

    /// Replace the process environment used to locate the source root.
    pub fn with_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<OsString> + 'static,
    {
        self.env = Box::new(env);
        self
    }

    pub(crate) fn runner(&self) -> &R {
        &self.runner
    }

    pub(crate) fn env(&self) -> &EnvLookup {
        &self.env
    }

    /// Clean check → build → name → archive → clean up → relocate.
    ///
    /// Every failure aborts the run. Nothing is rolled back; stale files
    /// left by an aborted run are removed by the next one.
    pub fn package(&self, request: &PackageRequest<'_>) -> Result<PackageOutcome, PackageError> {
        let mut steps = Vec::new();

        let output_dir =
            request
                .output_dir
                .canonicalize()
                .map_err(|e| PackageError::Resolve {
                    path: request.output_dir.to_path_buf(),
                    source: e,
                })?;

        // 1. Source root
        let layout = SourceLayout::resolve(request.config, &self.env)?;
        let source_root = layout.source_root.as_path();
        tracing::info!(source_root = %source_root.display(), "source root resolved");
        steps.push(format!("Source root: {}", source_root.display()));

        // 2. Clean repository gate
        git::ensure_clean(&self.runner, source_root)?;
        steps.push("Working tree is clean".to_owned());

        // 3. External build; a leftover artifact must not stand in for a fresh one
        remove_stale(layout.artifact())?;
        self.build(&layout, request.show_build_output)?;
        steps.push(format!("Built {}", layout.build_script().display()));

        // 4. Archive name
        let commit = git::head_commit(&self.runner, source_root)?;
        let file_name = archive::archive_file_name(&commit);
        tracing::info!(%commit, "archive name {file_name}");
        steps.push(format!("Commit {commit}"));

        // 5. Stale archive in the source root
        let staged = layout.archive_path(&file_name);
        remove_stale(&staged)?;

        // 6. Assemble
        let plan = ArchivePlan::collect(&layout, &request.config.archive)?;
        archive::write_archive(&plan, &staged)?;
        let entries: Vec<String> = plan.names().map(str::to_owned).collect();
        tracing::info!(entries = entries.len(), path = %staged.display(), "archive written");
        steps.push(format!("Archived {} entries", entries.len()));

        // 7. Build artifact no longer needed
        std::fs::remove_file(layout.artifact()).map_err(|e| PackageError::Remove {
            path: layout.artifact().to_path_buf(),
            source: e,
        })?;
        steps.push(format!("Removed {}", layout.artifact().display()));

        // 8-9. Relocate into the invocation directory
        let archive = output_dir.join(&file_name);
        let source_dir = source_root
            .canonicalize()
            .map_err(|e| PackageError::Resolve {
                path: source_root.to_path_buf(),
                source: e,
            })?;
        if source_dir == output_dir {
            tracing::debug!("output directory is the source root; archive already in place");
        } else {
            remove_stale(&archive)?;
            relocate(&staged, &archive)?;
        }
        steps.push(format!("Packaged: {}", archive.display()));

        Ok(PackageOutcome {
            commit,
            archive,
            entries,
            steps,
        })
    }

    fn build(&self, layout: &SourceLayout, show_output: bool) -> Result<(), PackageError> {
        let script = layout.build_script();
        if !script.is_file() {
            return Err(PackageError::MissingBuildScript(script.to_path_buf()));
        }

        tracing::info!(script = %script.display(), "running build script");
        let result = if show_output {
            self.runner.run_streaming(script, &[], &layout.source_root)
        } else {
            // Output is not inspected; only the exit status matters.
            self.runner
                .run(script, &[], &layout.source_root)
                .map(|_| ())
        };

        result.map_err(|e| PackageError::Build {
            script: script.to_path_buf(),
            source: e,
        })
    }
}

fn remove_stale(path: &Path) -> Result<(), PackageError> {
    if path.exists() {
        tracing::warn!(path = %path.display(), "removing stale file");
        std::fs::remove_file(path).map_err(|e| PackageError::Remove {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Rename, falling back to copy + remove when the directories are on
/// different filesystems.
fn relocate(from: &Path, to: &Path) -> Result<(), PackageError> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        // arch-lint: allow(no-error-swallowing) reason="rename error is logged; copy fallback reports its own error"
        Err(rename_err) => {
            tracing::debug!(error = %rename_err, "rename failed; copying instead");
            std::fs::copy(from, to).map_err(|e| PackageError::Relocate {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: e,
            })?;
            std::fs::remove_file(from).map_err(|e| PackageError::Remove {
                path: from.to_path_buf(),
                source: e,
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error(transparent)]
    Layout(#[from] shipit_core::Error),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("build script {0} doesn't exist")]
    MissingBuildScript(PathBuf),

    #[error("build script {script} failed")]
    Build { script: PathBuf, source: ExecError },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("failed to remove {path}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to move archive from {from} to {to}")]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to resolve {path}")]
    Resolve {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PackageError {
    /// True when the run was refused because the working tree is dirty.
    pub fn is_dirty(&self) -> bool {
        matches!(self, Self::Git(GitError::Dirty { .. }))
    }
}

use crate::exec::{CommandRunner, ExecError};
use std::path::Path;

const GIT: &str = "git";

/// Returns `git status --porcelain` output: empty means the tree is clean.
///
/// Staged, unstaged, and untracked (non-ignored) changes all show up.
pub fn working_tree_changes<R: CommandRunner>(runner: &R, repo: &Path) -> Result<String, GitError> {
    runner
        .run(Path::new(GIT), &args(["status", "--porcelain"]), repo)
        .map_err(|e| GitError::Command {
            command: "status",
            source: e,
        })
}

/// Fails with [`GitError::Dirty`] if the working tree has pending changes.
pub fn ensure_clean<R: CommandRunner>(runner: &R, repo: &Path) -> Result<(), GitError> {
    let changes = working_tree_changes(runner, repo)?;
    if changes.is_empty() {
        Ok(())
    } else {
        Err(GitError::Dirty {
            changes: changes.trim_end().to_owned(),
        })
    }
}

/// Full identifier of the most recent commit on the checked-out history.
///
/// The output is used verbatim apart from trailing line terminators.
pub fn head_commit<R: CommandRunner>(runner: &R, repo: &Path) -> Result<String, GitError> {
    let out = runner
        .run(
            Path::new(GIT),
            &args(["log", "-1", "--pretty=format:%H"]),
            repo,
        )
        .map_err(|e| GitError::Command {
            command: "log",
            source: e,
        })?;

    let commit = out.trim_end_matches(['\n', '\r']);
    if commit.is_empty() {
        return Err(GitError::EmptyCommitId);
    }
    Ok(commit.to_owned())
}

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("git {command} failed")]
    Command {
        command: &'static str,
        source: ExecError,
    },

    #[error("won't package because the repository has uncommitted changes:\n{changes}")]
    Dirty { changes: String },

    #[error("git log returned an empty commit identifier")]
    EmptyCommitId,
}

//! Clean-tree check, external build, and zip packaging for shipit.
//!
//! # Package pipeline
//!
//! ```text
//! shipit package
//!   1. Source root ── $GOPATH/src/<host>/<owner>/<project> (or [source].root)
//!   2. Dirty check ── git status --porcelain, any output aborts
//!   3. Build       ── <build.script> run inside the source root
//!   4. Name        ── git log -1 --pretty=format:%H → <commit>.zip
//!   5. Stale       ── remove <source root>/<commit>.zip
//!   6. Archive     ── artifact + helper script + assets tree, deflated
//!   7. Clean up    ── remove the build artifact
//!   8. Relocate    ── replace <invocation dir>/<commit>.zip
//! ```
//!
//! No step changes the process working directory; every subprocess gets
//! its directory through [`CommandRunner`].

pub mod archive;
pub mod doctor;
pub mod exec;
pub mod git;
pub mod packager;

pub use archive::{ArchiveEntry, ArchiveError, ArchivePlan, archive_file_name, list_entries};
pub use doctor::{CheckResult, DoctorReport};
pub use exec::{CommandRunner, ExecError, SystemRunner};
pub use git::GitError;
pub use packager::{PackageError, PackageOutcome, PackageRequest, Packager};

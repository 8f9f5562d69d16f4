//! Source root discovery.
//!
//! The source root is derived from an environment-provided base path:
//!
//! ```text
//! $GOPATH/src/github.com/<owner>/<project>
//! ```
//!
//! Every path the packager touches is resolved against it explicitly;
//! the process working directory is never changed.

use crate::config::ShipConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Absolute locations of everything the packager reads or writes in the
/// source tree.
///
/// # Construction
///
/// Use [`SourceLayout::resolve()`] for real runs. [`SourceLayout::at()`]
/// skips the environment lookup and is what an explicit `[source].root`
/// resolves to.
///
/// # Examples
///
/// ```
/// use shipit_core::{ShipConfig, SourceLayout};
/// use std::ffi::OsString;
///
/// let dir = std::env::temp_dir();
/// let config = ShipConfig::default();
/// let layout = SourceLayout::resolve(&config, |_| Some(OsString::from("/nonexistent")));
/// assert!(layout.is_err());
///
/// let layout = SourceLayout::at(&dir, &config).unwrap();
/// assert_eq!(layout.archive_path("abc.zip"), dir.join("abc.zip"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    /// Repository checkout the build runs in
    pub source_root: PathBuf,
    build_script: PathBuf,
    artifact: PathBuf,
    helper_script: PathBuf,
    assets_dir: PathBuf,
}

impl SourceLayout {
    /// Resolve the source root from configuration and the environment.
    ///
    /// `env` is consulted only when `[source].root` is unset; production
    /// callers pass `|key| std::env::var_os(key)`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingEnv`](crate::Error::MissingEnv) if the base-path variable is unset or empty
    /// - [`Error::SourceRootMissing`](crate::Error::SourceRootMissing) if the resolved path is not a directory
    /// - [`Error::SourceRootResolve`](crate::Error::SourceRootResolve) if a relative path can't be made absolute
    pub fn resolve<F>(config: &ShipConfig, env: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let root = match &config.source.root {
            Some(root) => root.clone(),
            None => {
                let var = &config.source.env;
                let base = env(var)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| crate::Error::MissingEnv { var: var.clone() })?;
                PathBuf::from(base)
                    .join("src")
                    .join(&config.source.host)
                    .join(&config.source.owner)
                    .join(&config.source.project)
            }
        };

        Self::at(&root, config)
    }

    /// Build a layout rooted at `root`, which must be an existing directory.
    ///
    /// A relative `root` is made absolute against the current directory.
    pub fn at(root: &Path, config: &ShipConfig) -> crate::Result<Self> {
        if !root.is_dir() {
            return Err(crate::Error::SourceRootMissing {
                path: root.to_path_buf(),
            });
        }
        let root = std::path::absolute(root).map_err(|e| crate::Error::SourceRootResolve {
            path: root.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(source_root = %root.display(), "source root resolved");

        Ok(Self {
            source_root: root.to_path_buf(),
            build_script: root.join(&config.build.script),
            artifact: root.join(&config.build.artifact),
            helper_script: root.join(&config.archive.helper_script),
            assets_dir: root.join(&config.archive.assets_dir),
        })
    }

    pub fn build_script(&self) -> &Path {
        &self.build_script
    }

    /// Build output that gets packaged and then deleted.
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn helper_script(&self) -> &Path {
        &self.helper_script
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Where an archive named `file_name` is assembled before relocation.
    pub fn archive_path(&self, file_name: &str) -> PathBuf {
        self.source_root.join(file_name)
    }
}

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name looked up in the invocation directory.
pub const CONFIG_FILE: &str = "shipit.toml";

/// shipit.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Environment variable holding the base path (defaults to GOPATH)
    #[serde(default = "default_env")]
    pub env: String,
    /// Code host segment under `<base>/src`
    #[serde(default = "default_host")]
    pub host: String,
    /// Repository owner
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Repository name
    #[serde(default = "default_project")]
    pub project: String,
    /// Explicit source root. When set, `env`/`host`/`owner`/`project` are ignored.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Build script, relative to the source root
    #[serde(default = "default_build_script")]
    pub script: PathBuf,
    /// File the build script produces, relative to the source root
    #[serde(default = "default_artifact")]
    pub artifact: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Entry name of the build artifact inside the archive
    #[serde(default = "default_binary_name")]
    pub binary_name: String,
    /// Helper script, relative to the source root
    #[serde(default = "default_helper_script")]
    pub helper_script: PathBuf,
    /// Entry name of the helper script inside the archive
    #[serde(default = "default_helper_name")]
    pub helper_name: String,
    /// Static assets directory, relative to the source root.
    /// Added recursively; entries keep this directory as their top-level name.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            host: default_host(),
            owner: default_owner(),
            project: default_project(),
            root: None,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            script: default_build_script(),
            artifact: default_artifact(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            binary_name: default_binary_name(),
            helper_script: default_helper_script(),
            helper_name: default_helper_name(),
            assets_dir: default_assets_dir(),
        }
    }
}

impl ShipConfig {
    /// Load from shipit.toml in the given directory, or return defaults if not found.
    ///
    /// The loaded configuration is validated before it is returned.
    pub fn load(dir: &Path) -> crate::Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })?
        } else {
            tracing::debug!(dir = %dir.display(), "no {CONFIG_FILE}; using defaults");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every source-root-relative path stays inside the source root
    /// and that archive entry names are usable.
    pub fn validate(&self) -> crate::Result<()> {
        check_relative("build.script", &self.build.script)?;
        check_relative("build.artifact", &self.build.artifact)?;
        check_relative("archive.helper_script", &self.archive.helper_script)?;
        check_relative("archive.assets_dir", &self.archive.assets_dir)?;
        check_entry_name("archive.binary_name", &self.archive.binary_name)?;
        check_entry_name("archive.helper_name", &self.archive.helper_name)?;
        if self.archive.binary_name == self.archive.helper_name {
            return Err(crate::Error::DuplicateEntryName(
                self.archive.binary_name.clone(),
            ));
        }
        Ok(())
    }
}

fn check_relative(field: &'static str, path: &Path) -> crate::Result<()> {
    let reason = if path.is_absolute() || path.has_root() {
        Some("must be relative to the source root")
    } else if path.components().any(|c| matches!(c, Component::ParentDir)) {
        Some("must not contain '..'")
    } else if !path.components().any(|c| matches!(c, Component::Normal(_))) {
        Some("path is empty")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(crate::Error::InvalidRelativePath {
            field,
            path: path.to_path_buf(),
            reason,
        }),
        None => Ok(()),
    }
}

fn check_entry_name(field: &'static str, name: &str) -> crate::Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("must be a plain file name")
    } else if name == "." || name == ".." {
        Some("must be a plain file name")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(crate::Error::InvalidEntryName {
            field,
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

fn default_env() -> String {
    "GOPATH".to_owned()
}

fn default_host() -> String {
    "github.com".to_owned()
}

fn default_owner() -> String {
    "kjk".to_owned()
}

fn default_project() -> String {
    "quicknotes".to_owned()
}

fn default_build_script() -> PathBuf {
    PathBuf::from("scripts/build_linux.sh")
}

fn default_artifact() -> PathBuf {
    PathBuf::from("quicknotes_linux")
}

fn default_binary_name() -> String {
    "quicknotes".to_owned()
}

fn default_helper_script() -> PathBuf {
    PathBuf::from("scripts/server_run.sh")
}

fn default_helper_name() -> String {
    "server_run.sh".to_owned()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("s")
}

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid {field} {path:?}: {reason}")]
    InvalidRelativePath {
        field: &'static str,
        path: PathBuf,
        reason: &'static str,
    },

    #[error("invalid {field} {name:?}: {reason}")]
    InvalidEntryName {
        field: &'static str,
        name: String,
        reason: &'static str,
    },

    #[error("archive.binary_name and archive.helper_name are both {0:?}")]
    DuplicateEntryName(String),

    // ── Source root resolution ──
    #[error("environment variable {var} is not set — set it or configure [source].root")]
    MissingEnv { var: String },

    #[error("source root {path} doesn't exist")]
    SourceRootMissing { path: PathBuf },

    #[error("failed to resolve source root {path}")]
    SourceRootResolve {
        path: PathBuf,
        source: std::io::Error,
    },
}

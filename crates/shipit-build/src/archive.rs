//! Deployment archive assembly.
//!
//! Layout of the produced zip:
//!
//! ```text
//! <binary_name>            ← build artifact, renamed
//! <helper_name>            ← helper script, renamed
//! <assets_dir>/<rel path>  ← every file under the assets directory
//! ```

use shipit_core::{ArchiveConfig, SourceLayout};
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Archive file name for a commit identifier. The identifier is used verbatim.
pub fn archive_file_name(commit: &str) -> String {
    format!("{commit}.zip")
}

/// One file to be written into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// File on disk
    pub source: PathBuf,
    /// Name inside the archive (forward slashes, no leading `/`)
    pub name: String,
}

/// Ordered list of archive entries, checked against the filesystem.
#[derive(Debug, Clone, Default)]
pub struct ArchivePlan {
    pub entries: Vec<ArchiveEntry>,
}

impl ArchivePlan {
    /// Collect the artifact, the helper script, and the full assets tree.
    ///
    /// All inputs are checked before anything is written, so a missing
    /// input never leaves a half-built archive behind.
    pub fn collect(layout: &SourceLayout, config: &ArchiveConfig) -> Result<Self, ArchiveError> {
        if !layout.artifact().is_file() {
            return Err(ArchiveError::MissingArtifact(layout.artifact().to_path_buf()));
        }
        if !layout.helper_script().is_file() {
            return Err(ArchiveError::MissingHelper(
                layout.helper_script().to_path_buf(),
            ));
        }
        if !layout.assets_dir().is_dir() {
            return Err(ArchiveError::MissingAssets(
                layout.assets_dir().to_path_buf(),
            ));
        }

        let mut entries = vec![
            ArchiveEntry {
                source: layout.artifact().to_path_buf(),
                name: config.binary_name.clone(),
            },
            ArchiveEntry {
                source: layout.helper_script().to_path_buf(),
                name: config.helper_name.clone(),
            },
        ];

        let prefix = entry_name(&config.assets_dir)?;
        for rel in list_relative_files(layout.assets_dir())? {
            let name = format!("{prefix}/{}", entry_name(&rel)?);
            entries.push(ArchiveEntry {
                source: layout.assets_dir().join(&rel),
                name,
            });
        }

        Ok(Self { entries })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

/// Write `plan` into a new deflate-compressed zip at `dest`.
///
/// Unix permission bits of each source file are preserved so the binary
/// and helper script stay executable after extraction.
pub fn write_archive(plan: &ArchivePlan, dest: &Path) -> Result<(), ArchiveError> {
    let file = File::create(dest).map_err(|e| ArchiveError::Create {
        path: dest.to_path_buf(),
        source: e,
    })?;
    let mut zip = ZipWriter::new(file);

    for entry in &plan.entries {
        let mut source = File::open(&entry.source).map_err(|e| ArchiveError::Read {
            path: entry.source.clone(),
            source: e,
        })?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(file_mode(&source));

        tracing::debug!(name = %entry.name, source = %entry.source.display(), "adding entry");
        zip.start_file(entry.name.as_str(), options)
            .map_err(|e| ArchiveError::AddEntry {
                name: entry.name.clone(),
                source: e,
            })?;
        io::copy(&mut source, &mut zip).map_err(|e| ArchiveError::WriteEntry {
            name: entry.name.clone(),
            source: e,
        })?;
    }

    zip.finish().map_err(|e| ArchiveError::Finish {
        path: dest.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Entry names of an existing archive, in stored order.
pub fn list_entries(path: &Path) -> Result<Vec<String>, ArchiveError> {
    let file = File::open(path).map_err(|e| ArchiveError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|e| ArchiveError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut names = Vec::with_capacity(archive.len());
    for idx in 0..archive.len() {
        let entry = archive.by_index(idx).map_err(|e| ArchiveError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        names.push(entry.name().to_owned());
    }
    Ok(names)
}

/// Files under `base`, relative to it, sorted by path.
///
/// Symlinks to files are included and archived by content. Symlinked
/// directories are not descended into.
fn list_relative_files(base: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut rel_paths = Vec::new();
    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::Walk {
            path: base.to_path_buf(),
            source: e,
        })?;
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(base)
            .map_err(|e| ArchiveError::OutsideAssets {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
        rel_paths.push(rel.to_path_buf());
    }
    Ok(rel_paths)
}

/// Zip entry name for a relative path: normal components joined with `/`.
fn entry_name(path: &Path) -> Result<String, ArchiveError> {
    let mut segments = Vec::new();
    for component in path.components() {
        if let Component::Normal(segment) = component {
            let segment = segment
                .to_str()
                .ok_or_else(|| ArchiveError::NonUtf8Name(path.to_path_buf()))?;
            segments.push(segment);
        }
    }
    Ok(segments.join("/"))
}

#[cfg(unix)]
fn file_mode(file: &File) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    match file.metadata() {
        Ok(meta) => meta.permissions().mode() & 0o777,
        Err(e) => {
            tracing::warn!(error = %e, "could not read permissions; storing 0644");
            0o644
        }
    }
}

#[cfg(not(unix))]
fn file_mode(_file: &File) -> u32 {
    0o644
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("build artifact {0} doesn't exist — did the build script produce it?")]
    MissingArtifact(PathBuf),

    #[error("helper script {0} doesn't exist")]
    MissingHelper(PathBuf),

    #[error("dir '{0}' doesn't exist")]
    MissingAssets(PathBuf),

    #[error("failed to walk {path}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("file name {0:?} is not valid UTF-8")]
    NonUtf8Name(PathBuf),

    #[error("{path} is outside the assets directory")]
    OutsideAssets {
        path: PathBuf,
        source: std::path::StripPrefixError,
    },

    #[error("failed to create archive {path}")]
    Create {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to add {name} to archive")]
    AddEntry {
        name: String,
        source: zip::result::ZipError,
    },

    #[error("failed to write {name} into archive")]
    WriteEntry { name: String, source: io::Error },

    #[error("failed to finalize archive {path}")]
    Finish {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("failed to read archive {path}")]
    Open {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

//! Task input resolution
//!
//! Raw inputs arrive as strings (command line, agent environment, or an
//! inputs file) and are validated into an [`ArchiveRequest`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{ArchiveError, Result};
use crate::types::{ArchiveRequest, ArchiveType, TarCompression};
use crate::utils::normalize_path;

/// Unvalidated task inputs, named as in the task definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInputs {
    #[serde(default, deserialize_with = "scalar")]
    pub root_folder: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub include_root_folder: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub archive_type: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub tar_compression: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub archive_file: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub replace_existing_archive: Option<String>,
}

/// Accept plain booleans in inputs files as well as strings
fn scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Text(String),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|v| match v {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Text(s) => s,
    }))
}

impl RawInputs {
    /// Load inputs from a YAML or JSON file (by extension)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let inputs = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        debug!("loaded inputs from {}", path.display());
        Ok(inputs)
    }

    /// Layer `overrides` on top of these inputs
    pub fn merge(self, overrides: RawInputs) -> RawInputs {
        RawInputs {
            root_folder: overrides.root_folder.or(self.root_folder),
            include_root_folder: overrides.include_root_folder.or(self.include_root_folder),
            archive_type: overrides.archive_type.or(self.archive_type),
            tar_compression: overrides.tar_compression.or(self.tar_compression),
            archive_file: overrides.archive_file.or(self.archive_file),
            replace_existing_archive: overrides
                .replace_existing_archive
                .or(self.replace_existing_archive),
        }
    }
}

/// Validates raw inputs into an archive request
#[derive(Debug, Clone, Default)]
pub struct InputResolver {
    repo_root: Option<PathBuf>,
}

impl InputResolver {
    /// Create a resolver joining relative paths onto `repo_root`
    pub fn new(repo_root: Option<PathBuf>) -> Self {
        debug!("repoRoot: {:?}", repo_root);
        Self { repo_root }
    }

    pub fn resolve(&self, raw: &RawInputs) -> Result<ArchiveRequest> {
        let root_folder = self.make_absolute(required("rootFolder", &raw.root_folder)?)?;
        let include_root_folder = parse_bool(
            "includeRootFolder",
            required("includeRootFolder", &raw.include_root_folder)?,
        )?;
        let archive_type: ArchiveType = required("archiveType", &raw.archive_type)?.parse()?;
        let archive_file = self.make_absolute(required("archiveFile", &raw.archive_file)?)?;
        let replace_existing = parse_bool(
            "replaceExistingArchive",
            required("replaceExistingArchive", &raw.replace_existing_archive)?,
        )?;

        let tar_compression = if archive_type == ArchiveType::Tar {
            Some(required("tarCompression", &raw.tar_compression)?.parse::<TarCompression>()?)
        } else {
            None
        };

        Ok(ArchiveRequest {
            root_folder,
            include_root_folder,
            archive_type,
            archive_file,
            replace_existing,
            tar_compression,
        })
    }

    fn make_absolute(&self, value: &str) -> Result<PathBuf> {
        let normalized = normalize_path(Path::new(value));
        debug!("makeAbsolute: {}", normalized.display());

        if normalized.is_absolute() {
            return Ok(normalized);
        }

        let repo_root = self.repo_root.as_ref().ok_or_else(|| {
            ArchiveError::Configuration(format!(
                "Relative path '{}' can not be resolved without a repository root",
                value
            ))
        })?;
        let resolved = normalize_path(&repo_root.join(&normalized));
        debug!(
            "Relative file path: {} resolving to: {}",
            normalized.display(),
            resolved.display()
        );
        Ok(resolved)
    }
}

fn required<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ArchiveError::Configuration(format!(
            "Input required: {}",
            name
        ))),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ArchiveError::Configuration(format!(
            "Input {} must be true or false, got '{}'",
            name, value
        )))
    }
}

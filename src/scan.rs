//! Configuration tree scanning
//!
//! Lists Terraform configuration files below a root, skipping tool and vendor directories.

use std::path::{Path, PathBuf};

use crate::error::TfrstateError;
use crate::fs::FileSystem;

/// Directory names that are never descended into.
pub const IGNORED_DIRS: &[&str] = &[".terraform", ".git", ".github", "vendor", "node_modules"];

const NATIVE_SUFFIX: &str = ".tf";
const JSON_SUFFIX: &str = ".tf.json";

/// Syntax a configuration file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `*.tf`
    Native,
    /// `*.tf.json`
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(JSON_SUFFIX) {
            Some(ConfigFormat::Json)
        } else if name.ends_with(NATIVE_SUFFIX) {
            Some(ConfigFormat::Native)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    pub path: PathBuf,
    pub format: ConfigFormat,
}

pub fn is_ignored_dir(name: &str) -> bool {
    IGNORED_DIRS.contains(&name)
}

/// Find `*.tf` and `*.tf.json` files below `root`, sorted by path.
pub fn find_config_files(
    fs: &dyn FileSystem,
    root: &Path,
) -> Result<Vec<ConfigPath>, TfrstateError> {
    let files = fs
        .walk(root, &is_ignored_dir)
        .map_err(TfrstateError::io(root))?;

    let configs: Vec<ConfigPath> = files
        .into_iter()
        .filter_map(|path| {
            ConfigFormat::from_path(&path).map(|format| ConfigPath { path, format })
        })
        .collect();

    tracing::debug!(
        root = %root.display(),
        num_of_files = configs.len(),
        "found configuration files"
    );
    Ok(configs)
}

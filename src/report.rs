//! Report model: matched directories and files with stable, relative paths.

use std::path::Path;

use serde::Serialize;

use crate::error::TfrstateError;
use crate::find::MatchResult;
use crate::paths::{absolutize, normalize_path, relative_to};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Relative to the base directory
    pub dir: String,
    pub files: Vec<ChangedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    /// Relative to the change's directory
    pub path: String,
    pub outputs: Vec<String>,
}

/// Convert matches into changes.
///
/// `base_dir`, directories and files may each be absolute or relative to `pwd`.
pub fn to_changes(
    pwd: &Path,
    base_dir: &Path,
    matches: &MatchResult,
) -> Result<Vec<Change>, TfrstateError> {
    let base_dir = absolutize(pwd, base_dir);
    let mut changes = Vec::with_capacity(matches.len());
    for (dir, files) in matches.iter() {
        let abs_dir = absolutize(pwd, dir);
        let rel_dir = relative_to(&base_dir, &abs_dir).ok_or_else(|| {
            TfrstateError::Report(format!(
                "can't make {} relative to {}",
                abs_dir.display(),
                base_dir.display()
            ))
        })?;

        let mut changed_files = Vec::with_capacity(files.len());
        for (file, outputs) in files.iter() {
            let abs_file = absolutize(pwd, file);
            let rel_file = relative_to(&abs_dir, &abs_file).ok_or_else(|| {
                TfrstateError::Report(format!(
                    "can't make {} relative to {}",
                    abs_file.display(),
                    abs_dir.display()
                ))
            })?;
            changed_files.push(ChangedFile {
                path: normalize_path(&rel_file),
                outputs: outputs.iter().cloned().collect(),
            });
        }
        changed_files.sort_by(|a, b| a.path.cmp(&b.path));

        changes.push(Change {
            dir: normalize_path(&rel_dir),
            files: changed_files,
        });
    }
    changes.sort_by(|a, b| a.dir.cmp(&b.dir));
    Ok(changes)
}

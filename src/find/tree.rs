use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::TfrstateError;
use crate::fs::FileSystem;
use crate::scan::{ConfigFormat, ConfigPath};
use crate::terraform::{
    BackendIdentity, REMOTE_STATE_TYPE, RemoteStateRef, extract_remote_states,
    extract_remote_states_from_json,
};

/// A configuration file read once and kept for both parsing and text scanning.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub text: String,
    pub bytes: Vec<u8>,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>, format: ConfigFormat, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            format,
            text: String::from_utf8_lossy(&bytes).into_owned(),
            bytes,
        }
    }
}

/// A directory holding at least one file that mentions `terraform_remote_state`.
#[derive(Debug, Clone)]
pub struct Directory {
    pub path: PathBuf,
    pub files: Vec<ConfigFile>,
    pub states: Vec<RemoteStateRef>,
}

/// Append-only set of directories, in the order they were discovered.
#[derive(Debug, Default)]
pub struct Directories {
    dirs: Vec<Directory>,
    index: BTreeMap<PathBuf, usize>,
}

impl Directories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every candidate and keep those that mention `terraform_remote_state`.
    pub fn collect(
        fs: &dyn FileSystem,
        candidates: Vec<ConfigPath>,
    ) -> Result<Self, TfrstateError> {
        let mut dirs = Self::new();
        for candidate in candidates {
            let bytes = fs
                .read(&candidate.path)
                .map_err(TfrstateError::io(&candidate.path))?;
            let file = ConfigFile::new(candidate.path, candidate.format, bytes);
            if !file.text.contains(REMOTE_STATE_TYPE) {
                continue;
            }
            dirs.push_file(file);
        }
        Ok(dirs)
    }

    pub fn push_file(&mut self, file: ConfigFile) {
        let dir_path = parent_dir(&file.path);
        let idx = match self.index.get(&dir_path) {
            Some(&idx) => idx,
            None => {
                self.dirs.push(Directory {
                    path: dir_path.clone(),
                    files: Vec::new(),
                    states: Vec::new(),
                });
                self.index.insert(dir_path, self.dirs.len() - 1);
                self.dirs.len() - 1
            }
        };
        self.dirs[idx].files.push(file);
    }

    /// Record, per directory, the data sources that read the `target` state.
    pub fn extract_remote_states(&mut self, target: &BackendIdentity) -> Result<(), TfrstateError> {
        for dir in &mut self.dirs {
            for file in &dir.files {
                tracing::debug!(file = %file.path.display(), "terraform_remote_state is found");
                let states = match file.format {
                    ConfigFormat::Native => extract_remote_states(&file.text, &file.path, target)?,
                    ConfigFormat::Json => {
                        extract_remote_states_from_json(&file.bytes, &file.path, target)?
                    }
                };
                dir.states.extend(states);
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Directory> {
        self.dirs.iter()
    }

    pub fn get(&self, path: &Path) -> Option<&Directory> {
        self.index.get(path).map(|&idx| &self.dirs[idx])
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

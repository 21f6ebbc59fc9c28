//! Textual matching of `data.terraform_remote_state.<name>.outputs.<output>` accessors.
//!
//! Matching is plain substring containment over the whole file, so an accessor inside a
//! comment or a string literal counts too.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::changed::ChangedOutputs;
use super::tree::{ConfigFile, Directories, Directory};
use crate::terraform::RemoteStateRef;

pub const REMOTE_STATE_ACCESS_PREFIX: &str = "data.terraform_remote_state.";
const OUTPUTS_MARKER: &str = ".outputs.";

/// directory -> file -> matched output names
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchResult {
    dirs: BTreeMap<PathBuf, DirMatches>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirMatches {
    files: BTreeMap<PathBuf, BTreeSet<String>>,
}

impl MatchResult {
    fn file_mut(&mut self, dir: &Path, file: &Path) -> &mut BTreeSet<String> {
        self.dirs
            .entry(dir.to_path_buf())
            .or_default()
            .files
            .entry(file.to_path_buf())
            .or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &DirMatches)> {
        self.dirs.iter().map(|(dir, m)| (dir.as_path(), m))
    }

    pub fn outputs(&self, dir: &Path, file: &Path) -> Option<&BTreeSet<String>> {
        self.dirs.get(dir)?.files.get(file)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

impl DirMatches {
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &BTreeSet<String>)> {
        self.files.iter().map(|(file, outputs)| (file.as_path(), outputs))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Find the files that read changed outputs through a matching data source of their directory.
pub fn find_callers(dirs: &Directories, changed: &ChangedOutputs) -> MatchResult {
    let mut result = MatchResult::default();
    for dir in dirs.iter() {
        for file in &dir.files {
            if !file.text.contains(REMOTE_STATE_ACCESS_PREFIX) {
                continue;
            }
            for state in &dir.states {
                find_callers_in_file(&mut result, dir, file, state, changed);
            }
        }
    }
    result
}

fn find_callers_in_file(
    result: &mut MatchResult,
    dir: &Directory,
    file: &ConfigFile,
    state: &RemoteStateRef,
    changed: &ChangedOutputs,
) {
    let accessor = format!("{REMOTE_STATE_ACCESS_PREFIX}{}{OUTPUTS_MARKER}", state.name);
    if !file.text.contains(&accessor) {
        return;
    }
    match changed {
        ChangedOutputs::Unfiltered => {
            result.file_mut(&dir.path, &file.path);
        }
        ChangedOutputs::Names(names) => {
            for name in names {
                if file.text.contains(&format!("{accessor}{name}")) {
                    result.file_mut(&dir.path, &file.path).insert(name.clone());
                }
            }
        }
    }
}

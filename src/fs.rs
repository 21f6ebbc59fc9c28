//! Filesystem access used by the engine.
//!
//! Every read goes through [`FileSystem`] so the engine can run against the real
//! filesystem ([`OsFs`]) or an in-memory tree ([`MemFs`]).

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::paths::clean;

pub trait FileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Regular files directly inside `dir`, sorted by path.
    fn files_in(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Regular files below `root`, sorted by path.
    ///
    /// Directories whose name `prune` accepts are not descended into.
    fn walk(&self, root: &Path, prune: &dyn Fn(&str) -> bool) -> io::Result<Vec<PathBuf>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

/// A regular file, or a symlink whose target is one. Directory symlinks are not followed.
fn is_file(path: &Path, file_type: std::fs::FileType) -> bool {
    if file_type.is_symlink() {
        return std::fs::metadata(path).is_ok_and(|meta| meta.is_file());
    }
    file_type.is_file()
}

impl FileSystem for OsFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn files_in(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if is_file(&path, entry.file_type()?) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn walk(&self, root: &Path, prune: &dyn Fn(&str) -> bool) -> io::Result<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !prune(&entry.file_name().to_string_lossy())
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry?;
            if is_file(entry.path(), entry.file_type()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// In-memory filesystem keyed by lexically cleaned paths.
#[derive(Debug, Clone, Default)]
pub struct MemFs {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.files.insert(clean(path.as_ref()), content.into());
    }

    fn entries_below<'a>(
        &'a self,
        root: &'a Path,
    ) -> impl Iterator<Item = (&'a PathBuf, &'a Path)> {
        self.files.keys().filter_map(move |path| {
            if root == Path::new(".") {
                return (!path.is_absolute()).then_some((path, path.as_path()));
            }
            match path.strip_prefix(root) {
                Ok(rest) if !rest.as_os_str().is_empty() => Some((path, rest)),
                _ => None,
            }
        })
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

impl FileSystem for MemFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .get(&clean(path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn files_in(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = clean(dir);
        let mut found_dir = false;
        let mut files = Vec::new();
        for (path, rest) in self.entries_below(&dir) {
            found_dir = true;
            if rest.components().count() == 1 {
                files.push(path.clone());
            }
        }
        if !found_dir {
            return Err(not_found(&dir));
        }
        Ok(files)
    }

    fn walk(&self, root: &Path, prune: &dyn Fn(&str) -> bool) -> io::Result<Vec<PathBuf>> {
        let root = clean(root);
        let files = self
            .entries_below(&root)
            .filter(|(_, rest)| {
                !rest.parent().is_some_and(|dirs| {
                    dirs.components()
                        .any(|c| prune(&c.as_os_str().to_string_lossy()))
                })
            })
            .map(|(path, _)| path.clone())
            .collect();
        Ok(files)
    }
}

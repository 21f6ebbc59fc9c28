//! The `find` command: which directories read changed outputs of a remote state.

mod changed;
mod matcher;
mod tree;

pub use changed::{ChangedOutputs, resolve_changed_outputs};
pub use matcher::{DirMatches, MatchResult, REMOTE_STATE_ACCESS_PREFIX, find_callers};
pub use tree::{ConfigFile, Directories, Directory};

use std::path::{Path, PathBuf};

use crate::error::TfrstateError;
use crate::fs::FileSystem;
use crate::report::{Change, to_changes};
use crate::scan::find_config_files;
use crate::terraform::{BackendIdentity, find_backend_config};

#[derive(Debug, Clone, Default)]
pub struct Param {
    pub plan_file: Option<PathBuf>,
    /// Root of the scanned tree; reported directories are relative to it
    pub base_dir: PathBuf,
    /// Root module whose backend is the target backend
    pub backend_dir: Option<PathBuf>,
    pub s3_bucket: Option<String>,
    pub s3_key: Option<String>,
    pub gcs_bucket: Option<String>,
    pub gcs_prefix: Option<String>,
    pub outputs: Vec<String>,
    pub pwd: PathBuf,
}

/// Where the target backend comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSource {
    Explicit(BackendIdentity),
    Declared(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOutcome {
    /// The plan changes no pre-existing output
    NoOutputChanges,
    /// No S3 or GCS backend is declared in the backend directory
    NoBackend,
    Changes(Vec<Change>),
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub fn validate(param: &Param) -> Result<BackendSource, TfrstateError> {
    let s3_bucket = non_empty(&param.s3_bucket);
    let s3_key = non_empty(&param.s3_key);
    let gcs_bucket = non_empty(&param.gcs_bucket);
    let gcs_prefix = non_empty(&param.gcs_prefix);
    let backend_dir = param
        .backend_dir
        .as_ref()
        .filter(|d| !d.as_os_str().is_empty());

    if s3_bucket.is_some() && gcs_bucket.is_some() {
        return Err(TfrstateError::InvalidParam(
            "s3-bucket and gcs-bucket can't be used at the same time".to_string(),
        ));
    }
    if s3_key.is_some() && s3_bucket.is_none() {
        return Err(TfrstateError::InvalidParam(
            "s3-key requires s3-bucket".to_string(),
        ));
    }
    if gcs_prefix.is_some() && gcs_bucket.is_none() {
        return Err(TfrstateError::InvalidParam(
            "gcs-prefix requires gcs-bucket".to_string(),
        ));
    }

    match (backend_dir, s3_bucket, gcs_bucket) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(TfrstateError::InvalidParam(
            "backend-dir can't be used with s3-bucket or gcs-bucket".to_string(),
        )),
        (Some(dir), None, None) => Ok(BackendSource::Declared(dir.clone())),
        (None, Some(bucket), _) => Ok(BackendSource::Explicit(BackendIdentity::s3(
            bucket,
            s3_key.unwrap_or_default(),
        ))),
        (None, None, Some(bucket)) => Ok(BackendSource::Explicit(BackendIdentity::gcs(
            bucket,
            gcs_prefix.unwrap_or_default(),
        ))),
        (None, None, None) => Err(TfrstateError::InvalidParam(
            "backend-dir, s3-bucket or gcs-bucket must be set".to_string(),
        )),
    }
}

/// Find the directories and files that read changed outputs of the target backend's state.
pub fn run(fs: &dyn FileSystem, param: &Param) -> Result<FindOutcome, TfrstateError> {
    let source = validate(param)?;

    let Some(changed) = resolve_changed_outputs(fs, param.plan_file.as_deref(), &param.outputs)?
    else {
        tracing::info!("no output changes");
        return Ok(FindOutcome::NoOutputChanges);
    };

    let target = match source {
        BackendSource::Explicit(identity) => Some(identity),
        BackendSource::Declared(dir) => find_backend_config(fs, &dir)?,
    };
    let Some(target) = target else {
        tracing::info!("no backend configuration");
        return Ok(FindOutcome::NoBackend);
    };
    target.log();

    let base_dir = if param.base_dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        param.base_dir.as_path()
    };
    let candidates = find_config_files(fs, base_dir)?;
    let mut dirs = Directories::collect(fs, candidates)?;
    tracing::debug!(
        num_of_dirs = dirs.len(),
        "directories mentioning terraform_remote_state"
    );
    dirs.extract_remote_states(&target)?;

    let matches = find_callers(&dirs, &changed);
    let changes = to_changes(&param.pwd, base_dir, &matches)?;
    Ok(FindOutcome::Changes(changes))
}

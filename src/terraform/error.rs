use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading Terraform configuration or plan documents.
///
/// Every variant carries the file it came from so the message is actionable on its own.
#[derive(Debug, Error)]
pub enum TerraformError {
    /// The file could not be parsed as HCL or as Terraform JSON
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// An attribute expression could not be evaluated to a literal
    #[error("failed to evaluate attribute '{attribute}' in {}: {message}", path.display())]
    Evaluate {
        path: PathBuf,
        attribute: String,
        message: String,
    },

    #[error("attribute '{attribute}' in {} must be a string", path.display())]
    NotAString { path: PathBuf, attribute: String },

    #[error("attribute '{attribute}' in {} must be an object", path.display())]
    NotAnObject { path: PathBuf, attribute: String },

    /// The plan file is not a valid `terraform show -json` document
    #[error("failed to read plan file {}: {source}", path.display())]
    PlanFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TerraformError {
    pub(crate) fn parse(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        TerraformError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

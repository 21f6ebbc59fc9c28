use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TfrstateError {
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("unsupported output format: '{0}' (expected 'json' or 'markdown')")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Terraform(#[from] crate::terraform::TerraformError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report error: {0}")]
    Report(String),

    #[error("failed to encode the result as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TfrstateError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| TfrstateError::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_param_display() {
        let err = TfrstateError::InvalidParam("s3-key requires s3-bucket".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: s3-key requires s3-bucket"
        );
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = TfrstateError::UnsupportedFormat("yaml".to_string());
        assert!(err.to_string().contains("'yaml'"));
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = TfrstateError::io("net/main.tf")(io_err);
        assert!(matches!(err, TfrstateError::Io { .. }));
        assert_eq!(err.to_string(), "failed to read net/main.tf: file not found");
    }

    #[test]
    fn test_terraform_error_from_conversion() {
        let tf_err = crate::terraform::TerraformError::NotAString {
            path: PathBuf::from("backend.tf"),
            attribute: "bucket".to_string(),
        };
        let err: TfrstateError = tf_err.into();
        assert!(matches!(err, TfrstateError::Terraform(_)));
        assert!(err.to_string().contains("must be a string"));
    }
}

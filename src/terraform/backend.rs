//! Backend identity: where a Terraform state lives.
//!
//! Backends are declared as
//!
//! ```hcl
//! terraform {
//!   backend "s3" {
//!     bucket = "terraform-state-prod"
//!     key    = "network/terraform.tfstate"
//!   }
//! }
//! ```
//!
//! or, in `*.tf.json`, as `{"terraform": {"backend": {"s3": {...}}}}`.

use std::fmt;
use std::path::Path;

use hcl::Body;
use serde_json::{Map, Value};

use super::TerraformError;
use super::literal::{attribute, evaluate_string, parse_body};
use crate::error::TfrstateError;
use crate::fs::FileSystem;
use crate::scan::ConfigFormat;

/// Cheap textual pre-filter for files that may declare a backend.
const BACKEND_KEYWORD: &str = "backend";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    S3,
    Gcs,
}

impl BackendKind {
    pub fn from_label(label: &str) -> Option<Self> {
        HANDLERS
            .iter()
            .find(|(l, _, _)| *l == label)
            .map(|(_, kind, _)| *kind)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::S3 => "s3",
            BackendKind::Gcs => "gcs",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Address of a remote state. Two identities are the same state only if all four fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendIdentity {
    pub kind: BackendKind,
    pub bucket: String,
    pub key: String,
    pub prefix: String,
}

impl BackendIdentity {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            bucket: String::new(),
            key: String::new(),
            prefix: String::new(),
        }
    }

    pub fn s3(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Self::new(BackendKind::S3)
        }
    }

    pub fn gcs(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            ..Self::new(BackendKind::Gcs)
        }
    }

    pub fn log(&self) {
        tracing::debug!(
            kind = %self.kind,
            bucket = %self.bucket,
            key = %self.key,
            prefix = %self.prefix,
            "backend configuration"
        );
    }
}

/// String attributes of a backend body, whichever syntax it came from.
pub(crate) trait AttributeSource {
    fn string_attr(&self, name: &str) -> Result<Option<String>, TerraformError>;
}

pub(crate) struct HclAttributes<'a> {
    pub body: &'a Body,
    pub path: &'a Path,
}

impl AttributeSource for HclAttributes<'_> {
    fn string_attr(&self, name: &str) -> Result<Option<String>, TerraformError> {
        attribute(self.body, name)
            .map(|expr| evaluate_string(expr, name, self.path))
            .transpose()
    }
}

pub(crate) struct JsonAttributes<'a> {
    pub object: &'a Map<String, Value>,
    pub path: &'a Path,
}

impl AttributeSource for JsonAttributes<'_> {
    fn string_attr(&self, name: &str) -> Result<Option<String>, TerraformError> {
        match self.object.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(TerraformError::NotAString {
                path: self.path.to_path_buf(),
                attribute: name.to_string(),
            }),
        }
    }
}

type HandleBackend = fn(&dyn AttributeSource) -> Result<BackendIdentity, TerraformError>;

/// Backend label -> kind and attribute extraction. Unlisted labels are not tracked.
const HANDLERS: &[(&str, BackendKind, HandleBackend)] = &[
    ("s3", BackendKind::S3, handle_s3_backend),
    ("gcs", BackendKind::Gcs, handle_gcs_backend),
];

fn handler_for(label: &str) -> Option<HandleBackend> {
    HANDLERS
        .iter()
        .find(|(l, _, _)| *l == label)
        .map(|(_, _, handler)| *handler)
}

fn handle_s3_backend(attrs: &dyn AttributeSource) -> Result<BackendIdentity, TerraformError> {
    let mut identity = BackendIdentity::new(BackendKind::S3);
    if let Some(key) = attrs.string_attr("key")? {
        identity.key = key;
    }
    if let Some(bucket) = attrs.string_attr("bucket")? {
        identity.bucket = bucket;
    }
    Ok(identity)
}

fn handle_gcs_backend(attrs: &dyn AttributeSource) -> Result<BackendIdentity, TerraformError> {
    let mut identity = BackendIdentity::new(BackendKind::Gcs);
    if let Some(prefix) = attrs.string_attr("prefix")? {
        identity.prefix = prefix;
    }
    if let Some(bucket) = attrs.string_attr("bucket")? {
        identity.bucket = bucket;
    }
    Ok(identity)
}

/// Find the backend declared in a parsed `*.tf` body.
///
/// Only the first `backend` block of each `terraform` block is considered; a backend of
/// an untracked kind yields `None` for that block.
pub fn backend_from_body(
    body: &Body,
    path: &Path,
) -> Result<Option<BackendIdentity>, TerraformError> {
    for block in body.blocks().filter(|b| b.identifier() == "terraform") {
        let Some(backend) = block.body().blocks().find(|b| b.identifier() == "backend") else {
            continue;
        };
        let [label] = backend.labels() else {
            continue;
        };
        let Some(handler) = handler_for(label.as_str()) else {
            tracing::debug!(backend = label.as_str(), "untracked backend type");
            continue;
        };
        let attrs = HclAttributes {
            body: backend.body(),
            path,
        };
        return handler(&attrs).map(Some);
    }
    Ok(None)
}

/// Find the backend declared in a `*.tf.json` document.
pub fn backend_from_json(
    doc: &Value,
    path: &Path,
) -> Result<Option<BackendIdentity>, TerraformError> {
    let Some(backends) = doc
        .get("terraform")
        .and_then(|t| t.get("backend"))
        .and_then(Value::as_object)
    else {
        return Ok(None);
    };
    for (label, _, handler) in HANDLERS {
        let Some(value) = backends.get(*label) else {
            continue;
        };
        let object = value.as_object().ok_or_else(|| TerraformError::NotAnObject {
            path: path.to_path_buf(),
            attribute: format!("terraform.backend.{label}"),
        })?;
        return handler(&JsonAttributes { object, path }).map(Some);
    }
    Ok(None)
}

/// Resolve the backend declared by the root module in `dir`.
///
/// `*.tf` files are searched first; `*.tf.json` files only when no `*.tf` file declares a
/// backend. Files that fail to parse are skipped with a warning, but a backend whose
/// attributes are not literal strings is an error.
#[tracing::instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
pub fn find_backend_config(
    fs: &dyn FileSystem,
    dir: &Path,
) -> Result<Option<BackendIdentity>, TfrstateError> {
    let files = fs.files_in(dir).map_err(TfrstateError::io(dir))?;

    for format in [ConfigFormat::Native, ConfigFormat::Json] {
        for path in files
            .iter()
            .filter(|p| ConfigFormat::from_path(p) == Some(format))
        {
            let bytes = fs.read(path).map_err(TfrstateError::io(path))?;
            let text = String::from_utf8_lossy(&bytes);
            if !text.contains(BACKEND_KEYWORD) {
                continue;
            }
            let found = match format {
                ConfigFormat::Native => match parse_body(&text, path) {
                    Ok(body) => backend_from_body(&body, path)?,
                    Err(err) => {
                        tracing::warn!(
                            file = %path.display(),
                            error = %err,
                            "skip a file that can't be parsed"
                        );
                        continue;
                    }
                },
                ConfigFormat::Json => match serde_json::from_slice::<Value>(&bytes) {
                    Ok(doc) => backend_from_json(&doc, path)?,
                    Err(err) => {
                        tracing::warn!(
                            file = %path.display(),
                            error = %err,
                            "skip a file that can't be parsed"
                        );
                        continue;
                    }
                },
            };
            if let Some(identity) = found {
                tracing::debug!(file = %path.display(), "backend configuration is found");
                return Ok(Some(identity));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;
    use serde_json::json;

    fn parse(src: &str) -> Body {
        parse_body(src, Path::new("backend.tf")).unwrap()
    }

    #[test]
    fn test_identity_equality_is_reflexive() {
        let id = BackendIdentity::s3("b1", "k1");
        assert_eq!(id, id.clone());
    }

    #[test]
    fn test_identity_equality_requires_prefix() {
        let a = BackendIdentity::gcs("b1", "state/a");
        let mut b = a.clone();
        b.prefix = "state/b".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_identity_equality_requires_kind() {
        let s3 = BackendIdentity::s3("b1", "");
        let gcs = BackendIdentity::gcs("b1", "");
        assert_ne!(s3, gcs);
    }

    #[test]
    fn test_backend_kind_labels() {
        assert_eq!(BackendKind::from_label("s3"), Some(BackendKind::S3));
        assert_eq!(BackendKind::from_label("gcs"), Some(BackendKind::Gcs));
        assert_eq!(BackendKind::from_label("local"), None);
        assert_eq!(BackendKind::Gcs.to_string(), "gcs");
    }

    #[test]
    fn test_backend_from_body_s3() {
        let body = parse(
            r#"
terraform {
  required_version = ">= 1.0"
  backend "s3" {
    bucket = "terraform-state-prod"
    key    = "network/terraform.tfstate"
    region = "us-east-1"
  }
}
"#,
        );
        let identity = backend_from_body(&body, Path::new("backend.tf")).unwrap();
        assert_eq!(
            identity,
            Some(BackendIdentity::s3("terraform-state-prod", "network/terraform.tfstate"))
        );
    }

    #[test]
    fn test_backend_from_body_gcs() {
        let body = parse(
            r#"
terraform {
  backend "gcs" {
    bucket = "tf-state-prod"
    prefix = "terraform/state"
  }
}
"#,
        );
        let identity = backend_from_body(&body, Path::new("backend.tf")).unwrap();
        assert_eq!(
            identity,
            Some(BackendIdentity::gcs("tf-state-prod", "terraform/state"))
        );
    }

    #[test]
    fn test_backend_from_body_untracked_kind() {
        let body = parse(r#"
terraform {
  backend "local" {
    path = "x.tfstate"
  }
}
"#);
        assert_eq!(backend_from_body(&body, Path::new("backend.tf")).unwrap(), None);
    }

    #[test]
    fn test_backend_from_body_variable_is_error() {
        let body = parse(r#"
terraform {
  backend "s3" {
    bucket = var.bucket
  }
}
"#);
        let err = backend_from_body(&body, Path::new("backend.tf")).unwrap_err();
        assert!(matches!(err, TerraformError::Evaluate { .. }));
    }

    #[test]
    fn test_backend_from_json() {
        let doc = json!({"terraform": {"backend": {"gcs": {"bucket": "b", "prefix": "p"}}}});
        let identity = backend_from_json(&doc, Path::new("backend.tf.json")).unwrap();
        assert_eq!(identity, Some(BackendIdentity::gcs("b", "p")));
    }

    #[test]
    fn test_backend_from_json_without_backend() {
        let doc = json!({"terraform": {"required_version": ">= 1.0"}});
        assert_eq!(backend_from_json(&doc, Path::new("main.tf.json")).unwrap(), None);
    }

    #[test]
    fn test_backend_from_json_non_string_bucket() {
        let doc = json!({"terraform": {"backend": {"s3": {"bucket": 1, "key": "k"}}}});
        let err = backend_from_json(&doc, Path::new("backend.tf.json")).unwrap_err();
        assert!(matches!(err, TerraformError::NotAString { .. }));
    }

    #[test]
    fn test_find_backend_config_skips_unparsable_files() {
        let fs = MemFs::new()
            .with_file("root/a.tf", "backend = {")
            .with_file(
                "root/b.tf",
                r#"
terraform {
  backend "s3" {
    bucket = "b1"
    key = "k1"
  }
}
"#,
            );
        let identity = find_backend_config(&fs, Path::new("root")).unwrap();
        assert_eq!(identity, Some(BackendIdentity::s3("b1", "k1")));
    }

    #[test]
    fn test_find_backend_config_prefers_native_files() {
        let fs = MemFs::new()
            .with_file(
                "root/a.tf.json",
                r#"{"terraform": {"backend": {"s3": {"bucket": "json", "key": "k"}}}}"#,
            )
            .with_file(
                "root/b.tf",
                r#"
terraform {
  backend "s3" {
    bucket = "native"
    key = "k"
  }
}
"#,
            );
        let identity = find_backend_config(&fs, Path::new("root")).unwrap();
        assert_eq!(identity, Some(BackendIdentity::s3("native", "k")));
    }

    #[test]
    fn test_find_backend_config_falls_back_to_json() {
        let fs = MemFs::new()
            .with_file("root/main.tf", r#"resource "null_resource" "x" {}"#)
            .with_file(
                "root/backend.tf.json",
                r#"{"terraform": {"backend": {"s3": {"bucket": "json", "key": "k"}}}}"#,
            );
        let identity = find_backend_config(&fs, Path::new("root")).unwrap();
        assert_eq!(identity, Some(BackendIdentity::s3("json", "k")));
    }

    #[test]
    fn test_find_backend_config_skips_invalid_json() {
        let fs = MemFs::new()
            .with_file("root/a.tf.json", r#"{"terraform": {"backend": "#)
            .with_file(
                "root/b.tf.json",
                r#"{"terraform": {"backend": {"gcs": {"bucket": "b1", "prefix": "net"}}}}"#,
            );
        let identity = find_backend_config(&fs, Path::new("root")).unwrap();
        assert_eq!(identity, Some(BackendIdentity::gcs("b1", "net")));
    }

    #[test]
    fn test_find_backend_config_skips_untracked_kind() {
        let fs = MemFs::new()
            .with_file(
                "root/a.tf",
                r#"
terraform {
  backend "local" {
    path = "x"
  }
}
"#,
            )
            .with_file(
                "root/b.tf",
                r#"
terraform {
  backend "s3" {
    bucket = "b1"
    key = "k1"
  }
}
"#,
            );
        let identity = find_backend_config(&fs, Path::new("root")).unwrap();
        assert_eq!(identity, Some(BackendIdentity::s3("b1", "k1")));
    }

    #[test]
    fn test_find_backend_config_variable_attribute_is_error() {
        let fs = MemFs::new()
            .with_file(
                "root/a.tf",
                r#"
terraform {
  backend "s3" {
    bucket = var.x
    key = "k1"
  }
}
"#,
            )
            .with_file(
                "root/b.tf",
                r#"
terraform {
  backend "s3" {
    bucket = "b1"
    key = "k1"
  }
}
"#,
            );
        let err = find_backend_config(&fs, Path::new("root")).unwrap_err();
        assert!(matches!(
            err,
            TfrstateError::Terraform(TerraformError::Evaluate { ref attribute, .. })
                if attribute == "bucket"
        ));
        assert!(err.to_string().contains("root/a.tf"));
    }

    #[test]
    fn test_find_backend_config_none() {
        let fs = MemFs::new().with_file("root/main.tf", "locals {}");
        assert_eq!(find_backend_config(&fs, Path::new("root")).unwrap(), None);
    }

    #[test]
    fn test_find_backend_config_missing_dir() {
        let fs = MemFs::new();
        let err = find_backend_config(&fs, Path::new("root")).unwrap_err();
        assert!(matches!(err, TfrstateError::Io { .. }));
    }
}

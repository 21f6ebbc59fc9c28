//! `terraform_remote_state` data sources.
//!
//! ```hcl
//! data "terraform_remote_state" "vpc" {
//!   backend = "s3"
//!   config = {
//!     bucket = "terraform-state-prod"
//!     key    = "network/terraform.tfstate"
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use hcl::expr::ObjectKey;
use hcl::{Block, Expression, Value};
use serde_json::Value as JsonValue;

use super::TerraformError;
use super::backend::{AttributeSource, BackendIdentity, BackendKind, JsonAttributes};
use super::literal::{attribute, evaluate, evaluate_string, parse_body};

pub const REMOTE_STATE_TYPE: &str = "terraform_remote_state";

/// Keys of a data source's `config` that make up its backend identity.
const CONFIG_KEYS: [&str; 3] = ["bucket", "key", "prefix"];

/// A `terraform_remote_state` data source whose backend is the target backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStateRef {
    pub name: String,
    pub file: PathBuf,
}

/// Extract the data source in a `*.tf` file that reads the `target` state.
///
/// At most one reference is returned per file.
#[tracing::instrument(level = "debug", skip_all, fields(file = %path.display()))]
pub fn extract_remote_states(
    src: &str,
    path: &Path,
    target: &BackendIdentity,
) -> Result<Vec<RemoteStateRef>, TerraformError> {
    let body = parse_body(src, path)?;
    let mut states = Vec::new();
    for block in body.blocks() {
        let Some((name, identity)) = handle_data_block(block, path)? else {
            continue;
        };
        if identity != *target {
            tracing::debug!(name = %name, "backend doesn't match");
            continue;
        }
        states.push(RemoteStateRef {
            name: name.to_string(),
            file: path.to_path_buf(),
        });
        break;
    }
    Ok(states)
}

fn handle_data_block<'a>(
    block: &'a Block,
    path: &Path,
) -> Result<Option<(&'a str, BackendIdentity)>, TerraformError> {
    if block.identifier() != "data" {
        return Ok(None);
    }
    let [data_type, name] = block.labels() else {
        return Ok(None);
    };
    if data_type.as_str() != REMOTE_STATE_TYPE {
        return Ok(None);
    }
    let name = name.as_str();
    tracing::debug!(name = %name, "terraform_remote_state is found");

    let body = block.body();
    let Some(backend) = attribute(body, "backend") else {
        tracing::warn!(name = %name, "backend attribute is not found");
        return Ok(None);
    };
    let backend = evaluate_string(backend, "backend", path)?;
    let Some(kind) = BackendKind::from_label(&backend) else {
        tracing::debug!(name = %name, backend = %backend, "untracked backend type");
        return Ok(None);
    };
    let Some(config) = attribute(body, "config") else {
        tracing::warn!(name = %name, "config attribute is not found");
        return Ok(None);
    };

    let mut identity = BackendIdentity::new(kind);
    for (key, value) in config_entries(config, path)? {
        set_config_field(&mut identity, &key, value);
    }
    Ok(Some((name, identity)))
}

/// Evaluate the identity-relevant entries of a `config` expression.
///
/// An object literal is evaluated entry by entry so unrelated entries such as
/// `region = var.region` don't need to resolve.
fn config_entries(
    config: &Expression,
    path: &Path,
) -> Result<Vec<(String, String)>, TerraformError> {
    let mut entries = Vec::new();
    if let Expression::Object(object) = config {
        for (key, value) in object.iter() {
            let Some(key) = object_key_name(key, path)? else {
                continue;
            };
            if CONFIG_KEYS.contains(&key.as_str()) {
                let value = evaluate_string(value, &format!("config.{key}"), path)?;
                entries.push((key, value));
            }
        }
        return Ok(entries);
    }

    let Value::Object(object) = evaluate(config, "config", path)? else {
        return Err(TerraformError::NotAnObject {
            path: path.to_path_buf(),
            attribute: "config".to_string(),
        });
    };
    for key in CONFIG_KEYS {
        match object.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::String(value)) => entries.push((key.to_string(), value.clone())),
            Some(_) => {
                return Err(TerraformError::NotAString {
                    path: path.to_path_buf(),
                    attribute: format!("config.{key}"),
                });
            }
        }
    }
    Ok(entries)
}

fn object_key_name(key: &ObjectKey, path: &Path) -> Result<Option<String>, TerraformError> {
    match key {
        ObjectKey::Identifier(ident) => Ok(Some(ident.as_str().to_string())),
        ObjectKey::Expression(Expression::String(s)) => Ok(Some(s.clone())),
        ObjectKey::Expression(expr) => match evaluate(expr, "config", path)? {
            Value::String(s) => Ok(Some(s)),
            _ => Ok(None),
        },
        #[allow(unreachable_patterns)]
        _ => Ok(None),
    }
}

fn set_config_field(identity: &mut BackendIdentity, key: &str, value: String) {
    match key {
        "bucket" => identity.bucket = value,
        "key" => identity.key = value,
        "prefix" => identity.prefix = value,
        _ => {}
    }
}

/// Extract the data source in a `*.tf.json` file that reads the `target` state.
///
/// Data sources are visited in name order and, like `*.tf` files, at most one
/// reference is returned per file.
#[tracing::instrument(level = "debug", skip_all, fields(file = %path.display()))]
pub fn extract_remote_states_from_json(
    src: &[u8],
    path: &Path,
    target: &BackendIdentity,
) -> Result<Vec<RemoteStateRef>, TerraformError> {
    let doc: JsonValue = serde_json::from_slice(src).map_err(|e| TerraformError::parse(path, e))?;
    let Some(sources) = doc
        .get("data")
        .and_then(|d| d.get(REMOTE_STATE_TYPE))
        .and_then(JsonValue::as_object)
    else {
        return Ok(Vec::new());
    };

    let mut states = Vec::new();
    for (name, decl) in sources {
        let Some(decl) = decl.as_object() else {
            tracing::warn!(name = %name, "terraform_remote_state is not an object");
            continue;
        };
        let decl_attrs = JsonAttributes { object: decl, path };
        let Some(backend) = decl_attrs.string_attr("backend")? else {
            tracing::warn!(name = %name, "backend attribute is not found");
            continue;
        };
        let Some(kind) = BackendKind::from_label(&backend) else {
            tracing::debug!(name = %name, backend = %backend, "untracked backend type");
            continue;
        };
        let config = match decl.get("config") {
            None | Some(JsonValue::Null) => {
                tracing::warn!(name = %name, "config attribute is not found");
                continue;
            }
            Some(JsonValue::Object(config)) => config,
            Some(_) => {
                return Err(TerraformError::NotAnObject {
                    path: path.to_path_buf(),
                    attribute: "config".to_string(),
                });
            }
        };

        let config_attrs = JsonAttributes {
            object: config,
            path,
        };
        let mut identity = BackendIdentity::new(kind);
        for key in CONFIG_KEYS {
            if let Some(value) = config_attrs.string_attr(key)? {
                set_config_field(&mut identity, key, value);
            }
        }
        if identity != *target {
            tracing::debug!(name = %name, "backend doesn't match");
            continue;
        }
        states.push(RemoteStateRef {
            name: name.clone(),
            file: path.to_path_buf(),
        });
        break;
    }
    Ok(states)
}

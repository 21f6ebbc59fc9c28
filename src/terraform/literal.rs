//! Literal evaluation of HCL expressions.
//!
//! Expressions are evaluated against an empty context: variables, locals and
//! function calls are errors, only literals (and templates of literals) resolve.

use std::path::Path;

use hcl::eval::{Context, Evaluate};
use hcl::{Body, Expression, Value};

use super::TerraformError;

pub(crate) fn parse_body(src: &str, path: &Path) -> Result<Body, TerraformError> {
    hcl::parse(src).map_err(|e| TerraformError::parse(path, e))
}

pub(crate) fn evaluate(
    expr: &Expression,
    attribute: &str,
    path: &Path,
) -> Result<Value, TerraformError> {
    expr.evaluate(&Context::new())
        .map_err(|e| TerraformError::Evaluate {
            path: path.to_path_buf(),
            attribute: attribute.to_string(),
            message: e.to_string(),
        })
}

pub(crate) fn evaluate_string(
    expr: &Expression,
    attribute: &str,
    path: &Path,
) -> Result<String, TerraformError> {
    match evaluate(expr, attribute, path)? {
        Value::String(s) => Ok(s),
        _ => Err(TerraformError::NotAString {
            path: path.to_path_buf(),
            attribute: attribute.to_string(),
        }),
    }
}

/// Looks up a top-level attribute of `body` by name.
pub(crate) fn attribute<'a>(body: &'a Body, name: &str) -> Option<&'a Expression> {
    body.attributes()
        .find(|attr| attr.key() == name)
        .map(|attr| attr.expr())
}

//! Output changes of a `terraform show -json` plan document.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::TerraformError;

#[derive(Debug, Default, Deserialize)]
pub struct PlanFile {
    #[serde(default)]
    pub output_changes: BTreeMap<String, OutputChange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputChange {
    #[serde(default)]
    pub actions: Vec<String>,
}

impl OutputChange {
    /// A newly created output has no prior value, so nothing that reads it can be affected.
    pub fn is_create_only(&self) -> bool {
        matches!(self.actions.as_slice(), [action] if action == "create")
    }
}

impl PlanFile {
    pub fn from_slice(src: &[u8], path: &Path) -> Result<Self, TerraformError> {
        serde_json::from_slice(src).map_err(|source| TerraformError::PlanFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Names of changed outputs, sorted, excluding outputs that are only created.
    pub fn changed_outputs(&self) -> Vec<String> {
        self.output_changes
            .iter()
            .filter(|(_, change)| !change.is_create_only())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

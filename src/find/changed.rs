use std::collections::BTreeSet;
use std::path::Path;

use crate::error::TfrstateError;
use crate::fs::FileSystem;
use crate::terraform::PlanFile;

/// Output names whose consumers should be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangedOutputs {
    /// Any use of a matching data source counts, whatever output it reads.
    Unfiltered,
    Names(BTreeSet<String>),
}

impl ChangedOutputs {
    /// An empty list of names means "don't filter by output name".
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            ChangedOutputs::Unfiltered
        } else {
            ChangedOutputs::Names(names)
        }
    }
}

/// Resolve the changed outputs from a plan file, or from explicit names when no plan is given.
///
/// Returns `None` when the plan changes no output that existed before.
pub fn resolve_changed_outputs(
    fs: &dyn FileSystem,
    plan_file: Option<&Path>,
    outputs: &[String],
) -> Result<Option<ChangedOutputs>, TfrstateError> {
    let Some(plan_path) = plan_file else {
        return Ok(Some(ChangedOutputs::from_names(outputs.iter().cloned())));
    };
    if !outputs.is_empty() {
        tracing::warn!("--output is ignored because --plan-json is given");
    }

    let bytes = fs.read(plan_path).map_err(TfrstateError::io(plan_path))?;
    let names = PlanFile::from_slice(&bytes, plan_path)?.changed_outputs();
    if names.is_empty() {
        return Ok(None);
    }
    Ok(Some(ChangedOutputs::Names(names.into_iter().collect())))
}

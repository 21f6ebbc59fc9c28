//! Terraform configuration knowledge: backend declarations, `terraform_remote_state`
//! data sources and plan documents.

pub mod backend;
pub mod plan;
pub mod remote_state;

mod error;
mod literal;

pub use backend::{BackendIdentity, BackendKind, find_backend_config};
pub use error::TerraformError;
pub use plan::PlanFile;
pub use remote_state::{
    REMOTE_STATE_TYPE, RemoteStateRef, extract_remote_states, extract_remote_states_from_json,
};

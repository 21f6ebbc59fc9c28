//! tfrstate - find where changed Terraform remote state outputs are used
//!
//! A library for resolving a Terraform backend, locating the `terraform_remote_state`
//! data sources that read it, and reporting the files that use its changed outputs.

pub mod error;
pub mod find;
pub mod fs;
pub mod output;
pub mod paths;
pub mod report;
pub mod scan;
pub mod terraform;

pub use error::TfrstateError;
pub use find::{FindOutcome, Param};
pub use fs::{FileSystem, MemFs, OsFs};
pub use output::OutputFormat;
pub use report::{Change, ChangedFile};
pub use terraform::{BackendIdentity, BackendKind};

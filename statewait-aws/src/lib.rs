//! Resource lifecycle orchestration for asynchronously-provisioned AWS objects.
//!
//! Each resource module sequences its create/read/update/delete entry points
//! around the status waits and propagation retries from the `statewait` crate:
//! create → wait for the in-service status, delete → wait for the object to
//! disappear, and for disruptive updates the stop → modify → restart cycle.
//! The host that invokes these entry points owns ordering across resources and
//! supplies the cancellation token; within one entry point the wait blocks the
//! calling task.
//!
//! Remote APIs are reached through per-service capability traits
//! ([`sagemaker::NotebookInstances`], [`s3::BucketPolicies`],
//! [`events::EventArchives`]) implemented for the corresponding AWS SDK
//! clients, so tests substitute scripted fakes. [`ProviderClients`] bundles
//! the concrete clients built from the shared AWS configuration.

mod clients;
mod error;
pub mod events;
pub mod s3;
pub mod sagemaker;
mod sdk;

pub use clients::ProviderClients;
pub use error::{ReconcileError, ReconcileResult};

//! Diagnostics surfaced to the host: which resource, which operation, why.

use std::error::Error as StdError;

use statewait::RetryError;
use thiserror::Error;

pub type ReconcileResult<T> = Result<T, ReconcileError>;

type Source = Box<dyn StdError + Send + Sync + 'static>;

/// A failed reconciliation operation.
///
/// Every error names the resource type, the operation attempted, and the
/// remote handle, then chains the underlying wait/retry/API error as its
/// source, so the host can render a single actionable diagnostic.
#[derive(Error, Debug)]
#[error("{operation} {resource} ({handle}): {source}")]
pub struct ReconcileError {
    resource: &'static str,
    operation: &'static str,
    handle: String,
    source: Source,
}

impl ReconcileError {
    pub fn new(
        resource: &'static str,
        operation: &'static str,
        handle: impl Into<String>,
        source: impl Into<Source>,
    ) -> Self {
        Self {
            resource,
            operation,
            handle: handle.into(),
            source: source.into(),
        }
    }

    pub fn resource(&self) -> &str {
        self.resource
    }

    pub fn operation(&self) -> &str {
        self.operation
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// True when the underlying cause is the remote object being absent.
    /// Hosts use this to drop a vanished resource from state instead of
    /// failing the run.
    pub fn is_not_found(&self) -> bool {
        if let Some(err) = self.source.downcast_ref::<statewait::RemoteError>() {
            return err.is_not_found();
        }
        if let Some(err) = self.source.downcast_ref::<RetryError>() {
            return matches!(err, RetryError::Remote(statewait::RemoteError::NotFound));
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statewait::RemoteError;

    #[test]
    fn display_names_operation_resource_and_handle() {
        let err = ReconcileError::new(
            "SageMaker Notebook Instance",
            "creating",
            "my-notebook",
            RemoteError::Api("boom".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "creating SageMaker Notebook Instance (my-notebook): remote API error: boom"
        );
    }

    #[test]
    fn accessors_expose_the_failing_call() {
        let err = ReconcileError::new(
            "SageMaker Notebook Instance",
            "updating",
            "my-notebook",
            RemoteError::Api("boom".to_string()),
        );
        assert_eq!(err.resource(), "SageMaker Notebook Instance");
        assert_eq!(err.operation(), "updating");
        assert_eq!(err.handle(), "my-notebook");
    }

    #[test]
    fn not_found_cause_is_detectable() {
        let err = ReconcileError::new(
            "S3 Bucket Policy",
            "reading",
            "my-bucket",
            RemoteError::NotFound,
        );
        assert!(err.is_not_found());

        let err = ReconcileError::new(
            "S3 Bucket Policy",
            "reading",
            "my-bucket",
            RemoteError::Api("boom".to_string()),
        );
        assert!(!err.is_not_found());
    }
}

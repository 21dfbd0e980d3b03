//! Lifecycle orchestration for S3 bucket policies.
//!
//! Bucket policies have no lifecycle status to poll; the asynchronous part is
//! propagation. Put retries through the transient post-creation errors, a new
//! policy is confirmed visible before create returns, and delete waits until
//! the policy stops being visible.

use std::time::Duration;

use statewait::{retry_until_not_found, retry_when_not_found, retry_when_retryable, RemoteError};
use tokio_util::sync::CancellationToken;

use super::BucketPolicies;
use crate::error::{ReconcileError, ReconcileResult};

const RESOURCE: &str = "S3 Bucket Policy";

const PROPAGATION_TIMEOUT: Duration = Duration::from_secs(60);

fn err(
    operation: &'static str,
    handle: &str,
    source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> ReconcileError {
    ReconcileError::new(RESOURCE, operation, handle, source)
}

/// Re-serialize a policy document into canonical compact JSON so remote and
/// declared documents compare equal regardless of whitespace or key order
/// artifacts introduced by either side.
pub fn normalize_policy(policy: &str) -> Result<String, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(policy)?;
    serde_json::to_string(&value)
}

/// Put the policy on the bucket. For a newly-declared policy (`is_new`), the
/// follow-up read is retried until the document has propagated. Returns the
/// normalized document as written.
pub async fn put(
    api: &impl BucketPolicies,
    bucket: &str,
    policy: &str,
    is_new: bool,
    cancel: &CancellationToken,
) -> ReconcileResult<String> {
    let policy = normalize_policy(policy).map_err(|e| err("putting", bucket, e))?;

    retry_when_retryable(PROPAGATION_TIMEOUT, cancel, || api.put(bucket, &policy))
        .await
        .map_err(|e| err("putting", bucket, e))?;

    if is_new {
        retry_when_not_found(PROPAGATION_TIMEOUT, cancel, || api.get(bucket))
            .await
            .map_err(|e| err("putting", bucket, e))?;
    }

    Ok(policy)
}

/// Fetch the current policy document; `Ok(None)` when the bucket has no policy
/// (or no longer exists), so the host can drop it from state.
pub async fn read(api: &impl BucketPolicies, bucket: &str) -> ReconcileResult<Option<String>> {
    match api.get(bucket).await {
        Ok(policy) => {
            let policy = normalize_policy(&policy).map_err(|e| err("reading", bucket, e))?;
            Ok(Some(policy))
        }
        Err(RemoteError::NotFound) => {
            log::warn!("{RESOURCE} ({bucket}) not found, treating as deleted");
            Ok(None)
        }
        Err(e) => Err(err("reading", bucket, e)),
    }
}

/// Delete the policy and wait for the delete to propagate. A missing bucket
/// means there is nothing left to delete.
pub async fn delete(
    api: &impl BucketPolicies,
    bucket: &str,
    cancel: &CancellationToken,
) -> ReconcileResult<()> {
    log::debug!("deleting {RESOURCE}: {bucket}");
    match api.delete(bucket).await {
        Ok(()) | Err(RemoteError::NotFound) => {}
        Err(e) => return Err(err("deleting", bucket, e)),
    }

    retry_until_not_found(PROPAGATION_TIMEOUT, cancel, || api.get(bucket))
        .await
        .map_err(|e| err("deleting", bucket, e))
}

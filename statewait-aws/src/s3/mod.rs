//! S3 service surface: the bucket-policy capability trait and its AWS SDK
//! implementation.

pub mod bucket_policy;

use async_trait::async_trait;
use statewait::RemoteError;

use crate::sdk::classify;

const NOT_FOUND_MARKERS: &[&str] = &["NoSuchBucket", "NoSuchBucketPolicy"];

/// PutBucketPolicy can transiently fail right after the bucket or the policy's
/// principals were created; both codes clear once IAM propagation catches up.
const PUT_RETRYABLE_MARKERS: &[&str] = &["MalformedPolicy", "NoSuchBucket"];

/// Capability surface of the S3 bucket-policy API. The policy document is an
/// opaque JSON string; normalization happens in the orchestration layer.
#[async_trait]
pub trait BucketPolicies: Send + Sync {
    async fn get(&self, bucket: &str) -> Result<String, RemoteError>;
    async fn put(&self, bucket: &str, policy: &str) -> Result<(), RemoteError>;
    async fn delete(&self, bucket: &str) -> Result<(), RemoteError>;
}

#[async_trait]
impl BucketPolicies for aws_sdk_s3::Client {
    async fn get(&self, bucket: &str) -> Result<String, RemoteError> {
        let output = self
            .get_bucket_policy()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        output.policy().map(str::to_string).ok_or(RemoteError::NotFound)
    }

    async fn put(&self, bucket: &str, policy: &str) -> Result<(), RemoteError> {
        self.put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| classify(e, &[], PUT_RETRYABLE_MARKERS))?;
        Ok(())
    }

    async fn delete(&self, bucket: &str) -> Result<(), RemoteError> {
        self.delete_bucket_policy()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        Ok(())
    }
}

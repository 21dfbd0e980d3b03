//! Concrete service clients bundled into one capability struct.

use aws_config::SdkConfig;

/// The service clients a provider instance holds for its lifetime.
///
/// Built once from the shared AWS configuration and passed by reference into
/// the per-resource entry points. Each field is a concrete typed client, so a
/// reconciliation function states the services it needs in its signature
/// instead of pulling them out of an untyped context bag.
pub struct ProviderClients {
    pub sagemaker: aws_sdk_sagemaker::Client,
    pub s3: aws_sdk_s3::Client,
    pub events: aws_sdk_eventbridge::Client,
}

impl ProviderClients {
    /// Load the default AWS configuration (standard credential provider chain)
    /// and construct all service clients from it.
    pub async fn new() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::from_config(&config)
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            sagemaker: aws_sdk_sagemaker::Client::new(config),
            s3: aws_sdk_s3::Client::new(config),
            events: aws_sdk_eventbridge::Client::new(config),
        }
    }
}

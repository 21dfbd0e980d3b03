//! SageMaker service surface: notebook-instance types, the capability trait,
//! and its AWS SDK implementation.

pub mod notebook_instance;

use async_trait::async_trait;
use statewait::RemoteError;

use crate::sdk::classify;

/// SageMaker reports a missing notebook instance as a `ValidationException`
/// whose message carries `RecordNotFound`.
const NOT_FOUND_MARKERS: &[&str] = &["RecordNotFound", "ResourceNotFound"];

/// Lifecycle status of a notebook instance, as reported by DescribeNotebookInstance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotebookStatus {
    Pending,
    InService,
    Stopping,
    Stopped,
    Failed,
    Deleting,
    Updating,
    /// A status this crate does not recognize; treated as transitional.
    Unknown,
}

impl NotebookStatus {
    fn from_sdk(status: Option<&aws_sdk_sagemaker::types::NotebookInstanceStatus>) -> Self {
        use aws_sdk_sagemaker::types::NotebookInstanceStatus as Sdk;
        match status {
            Some(Sdk::Pending) => Self::Pending,
            Some(Sdk::InService) => Self::InService,
            Some(Sdk::Stopping) => Self::Stopping,
            Some(Sdk::Stopped) => Self::Stopped,
            Some(Sdk::Failed) => Self::Failed,
            Some(Sdk::Deleting) => Self::Deleting,
            Some(Sdk::Updating) => Self::Updating,
            _ => Self::Unknown,
        }
    }
}

/// Fresh snapshot of a remote notebook instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookInstance {
    pub name: String,
    pub arn: Option<String>,
    pub status: NotebookStatus,
    pub failure_reason: Option<String>,
    pub instance_type: Option<String>,
    pub role_arn: Option<String>,
    pub volume_size_gb: Option<i32>,
    pub url: Option<String>,
    pub network_interface_id: Option<String>,
}

/// Declared configuration for creating a notebook instance.
#[derive(Debug, Clone, Default)]
pub struct NotebookConfig {
    pub name: String,
    pub instance_type: String,
    pub role_arn: String,
    pub volume_size_gb: Option<i32>,
    pub subnet_id: Option<String>,
    pub security_group_ids: Vec<String>,
    pub kms_key_id: Option<String>,
    pub lifecycle_config_name: Option<String>,
    pub default_code_repository: Option<String>,
}

/// Change to an optional remote field: leave it, set it, or detach it.
/// UpdateNotebookInstance expresses "detach" through a separate disassociate
/// flag rather than an empty value, so `Option` alone cannot express it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldChange<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

/// Requested changes for an existing notebook instance. `None` means unchanged.
#[derive(Debug, Clone, Default)]
pub struct NotebookUpdate {
    pub name: String,
    pub instance_type: Option<String>,
    pub role_arn: Option<String>,
    pub volume_size_gb: Option<i32>,
    pub lifecycle_config_name: FieldChange<String>,
    pub default_code_repository: FieldChange<String>,
}

/// Capability surface of the SageMaker notebook-instance API.
#[async_trait]
pub trait NotebookInstances: Send + Sync {
    async fn create(&self, config: &NotebookConfig) -> Result<(), RemoteError>;
    /// Fetch the current remote snapshot; `RemoteError::NotFound` when absent.
    async fn describe(&self, name: &str) -> Result<NotebookInstance, RemoteError>;
    async fn update(&self, update: &NotebookUpdate) -> Result<(), RemoteError>;
    async fn delete(&self, name: &str) -> Result<(), RemoteError>;
    async fn start(&self, name: &str) -> Result<(), RemoteError>;
    async fn stop(&self, name: &str) -> Result<(), RemoteError>;
}

#[async_trait]
impl NotebookInstances for aws_sdk_sagemaker::Client {
    async fn create(&self, config: &NotebookConfig) -> Result<(), RemoteError> {
        let mut request = self
            .create_notebook_instance()
            .notebook_instance_name(&config.name)
            .instance_type(aws_sdk_sagemaker::types::InstanceType::from(
                config.instance_type.as_str(),
            ))
            .role_arn(&config.role_arn)
            .set_volume_size_in_gb(config.volume_size_gb)
            .set_subnet_id(config.subnet_id.clone())
            .set_kms_key_id(config.kms_key_id.clone())
            .set_lifecycle_config_name(config.lifecycle_config_name.clone())
            .set_default_code_repository(config.default_code_repository.clone());
        if !config.security_group_ids.is_empty() {
            request = request.set_security_group_ids(Some(config.security_group_ids.clone()));
        }
        request
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        Ok(())
    }

    async fn describe(&self, name: &str) -> Result<NotebookInstance, RemoteError> {
        let output = self
            .describe_notebook_instance()
            .notebook_instance_name(name)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;

        Ok(NotebookInstance {
            name: output
                .notebook_instance_name()
                .unwrap_or(name)
                .to_string(),
            arn: output.notebook_instance_arn().map(str::to_string),
            status: NotebookStatus::from_sdk(output.notebook_instance_status()),
            failure_reason: output.failure_reason().map(str::to_string),
            instance_type: output.instance_type().map(|t| t.as_str().to_string()),
            role_arn: output.role_arn().map(str::to_string),
            volume_size_gb: output.volume_size_in_gb(),
            url: output.url().map(str::to_string),
            network_interface_id: output.network_interface_id().map(str::to_string),
        })
    }

    async fn update(&self, update: &NotebookUpdate) -> Result<(), RemoteError> {
        let mut request = self
            .update_notebook_instance()
            .notebook_instance_name(&update.name)
            .set_role_arn(update.role_arn.clone())
            .set_volume_size_in_gb(update.volume_size_gb);
        if let Some(instance_type) = &update.instance_type {
            request = request.instance_type(aws_sdk_sagemaker::types::InstanceType::from(
                instance_type.as_str(),
            ));
        }
        match &update.lifecycle_config_name {
            FieldChange::Keep => {}
            FieldChange::Set(name) => request = request.lifecycle_config_name(name),
            FieldChange::Clear => request = request.disassociate_lifecycle_config(true),
        }
        match &update.default_code_repository {
            FieldChange::Keep => {}
            FieldChange::Set(repo) => request = request.default_code_repository(repo),
            FieldChange::Clear => {
                request = request.disassociate_default_code_repository(true);
            }
        }
        request
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), RemoteError> {
        self.delete_notebook_instance()
            .notebook_instance_name(name)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<(), RemoteError> {
        self.start_notebook_instance()
            .notebook_instance_name(name)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), RemoteError> {
        self.stop_notebook_instance()
            .notebook_instance_name(name)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        Ok(())
    }
}

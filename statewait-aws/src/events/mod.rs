//! EventBridge service surface: event-archive types, the capability trait,
//! and its AWS SDK implementation.

pub mod archive;

use async_trait::async_trait;
use statewait::RemoteError;

use crate::sdk::classify;

const NOT_FOUND_MARKERS: &[&str] = &["ResourceNotFoundException"];

/// Lifecycle state of an event archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStatus {
    Creating,
    Enabled,
    Disabled,
    Updating,
    CreateFailed,
    UpdateFailed,
    Unknown,
}

impl ArchiveStatus {
    fn from_sdk(state: Option<&aws_sdk_eventbridge::types::ArchiveState>) -> Self {
        use aws_sdk_eventbridge::types::ArchiveState as Sdk;
        match state {
            Some(Sdk::Creating) => Self::Creating,
            Some(Sdk::Enabled) => Self::Enabled,
            Some(Sdk::Disabled) => Self::Disabled,
            Some(Sdk::Updating) => Self::Updating,
            Some(Sdk::CreateFailed) => Self::CreateFailed,
            Some(Sdk::UpdateFailed) => Self::UpdateFailed,
            _ => Self::Unknown,
        }
    }
}

/// Fresh snapshot of a remote event archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventArchive {
    pub name: String,
    pub arn: Option<String>,
    pub status: ArchiveStatus,
    pub state_reason: Option<String>,
    pub event_source_arn: Option<String>,
    pub description: Option<String>,
    pub event_pattern: Option<String>,
    pub retention_days: Option<i32>,
}

/// Declared configuration for creating an archive.
#[derive(Debug, Clone, Default)]
pub struct ArchiveConfig {
    pub name: String,
    pub event_source_arn: String,
    pub description: Option<String>,
    pub event_pattern: Option<String>,
    pub retention_days: Option<i32>,
}

/// Requested changes for an existing archive. The event source cannot change.
#[derive(Debug, Clone, Default)]
pub struct ArchiveUpdate {
    pub name: String,
    pub description: Option<String>,
    pub event_pattern: Option<String>,
    pub retention_days: Option<i32>,
}

/// Capability surface of the EventBridge archive API.
#[async_trait]
pub trait EventArchives: Send + Sync {
    async fn create(&self, config: &ArchiveConfig) -> Result<(), RemoteError>;
    async fn describe(&self, name: &str) -> Result<EventArchive, RemoteError>;
    async fn update(&self, update: &ArchiveUpdate) -> Result<(), RemoteError>;
    async fn delete(&self, name: &str) -> Result<(), RemoteError>;
}

#[async_trait]
impl EventArchives for aws_sdk_eventbridge::Client {
    async fn create(&self, config: &ArchiveConfig) -> Result<(), RemoteError> {
        self.create_archive()
            .archive_name(&config.name)
            .event_source_arn(&config.event_source_arn)
            .set_description(config.description.clone())
            .set_event_pattern(config.event_pattern.clone())
            .set_retention_days(config.retention_days)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        Ok(())
    }

    async fn describe(&self, name: &str) -> Result<EventArchive, RemoteError> {
        let output = self
            .describe_archive()
            .archive_name(name)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;

        Ok(EventArchive {
            name: output.archive_name().unwrap_or(name).to_string(),
            arn: output.archive_arn().map(str::to_string),
            status: ArchiveStatus::from_sdk(output.state()),
            state_reason: output.state_reason().map(str::to_string),
            event_source_arn: output.event_source_arn().map(str::to_string),
            description: output.description().map(str::to_string),
            event_pattern: output.event_pattern().map(str::to_string),
            retention_days: output.retention_days(),
        })
    }

    async fn update(&self, update: &ArchiveUpdate) -> Result<(), RemoteError> {
        self.update_archive()
            .archive_name(&update.name)
            .set_description(update.description.clone())
            .set_event_pattern(update.event_pattern.clone())
            .set_retention_days(update.retention_days)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), RemoteError> {
        self.delete_archive()
            .archive_name(name)
            .send()
            .await
            .map_err(|e| classify(e, NOT_FOUND_MARKERS, &[]))?;
        Ok(())
    }
}

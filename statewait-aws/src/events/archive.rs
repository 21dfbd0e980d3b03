//! Lifecycle orchestration for EventBridge event archives.

use std::time::Duration;

use statewait::{
    retry_until_not_found, Observed, PollInterval, RemoteError, SpecError, WaitError, WaitSpec,
};
use tokio_util::sync::CancellationToken;

use super::{ArchiveConfig, ArchiveStatus, ArchiveUpdate, EventArchive, EventArchives};
use crate::error::{ReconcileError, ReconcileResult};

const RESOURCE: &str = "EventBridge Archive";

const SETTLED_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DELETED_TIMEOUT: Duration = Duration::from_secs(2 * 60);
const POLL: PollInterval = PollInterval::Fixed(Duration::from_secs(5));

fn err(
    operation: &'static str,
    handle: &str,
    source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> ReconcileError {
    ReconcileError::new(RESOURCE, operation, handle, source)
}

/// Both `Enabled` and `Disabled` are settled states: an archive created or
/// updated with ingestion turned off converges to `Disabled`, not `Enabled`.
fn settled_spec(failure: ArchiveStatus) -> Result<WaitSpec<ArchiveStatus>, SpecError> {
    WaitSpec::builder()
        .target(ArchiveStatus::Enabled)
        .target(ArchiveStatus::Disabled)
        .failure(failure)
        .timeout(SETTLED_TIMEOUT)
        .poll_interval(POLL)
        .build()
}

async fn wait_until(
    api: &impl EventArchives,
    name: &str,
    spec: &WaitSpec<ArchiveStatus>,
    cancel: &CancellationToken,
) -> Result<EventArchive, WaitError<ArchiveStatus>> {
    spec.wait(cancel, move || async move {
        let archive = api.describe(name).await?;
        let status = archive.status;
        let reason = archive.state_reason.clone();
        let mut observed = Observed::new(archive, status);
        if let Some(reason) = reason {
            observed = observed.with_reason(reason);
        }
        Ok(observed)
    })
    .await
}

/// Create the archive and wait until it settles (enabled or disabled). A
/// `CREATE_FAILED` state surfaces immediately with the remote state reason.
pub async fn create(
    api: &impl EventArchives,
    config: &ArchiveConfig,
    cancel: &CancellationToken,
) -> ReconcileResult<EventArchive> {
    let name = config.name.as_str();
    log::debug!("creating {RESOURCE}: {name}");
    api.create(config)
        .await
        .map_err(|e| err("creating", name, e))?;

    let spec = settled_spec(ArchiveStatus::CreateFailed).map_err(|e| err("creating", name, e))?;
    wait_until(api, name, &spec, cancel)
        .await
        .map_err(|e| err("creating", name, e))
}

/// Fetch the current snapshot; `Ok(None)` when the archive no longer exists.
pub async fn read(api: &impl EventArchives, name: &str) -> ReconcileResult<Option<EventArchive>> {
    match api.describe(name).await {
        Ok(archive) => Ok(Some(archive)),
        Err(RemoteError::NotFound) => {
            log::warn!("{RESOURCE} ({name}) not found, treating as deleted");
            Ok(None)
        }
        Err(e) => Err(err("reading", name, e)),
    }
}

/// Apply a modification and wait for the archive to settle again.
pub async fn update(
    api: &impl EventArchives,
    update: &ArchiveUpdate,
    cancel: &CancellationToken,
) -> ReconcileResult<EventArchive> {
    let name = update.name.as_str();
    api.update(update)
        .await
        .map_err(|e| err("updating", name, e))?;

    let spec = settled_spec(ArchiveStatus::UpdateFailed).map_err(|e| err("updating", name, e))?;
    wait_until(api, name, &spec, cancel)
        .await
        .map_err(|e| err("updating", name, e))
}

/// Delete the archive and wait for it to disappear. An already-absent archive
/// is a success.
pub async fn delete(
    api: &impl EventArchives,
    name: &str,
    cancel: &CancellationToken,
) -> ReconcileResult<()> {
    log::debug!("deleting {RESOURCE}: {name}");
    match api.delete(name).await {
        Ok(()) | Err(RemoteError::NotFound) => {}
        Err(e) => return Err(err("deleting", name, e)),
    }

    retry_until_not_found(DELETED_TIMEOUT, cancel, || api.describe(name))
        .await
        .map_err(|e| err("deleting", name, e))
}

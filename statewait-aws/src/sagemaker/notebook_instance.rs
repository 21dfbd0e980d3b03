//! Lifecycle orchestration for SageMaker notebook instances.
//!
//! The disruptive-update sequence is a small, strictly ordered state machine:
//! stop (unless already stopped) → apply the modification → wait for Stopped →
//! restart only if the instance was in service before the update began.

use std::time::Duration;

use statewait::{
    retry_when_not_found, Observed, PollInterval, RemoteError, SpecError, WaitError, WaitSpec,
};
use tokio_util::sync::CancellationToken;

use super::{NotebookConfig, NotebookInstance, NotebookInstances, NotebookStatus, NotebookUpdate};
use crate::error::{ReconcileError, ReconcileResult};

const RESOURCE: &str = "SageMaker Notebook Instance";

const PROPAGATION_TIMEOUT: Duration = Duration::from_secs(2 * 60);
const IN_SERVICE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const STOPPED_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const DELETED_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Budget for the instance to leave Stopped after a start request. Kept short:
/// the start call occasionally does not take, and the caller re-issues it.
const STARTED_TIMEOUT: Duration = Duration::from_secs(30);

const POLL: PollInterval = PollInterval::Fixed(Duration::from_secs(10));
const START_POLL: PollInterval = PollInterval::Fixed(Duration::from_secs(5));

fn err(
    operation: &'static str,
    handle: &str,
    source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> ReconcileError {
    ReconcileError::new(RESOURCE, operation, handle, source)
}

fn in_service_spec() -> Result<WaitSpec<NotebookStatus>, SpecError> {
    WaitSpec::builder()
        .target(NotebookStatus::InService)
        .failure(NotebookStatus::Failed)
        .timeout(IN_SERVICE_TIMEOUT)
        .poll_interval(POLL)
        .build()
}

fn stopped_spec() -> Result<WaitSpec<NotebookStatus>, SpecError> {
    WaitSpec::builder()
        .target(NotebookStatus::Stopped)
        .failure(NotebookStatus::Failed)
        .timeout(STOPPED_TIMEOUT)
        .poll_interval(POLL)
        .build()
}

/// "Started" means the instance has left Stopped, not that it is usable yet;
/// the in-service wait follows separately.
fn started_spec() -> Result<WaitSpec<NotebookStatus>, SpecError> {
    WaitSpec::builder()
        .target(NotebookStatus::Pending)
        .target(NotebookStatus::InService)
        .failure(NotebookStatus::Failed)
        .timeout(STARTED_TIMEOUT)
        .poll_interval(START_POLL)
        .build()
}

/// No target: the delete wait can only end in not-found (success), a failure
/// status, timeout, or cancellation.
fn deleted_spec() -> Result<WaitSpec<NotebookStatus>, SpecError> {
    WaitSpec::builder()
        .failure(NotebookStatus::Failed)
        .timeout(DELETED_TIMEOUT)
        .poll_interval(POLL)
        .build()
}

async fn wait_until(
    api: &impl NotebookInstances,
    name: &str,
    spec: &WaitSpec<NotebookStatus>,
    cancel: &CancellationToken,
) -> Result<NotebookInstance, WaitError<NotebookStatus>> {
    spec.wait(cancel, move || async move {
        let notebook = api.describe(name).await?;
        let status = notebook.status;
        let reason = notebook.failure_reason.clone();
        let mut observed = Observed::new(notebook, status);
        if let Some(reason) = reason {
            observed = observed.with_reason(reason);
        }
        Ok(observed)
    })
    .await
}

/// Create the instance and wait until it is in service.
pub async fn create(
    api: &impl NotebookInstances,
    config: &NotebookConfig,
    cancel: &CancellationToken,
) -> ReconcileResult<NotebookInstance> {
    let name = config.name.as_str();
    log::debug!("creating {RESOURCE}: {name}");
    api.create(config)
        .await
        .map_err(|e| err("creating", name, e))?;

    // The new instance can lag the create call; confirm it is visible before
    // starting the long status wait.
    retry_when_not_found(PROPAGATION_TIMEOUT, cancel, || api.describe(name))
        .await
        .map_err(|e| err("creating", name, e))?;

    let spec = in_service_spec().map_err(|e| err("creating", name, e))?;
    wait_until(api, name, &spec, cancel)
        .await
        .map_err(|e| err("creating", name, e))
}

/// Fetch the current snapshot; `Ok(None)` when the instance no longer exists,
/// so the host can drop it from state.
pub async fn read(
    api: &impl NotebookInstances,
    name: &str,
) -> ReconcileResult<Option<NotebookInstance>> {
    match api.describe(name).await {
        Ok(notebook) => Ok(Some(notebook)),
        Err(RemoteError::NotFound) => {
            log::warn!("{RESOURCE} ({name}) not found, treating as deleted");
            Ok(None)
        }
        Err(e) => Err(err("reading", name, e)),
    }
}

/// Apply a modification, stopping and restarting the instance as needed.
///
/// If the instance was running when the update began it is returned to
/// service afterwards; if it was already stopped, the stop step is skipped
/// and it stays stopped. Exactly one stop/start cycle either way.
pub async fn update(
    api: &impl NotebookInstances,
    update: &NotebookUpdate,
    cancel: &CancellationToken,
) -> ReconcileResult<NotebookInstance> {
    let name = update.name.as_str();
    let current = api
        .describe(name)
        .await
        .map_err(|e| err("updating", name, e))?;
    let previous_status = current.status;

    if previous_status != NotebookStatus::Stopped {
        stop(api, name, cancel).await?;
    }

    api.update(update)
        .await
        .map_err(|e| err("updating", name, e))?;

    let spec = stopped_spec().map_err(|e| err("updating", name, e))?;
    wait_until(api, name, &spec, cancel)
        .await
        .map_err(|e| err("updating", name, e))?;

    if previous_status == NotebookStatus::InService {
        start(api, name, cancel).await?;
    }

    api.describe(name)
        .await
        .map_err(|e| err("updating", name, e))
}

/// Delete the instance, stopping it first if it is in service. An
/// already-absent instance is a success.
pub async fn delete(
    api: &impl NotebookInstances,
    name: &str,
    cancel: &CancellationToken,
) -> ReconcileResult<()> {
    let notebook = match api.describe(name).await {
        Ok(notebook) => notebook,
        Err(RemoteError::NotFound) => {
            log::debug!("{RESOURCE} ({name}) already deleted");
            return Ok(());
        }
        Err(e) => return Err(err("deleting", name, e)),
    };

    if notebook.status == NotebookStatus::InService {
        stop(api, name, cancel).await?;
    }

    log::debug!("deleting {RESOURCE}: {name}");
    match api.delete(name).await {
        Ok(()) | Err(RemoteError::NotFound) => {}
        Err(e) => return Err(err("deleting", name, e)),
    }

    let spec = deleted_spec().map_err(|e| err("deleting", name, e))?;
    match wait_until(api, name, &spec, cancel).await {
        Ok(_) | Err(WaitError::NotFound) => Ok(()),
        Err(e) => Err(err("deleting", name, e)),
    }
}

/// Stop the instance and wait until Stopped. Skips the stop call when the
/// instance is already stopped or gone.
pub async fn stop(
    api: &impl NotebookInstances,
    name: &str,
    cancel: &CancellationToken,
) -> ReconcileResult<()> {
    let notebook = match api.describe(name).await {
        Ok(notebook) => notebook,
        Err(RemoteError::NotFound) => return Ok(()),
        Err(e) => return Err(err("stopping", name, e)),
    };
    if notebook.status == NotebookStatus::Stopped {
        return Ok(());
    }

    api.stop(name).await.map_err(|e| err("stopping", name, e))?;

    let spec = stopped_spec().map_err(|e| err("stopping", name, e))?;
    wait_until(api, name, &spec, cancel)
        .await
        .map_err(|e| err("stopping", name, e))?;
    Ok(())
}

/// Start the instance and wait until it is back in service.
///
/// StartNotebookInstance sometimes does not take. If the short "started" wait
/// times out without the instance leaving Stopped, the start request is
/// re-issued once; a timeout is the only condition that triggers this, and
/// the second wait's outcome is surfaced as-is.
pub async fn start(
    api: &impl NotebookInstances,
    name: &str,
    cancel: &CancellationToken,
) -> ReconcileResult<()> {
    api.start(name).await.map_err(|e| err("starting", name, e))?;

    let spec = started_spec().map_err(|e| err("starting", name, e))?;
    match wait_until(api, name, &spec, cancel).await {
        Ok(_) => {}
        Err(e) if e.is_timeout() => {
            log::warn!("{RESOURCE} ({name}) did not leave Stopped, re-issuing start request");
            api.start(name).await.map_err(|e| err("starting", name, e))?;
            wait_until(api, name, &spec, cancel)
                .await
                .map_err(|e| err("starting", name, e))?;
        }
        Err(e) => return Err(err("starting", name, e)),
    }

    let spec = in_service_spec().map_err(|e| err("starting", name, e))?;
    wait_until(api, name, &spec, cancel)
        .await
        .map_err(|e| err("starting", name, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_specs_are_well_formed() {
        assert!(in_service_spec().is_ok());
        assert!(stopped_spec().is_ok());
        assert!(started_spec().is_ok());
        assert!(deleted_spec().is_ok());
    }
}

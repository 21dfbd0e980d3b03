//! End-to-end lifecycle scenarios for the notebook-instance orchestration,
//! driven against a scripted in-memory control plane.

use std::sync::Mutex;

use async_trait::async_trait;
use statewait::RemoteError;
use statewait_aws::sagemaker::{
    notebook_instance, NotebookConfig, NotebookInstance, NotebookInstances, NotebookStatus,
    NotebookUpdate,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Create,
    Describe,
    Update,
    Delete,
    Start,
    Stop,
}

struct State {
    exists: bool,
    status: NotebookStatus,
    /// Transition in flight: (final status, describes until it settles).
    transition: Option<(NotebookStatus, u32)>,
    /// When a settling transition should make the instance disappear instead.
    vanish: bool,
    failure_reason: Option<String>,
    fail_create: Option<String>,
    /// Start calls to accept without actually beginning a transition, like
    /// the real service occasionally dropping StartNotebookInstance.
    swallow_starts: u32,
    fail_start: Option<String>,
}

/// In-memory notebook control plane: mutating calls begin a transition that
/// settles after a fixed number of describe polls, like the real service's
/// eventually-consistent status reporting.
struct FakeNotebook {
    state: Mutex<State>,
    calls: Mutex<Vec<Call>>,
}

impl FakeNotebook {
    fn new(status: NotebookStatus) -> Self {
        Self {
            state: Mutex::new(State {
                exists: true,
                status,
                transition: None,
                vanish: false,
                failure_reason: None,
                fail_create: None,
                swallow_starts: 0,
                fail_start: None,
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn absent() -> Self {
        let fake = Self::new(NotebookStatus::Pending);
        fake.state.lock().unwrap().exists = false;
        fake
    }

    fn failing_create(reason: &str) -> Self {
        let fake = Self::absent();
        fake.state.lock().unwrap().fail_create = Some(reason.to_string());
        fake
    }

    fn swallowing_starts(status: NotebookStatus, count: u32) -> Self {
        let fake = Self::new(status);
        fake.state.lock().unwrap().swallow_starts = count;
        fake
    }

    fn failing_start(status: NotebookStatus, reason: &str) -> Self {
        let fake = Self::new(status);
        fake.state.lock().unwrap().fail_start = Some(reason.to_string());
        fake
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: Call) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    fn position(&self, call: Call) -> Option<usize> {
        self.calls().iter().position(|c| *c == call)
    }
}

#[async_trait]
impl NotebookInstances for FakeNotebook {
    async fn create(&self, config: &NotebookConfig) -> Result<(), RemoteError> {
        self.record(Call::Create);
        let mut state = self.state.lock().unwrap();
        state.exists = true;
        state.status = NotebookStatus::Pending;
        if let Some(reason) = state.fail_create.clone() {
            state.failure_reason = Some(reason);
            state.transition = Some((NotebookStatus::Failed, 1));
        } else {
            state.transition = Some((NotebookStatus::InService, 2));
        }
        let _ = config;
        Ok(())
    }

    async fn describe(&self, name: &str) -> Result<NotebookInstance, RemoteError> {
        self.record(Call::Describe);
        let mut state = self.state.lock().unwrap();
        if !state.exists {
            return Err(RemoteError::NotFound);
        }
        if let Some((final_status, remaining)) = state.transition {
            if remaining == 0 {
                if state.vanish {
                    state.exists = false;
                    state.transition = None;
                    return Err(RemoteError::NotFound);
                }
                state.status = final_status;
                state.transition = None;
            } else {
                state.transition = Some((final_status, remaining - 1));
            }
        }
        Ok(NotebookInstance {
            name: name.to_string(),
            arn: Some(format!("arn:aws:sagemaker:us-east-1:123456789012:notebook-instance/{name}")),
            status: state.status,
            failure_reason: state.failure_reason.clone(),
            instance_type: Some("ml.t3.medium".to_string()),
            role_arn: Some("arn:aws:iam::123456789012:role/notebook".to_string()),
            volume_size_gb: Some(5),
            url: None,
            network_interface_id: None,
        })
    }

    async fn update(&self, update: &NotebookUpdate) -> Result<(), RemoteError> {
        self.record(Call::Update);
        let _ = update;
        Ok(())
    }

    async fn delete(&self, _name: &str) -> Result<(), RemoteError> {
        self.record(Call::Delete);
        let mut state = self.state.lock().unwrap();
        state.status = NotebookStatus::Deleting;
        state.transition = Some((NotebookStatus::Deleting, 1));
        state.vanish = true;
        Ok(())
    }

    async fn start(&self, _name: &str) -> Result<(), RemoteError> {
        self.record(Call::Start);
        let mut state = self.state.lock().unwrap();
        if state.swallow_starts > 0 {
            state.swallow_starts -= 1;
            return Ok(());
        }
        if let Some(reason) = state.fail_start.clone() {
            state.failure_reason = Some(reason);
            state.transition = Some((NotebookStatus::Failed, 1));
            return Ok(());
        }
        state.status = NotebookStatus::Pending;
        state.transition = Some((NotebookStatus::InService, 2));
        Ok(())
    }

    async fn stop(&self, _name: &str) -> Result<(), RemoteError> {
        self.record(Call::Stop);
        let mut state = self.state.lock().unwrap();
        state.status = NotebookStatus::Stopping;
        state.transition = Some((NotebookStatus::Stopped, 2));
        Ok(())
    }
}

fn sample_update(name: &str) -> NotebookUpdate {
    NotebookUpdate {
        name: name.to_string(),
        volume_size_gb: Some(10),
        ..NotebookUpdate::default()
    }
}

#[tokio::test(start_paused = true)]
async fn create_waits_until_in_service() {
    let fake = FakeNotebook::absent();
    let cancel = CancellationToken::new();
    let config = NotebookConfig {
        name: "nb".to_string(),
        instance_type: "ml.t3.medium".to_string(),
        role_arn: "arn:aws:iam::123456789012:role/notebook".to_string(),
        ..NotebookConfig::default()
    };

    let notebook = notebook_instance::create(&fake, &config, &cancel)
        .await
        .expect("create should converge to InService");

    assert_eq!(notebook.status, NotebookStatus::InService);
    assert_eq!(fake.count(Call::Create), 1);
}

#[tokio::test(start_paused = true)]
async fn create_failure_surfaces_remote_reason() {
    let fake = FakeNotebook::failing_create("insufficient capacity");
    let cancel = CancellationToken::new();
    let config = NotebookConfig {
        name: "nb".to_string(),
        instance_type: "ml.t3.medium".to_string(),
        role_arn: "arn:aws:iam::123456789012:role/notebook".to_string(),
        ..NotebookConfig::default()
    };

    let err = notebook_instance::create(&fake, &config, &cancel)
        .await
        .expect_err("Failed status must abort the create");

    let message = err.to_string();
    assert!(message.contains("creating"), "message: {message}");
    assert!(message.contains("nb"), "message: {message}");
    assert!(
        message.contains("insufficient capacity"),
        "failure reason must be surfaced, got: {message}"
    );
}

#[tokio::test(start_paused = true)]
async fn update_of_running_instance_is_one_stop_start_cycle() {
    let fake = FakeNotebook::new(NotebookStatus::InService);
    let cancel = CancellationToken::new();

    let notebook = notebook_instance::update(&fake, &sample_update("nb"), &cancel)
        .await
        .expect("update should succeed");

    assert_eq!(notebook.status, NotebookStatus::InService);
    assert_eq!(fake.count(Call::Stop), 1, "exactly one stop");
    assert_eq!(fake.count(Call::Start), 1, "exactly one start");
    assert_eq!(fake.count(Call::Update), 1);

    let stop = fake.position(Call::Stop).unwrap();
    let update = fake.position(Call::Update).unwrap();
    let start = fake.position(Call::Start).unwrap();
    assert!(stop < update, "stop must precede the modification");
    assert!(update < start, "restart must follow the modification");
}

#[tokio::test(start_paused = true)]
async fn update_of_stopped_instance_skips_stop_and_stays_stopped() {
    let fake = FakeNotebook::new(NotebookStatus::Stopped);
    let cancel = CancellationToken::new();

    let notebook = notebook_instance::update(&fake, &sample_update("nb"), &cancel)
        .await
        .expect("update should succeed");

    assert_eq!(notebook.status, NotebookStatus::Stopped);
    assert_eq!(fake.count(Call::Stop), 0, "already stopped, no stop call");
    assert_eq!(fake.count(Call::Start), 0, "was not running, no restart");
    assert_eq!(fake.count(Call::Update), 1);
}

#[tokio::test(start_paused = true)]
async fn start_is_reissued_once_when_the_first_request_does_not_take() {
    let fake = FakeNotebook::swallowing_starts(NotebookStatus::Stopped, 1);
    let cancel = CancellationToken::new();

    notebook_instance::start(&fake, "nb", &cancel)
        .await
        .expect("second start request should take");

    assert_eq!(
        fake.count(Call::Start),
        2,
        "one swallowed request, one re-issue"
    );
    assert_eq!(fake.state.lock().unwrap().status, NotebookStatus::InService);
}

#[tokio::test(start_paused = true)]
async fn start_failure_is_not_reissued() {
    let fake = FakeNotebook::failing_start(NotebookStatus::Stopped, "insufficient capacity");
    let cancel = CancellationToken::new();

    let err = notebook_instance::start(&fake, "nb", &cancel)
        .await
        .expect_err("Failed status must abort the start");

    assert_eq!(
        fake.count(Call::Start),
        1,
        "a terminal failure must not trigger the re-issue"
    );
    let message = err.to_string();
    assert!(message.contains("starting"), "message: {message}");
    assert!(
        message.contains("insufficient capacity"),
        "failure reason must be surfaced, got: {message}"
    );
}

#[tokio::test(start_paused = true)]
async fn delete_of_absent_instance_is_silent_success() {
    let fake = FakeNotebook::absent();
    let cancel = CancellationToken::new();

    notebook_instance::delete(&fake, "nb", &cancel)
        .await
        .expect("already-deleted instance is a success");

    assert_eq!(fake.count(Call::Delete), 0, "nothing to delete");
}

#[tokio::test(start_paused = true)]
async fn delete_of_running_instance_stops_it_first() {
    let fake = FakeNotebook::new(NotebookStatus::InService);
    let cancel = CancellationToken::new();

    notebook_instance::delete(&fake, "nb", &cancel)
        .await
        .expect("delete should succeed");

    let stop = fake.position(Call::Stop).unwrap();
    let delete = fake.position(Call::Delete).unwrap();
    assert!(stop < delete, "running instance must be stopped before delete");
    assert!(!fake.state.lock().unwrap().exists);
}

#[tokio::test(start_paused = true)]
async fn read_of_absent_instance_returns_none() {
    let fake = FakeNotebook::absent();

    let result = notebook_instance::read(&fake, "nb")
        .await
        .expect("absent instance is not an error on read");

    assert!(result.is_none());
}

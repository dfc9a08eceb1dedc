//! Single-flight build session state
//!
//! Holds the state a view needs to render build progress:
//! - whether a build is in flight
//! - the outcome of the last build (`success`, `error`)
//! - the compiler log lines
//!
//! State lives in a `tokio::sync::watch` channel so views can either read a
//! snapshot or subscribe to changes.

use build_types::{BuildRequest, BuildResult, BuildStatus, LatexCommand};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::client::BuildClient;
use crate::error::ClientError;

const DEFAULT_ERROR_MESSAGE: &str = "Build failed";

/// Build state of one view, owning its client
pub struct BuildSession<C> {
    client: C,
    state: watch::Sender<BuildStatus>,
}

/// Clears `is_building` when the trigger future is dropped mid-flight.
///
/// A completed build publishes its outcome and the cleared flag in one
/// update through [`BuildingGuard::complete`], which disarms the guard.
struct BuildingGuard<'a> {
    state: &'a watch::Sender<BuildStatus>,
    armed: bool,
}

impl<'a> BuildingGuard<'a> {
    fn new(state: &'a watch::Sender<BuildStatus>) -> Self {
        Self { state, armed: true }
    }

    fn complete(mut self, outcome: Result<BuildResult, ClientError>) {
        self.armed = false;
        self.state
            .send_modify(|status| apply_outcome(status, outcome));
    }
}

impl Drop for BuildingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|status| status.is_building = false);
        }
    }
}

/// Record a finished build; subscribers never see an outcome while
/// `is_building` is still set.
fn apply_outcome(status: &mut BuildStatus, outcome: Result<BuildResult, ClientError>) {
    status.is_building = false;
    match outcome {
        Ok(result) => {
            status.success = Some(result.success);
            status.logs = result.logs;
        }
        Err(err) => {
            let mut message = err.to_string();
            if message.is_empty() {
                message = DEFAULT_ERROR_MESSAGE.to_string();
            }
            status.success = Some(false);
            status.error = Some(message);
        }
    }
}

impl<C: BuildClient> BuildSession<C> {
    pub fn new(client: C) -> Self {
        let (state, _) = watch::channel(BuildStatus::default());
        Self { client, state }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn snapshot(&self) -> BuildStatus {
        self.state.borrow().clone()
    }

    pub fn is_building(&self) -> bool {
        self.state.borrow().is_building
    }

    pub fn subscribe(&self) -> watch::Receiver<BuildStatus> {
        self.state.subscribe()
    }

    /// Run one build through the client.
    ///
    /// Returns `false` without touching state or the client when a build is
    /// already in flight; the trigger is dropped, not queued.
    pub async fn trigger_build(
        &self,
        source_file: &str,
        output_dir: &str,
        command: Option<LatexCommand>,
    ) -> bool {
        let accepted = self.state.send_if_modified(|status| {
            if status.is_building {
                return false;
            }
            *status = BuildStatus {
                is_building: true,
                ..BuildStatus::default()
            };
            true
        });
        if !accepted {
            debug!("Build already in progress, ignoring trigger for {}", source_file);
            return false;
        }

        let guard = BuildingGuard::new(&self.state);

        let request = BuildRequest {
            source_file: source_file.to_string(),
            output_dir: output_dir.to_string(),
            command,
        };

        let outcome = self.client.trigger_build(&request).await;
        match &outcome {
            Ok(result) => info!("Build of {} finished: success={}", source_file, result.success),
            Err(err) => info!("Build request for {} failed: {}", source_file, err),
        }
        guard.complete(outcome);

        true
    }

    pub fn clear_logs(&self) {
        self.state.send_modify(|status| status.logs.clear());
    }

    /// Forget the last outcome; an in-flight build keeps running
    pub fn reset_build_state(&self) {
        self.state.send_modify(|status| {
            status.success = None;
            status.error = None;
            status.logs.clear();
        });
    }

    pub fn pdf_url(&self) -> String {
        self.client.pdf_url()
    }
}

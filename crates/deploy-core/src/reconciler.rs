//! Inspect, plan and execute under a destination lock

use std::path::{Path, PathBuf};

use deploy_fs::DestinationLock;
use deploy_svn::{ClientOptions, SvnCli, SvnClient};

use crate::desired::{DesiredState, urls_match};
use crate::executor::Executor;
use crate::inspector::StateInspector;
use crate::plan::{ReconciliationPlan, select};
use crate::result::{ErrorKind, ReconcileError, ReconciliationResult};
use crate::state::CurrentState;

/// What a reconciliation would do, without doing it.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub current: CurrentState,
    /// The request with any symbolic revision resolved for comparison
    pub desired: DesiredState,
    pub plan: ReconciliationPlan,
}

/// Drives one destination toward its desired state.
///
/// Each call to [`reconcile`](Reconciler::reconcile) holds an exclusive
/// lock on the destination from inspection to the end of execution, so
/// concurrent reconciliations of one path run one after the other.
pub struct Reconciler {
    client: Box<dyn SvnClient>,
    lock_dir: PathBuf,
}

impl Reconciler {
    pub fn new(client: Box<dyn SvnClient>) -> Self {
        Self {
            client,
            lock_dir: DestinationLock::default_dir(),
        }
    }

    /// Reconciler using the `svn` command-line client, with the request's
    /// credentials and executable taking precedence over `options`.
    pub fn for_request(desired: &DesiredState, mut options: ClientOptions) -> Self {
        if !desired.credentials().is_empty() {
            options.credentials = desired.credentials().clone();
        }
        if let Some(executable) = desired.executable() {
            options.executable = Some(executable.clone());
        }
        Self::new(Box::new(SvnCli::new(options)))
    }

    /// Keep lock files in `dir` instead of the system temp directory.
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = dir.into();
        self
    }

    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    /// Inspect the destination and choose a plan, without executing it.
    pub fn assess(&self, desired: &DesiredState) -> Result<Assessment, ReconcileError> {
        let current = StateInspector::new(self.client.as_ref())
            .inspect(desired)
            .map_err(|e| {
                ReconcileError::with_stderr(ErrorKind::InspectionError, &e, e.stderr().unwrap_or(""))
            })?;
        tracing::info!(dest = %desired.dest(), state = %current, "Inspected destination");

        let desired = self.pin_revision(desired, &current)?;
        let plan = select(&desired, &current);
        tracing::debug!(dest = %desired.dest(), %plan, "Selected plan");

        Ok(Assessment {
            current,
            desired,
            plan,
        })
    }

    /// Bring the destination to the desired state.
    pub fn reconcile(&self, desired: &DesiredState) -> ReconciliationResult {
        let _lock = match DestinationLock::acquire_in(&self.lock_dir, desired.dest()) {
            Ok(lock) => lock,
            Err(e) => {
                return ReconciliationResult::failed(
                    None,
                    ReconcileError::new(
                        ErrorKind::InspectionError,
                        format!("Cannot lock destination {}: {}", desired.dest(), e),
                    ),
                );
            }
        };

        let assessment = match self.assess(desired) {
            Ok(assessment) => assessment,
            Err(error) => return ReconciliationResult::failed(None, error),
        };

        let mut result =
            Executor::new(self.client.as_ref()).execute(&assessment.plan, &assessment.desired);

        if assessment.plan == ReconciliationPlan::NoOp {
            result.final_revision = assessment.current.working_copy().map(|wc| wc.revision);
        }

        result
    }

    /// Resolve a symbolic revision against a clean working copy already on
    /// the requested URL, so that "already there" can be detected.
    fn pin_revision(
        &self,
        desired: &DesiredState,
        current: &CurrentState,
    ) -> Result<DesiredState, ReconcileError> {
        let wc = match current {
            CurrentState::CheckedOutClean(wc) if urls_match(&wc.url, desired.repo_url()) => wc,
            _ => return Ok(desired.clone()),
        };
        if !desired.revision().is_symbolic() {
            return Ok(desired.clone());
        }

        let info = self
            .client
            .info(desired.dest().as_str(), Some(desired.revision()))
            .map_err(|e| {
                let stderr = match &e {
                    deploy_svn::Error::CommandFailed { stderr, .. } => stderr.as_str(),
                    _ => "",
                };
                ReconcileError::with_stderr(
                    ErrorKind::ExecutionFailed,
                    format!("Cannot resolve revision {}: {}", desired.revision(), e),
                    stderr,
                )
            })?;

        tracing::debug!(
            revision = %desired.revision(),
            resolved = info.revision,
            current = wc.revision,
            "Resolved symbolic revision"
        );
        Ok(desired.pinned(info.revision))
    }
}

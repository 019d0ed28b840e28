//! Plan execution against the svn client

use std::fmt;

use deploy_svn::info::reported_revision;
use deploy_svn::{CommandOutput, SvnClient};

use crate::desired::DesiredState;
use crate::plan::ReconciliationPlan;
use crate::result::{ErrorKind, ReconcileError, ReconciliationResult};

/// One client invocation within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Checkout { force: bool },
    Export { force: bool },
    Switch,
    Update,
    Revert,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Checkout { .. } => "checkout",
            Self::Export { .. } => "export",
            Self::Switch => "switch",
            Self::Update => "update",
            Self::Revert => "revert",
        };
        f.write_str(name)
    }
}

fn steps(plan: &ReconciliationPlan) -> Vec<Step> {
    match plan {
        ReconciliationPlan::NoOp | ReconciliationPlan::Fail { .. } => Vec::new(),
        ReconciliationPlan::Checkout { force } => vec![Step::Checkout { force: *force }],
        ReconciliationPlan::Export { force } => vec![Step::Export { force: *force }],
        ReconciliationPlan::Switch => vec![Step::Switch, Step::Update],
        ReconciliationPlan::Update => vec![Step::Update],
        ReconciliationPlan::ForceDiscardAndUpdate { switch: true } => {
            vec![Step::Revert, Step::Switch, Step::Update]
        }
        ReconciliationPlan::ForceDiscardAndUpdate { switch: false } => {
            vec![Step::Revert, Step::Update]
        }
    }
}

/// Runs the client operations of a [`ReconciliationPlan`].
///
/// Steps run in order and stop at the first failure. A result is always
/// produced; failures are classified as [`ErrorKind::ExecutionFailed`]
/// unless the plan itself is a `Fail`.
pub struct Executor<'a> {
    client: &'a dyn SvnClient,
}

impl<'a> Executor<'a> {
    pub fn new(client: &'a dyn SvnClient) -> Self {
        Self { client }
    }

    pub fn execute(&self, plan: &ReconciliationPlan, desired: &DesiredState) -> ReconciliationResult {
        if let ReconciliationPlan::Fail { reason } = plan {
            tracing::warn!(dest = %desired.dest(), %reason, "Refusing to touch destination");
            return ReconciliationResult::failed(
                Some(plan.clone()),
                ReconcileError::new(ErrorKind::from(reason), reason.to_string()),
            );
        }

        let mut result = ReconciliationResult {
            changed: false,
            final_revision: None,
            plan: Some(plan.clone()),
            stdout: String::new(),
            stderr: String::new(),
            error: None,
        };
        let mut reported = None;

        for step in steps(plan) {
            tracing::info!(dest = %desired.dest(), %step, revision = %desired.revision(), "Running svn step");

            let output = match self.run(step, desired) {
                Ok(output) => output,
                Err(e) => {
                    tracing::warn!(%step, error = %e, "svn step could not run");
                    let stderr = match &e {
                        deploy_svn::Error::CommandFailed { stderr, .. } => stderr.as_str(),
                        _ => "",
                    };
                    result.error = Some(ReconcileError::with_stderr(
                        ErrorKind::ExecutionFailed,
                        format!("svn {} failed: {}", step, e),
                        stderr,
                    ));
                    break;
                }
            };

            result.stdout.push_str(&output.stdout);
            result.stderr.push_str(&output.stderr);

            if !output.success() {
                let code = output
                    .exit_code
                    .map_or_else(|| "signal".to_string(), |c| c.to_string());
                tracing::warn!(%step, exit_code = %code, "svn step failed");
                result.error = Some(ReconcileError::with_stderr(
                    ErrorKind::ExecutionFailed,
                    format!("svn {} exited with {}", step, code),
                    &output.stderr,
                ));
                break;
            }

            result.changed = true;
            if let Some(revision) = reported_revision(&output.stdout) {
                reported = Some(revision);
            }
        }

        result.final_revision = reported.or_else(|| self.working_copy_revision(plan, &result, desired));

        if result.is_success() {
            tracing::info!(
                dest = %desired.dest(),
                %plan,
                changed = result.changed,
                revision = ?result.final_revision,
                "Reconciliation finished"
            );
        }

        result
    }

    fn run(&self, step: Step, desired: &DesiredState) -> deploy_svn::Result<CommandOutput> {
        let url = desired.repo_url();
        let dest = desired.dest();
        let revision = desired.revision();

        match step {
            Step::Checkout { force } => self.client.checkout(url, dest, revision, force),
            Step::Export { force } => self.client.export(url, dest, revision, force),
            Step::Switch => self.client.switch(url, dest, revision),
            Step::Update => self.client.update(dest, revision),
            Step::Revert => self.client.revert(dest),
        }
    }

    /// Fall back to `svn info` when no step announced a revision.
    fn working_copy_revision(
        &self,
        plan: &ReconciliationPlan,
        result: &ReconciliationResult,
        desired: &DesiredState,
    ) -> Option<u64> {
        if !result.changed || !plan.targets_working_copy() {
            return None;
        }
        match self.client.info(desired.dest().as_str(), None) {
            Ok(info) => Some(info.revision),
            Err(e) => {
                tracing::debug!(error = %e, "Could not read final revision");
                None
            }
        }
    }
}

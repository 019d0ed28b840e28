//! End-to-end reconciliation against the simulated svn client

use std::fs;

use deploy_core::{DesiredState, ErrorKind, ReconciliationPlan, Reconciler};
use deploy_fs::NormalizedPath;
use deploy_svn::Revision;
use deploy_test_utils::fixtures::foreign_content;
use deploy_test_utils::{Operation, SimulatedSvn, TestDestination};
use pretty_assertions::assert_eq;

const REPO: &str = "svn+ssh://host/repo";
const TRUNK: &str = "svn+ssh://host/repo/trunk";
const RELEASE: &str = "svn+ssh://host/repo/branches/release";

struct Harness {
    area: TestDestination,
    svn: SimulatedSvn,
    dest: NormalizedPath,
}

impl Harness {
    fn new() -> Self {
        let area = TestDestination::new();
        let dest = area.dest("app");
        let svn = SimulatedSvn::new().with_repository(REPO, 12);
        Self { area, svn, dest }
    }

    fn desired(&self, url: &str) -> DesiredState {
        DesiredState::new(url, self.dest.clone()).unwrap()
    }

    fn reconciler(&self) -> Reconciler {
        Reconciler::new(Box::new(self.svn.clone())).with_lock_dir(self.area.lock_dir())
    }
}

#[test]
fn test_absent_destination_is_checked_out() {
    let h = Harness::new();

    let result = h.reconciler().reconcile(&h.desired(TRUNK));

    assert!(result.is_success(), "{:?}", result.error);
    assert!(result.changed);
    assert_eq!(result.plan, Some(ReconciliationPlan::Checkout { force: false }));
    assert_eq!(result.final_revision, Some(12));
    assert!(result.stdout.contains("Checked out revision 12."));
    assert_eq!(h.svn.working_copy(&h.dest), Some((TRUNK.to_string(), 12)));
}

#[test]
fn test_second_run_is_a_noop() {
    // Idempotence: converged destination reports no change and no mutations
    let h = Harness::new();
    let reconciler = h.reconciler();
    let desired = h.desired(TRUNK);

    reconciler.reconcile(&desired);
    h.svn.clear_invocations();
    let result = reconciler.reconcile(&desired);

    assert!(result.is_success());
    assert!(!result.changed);
    assert_eq!(result.plan, Some(ReconciliationPlan::NoOp));
    assert_eq!(result.final_revision, Some(12));
    assert!(h.svn.mutations().is_empty());
    assert_eq!(
        h.svn.operations(),
        vec![Operation::Info, Operation::Status, Operation::Info]
    );
}

#[test]
fn test_empty_directory_is_treated_as_absent() {
    let h = Harness::new();
    fs::create_dir_all(h.dest.to_native()).unwrap();

    let result = h.reconciler().reconcile(&h.desired(TRUNK));

    assert_eq!(result.plan, Some(ReconciliationPlan::Checkout { force: false }));
    assert!(result.changed);
}

#[test]
fn test_new_commit_is_picked_up() {
    let h = Harness::new();
    let reconciler = h.reconciler();
    let desired = h.desired(TRUNK);
    reconciler.reconcile(&desired);

    h.svn.set_head(REPO, 15);
    let result = reconciler.reconcile(&desired);

    assert_eq!(result.plan, Some(ReconciliationPlan::Update));
    assert!(result.changed);
    assert_eq!(result.final_revision, Some(15));
    assert!(result.stdout.contains("Updated to revision 15."));
}

#[test]
fn test_pinned_revision_at_current_is_noop() {
    let h = Harness::new();
    h.svn.seed_working_copy(&h.dest, TRUNK, 7);

    let result = h
        .reconciler()
        .reconcile(&h.desired(TRUNK).with_revision(Revision::Number(7)));

    assert_eq!(result.plan, Some(ReconciliationPlan::NoOp));
    assert_eq!(result.final_revision, Some(7));
    assert_eq!(h.svn.operations(), vec![Operation::Info, Operation::Status]);
}

#[test]
fn test_foreign_content_is_not_touched_without_force() {
    let h = Harness::new();
    foreign_content(&h.dest.to_native());

    let result = h.reconciler().reconcile(&h.desired(TRUNK));

    assert_eq!(result.error_kind(), Some(ErrorKind::DestinationOccupied));
    assert!(!result.changed);
    assert!(h.svn.invocations().is_empty());
    assert!(h.dest.to_native().join("notes.txt").exists());
    assert!(!h.dest.to_native().join(".svn").exists());
}

#[test]
fn test_foreign_content_is_overwritten_with_force() {
    let h = Harness::new();
    foreign_content(&h.dest.to_native());

    let result = h.reconciler().reconcile(&h.desired(TRUNK).with_force(true));

    assert_eq!(result.plan, Some(ReconciliationPlan::Checkout { force: true }));
    assert!(result.changed);
    assert!(h.svn.invocations()[0].command.starts_with("checkout --force"));
}

#[test]
fn test_dirty_working_copy_fails_without_force() {
    let h = Harness::new();
    h.svn.seed_working_copy(&h.dest, TRUNK, 12);
    h.svn.mark_dirty(&h.dest);

    let result = h.reconciler().reconcile(&h.desired(TRUNK));

    assert_eq!(result.error_kind(), Some(ErrorKind::LocalModifications));
    assert!(!result.changed);
    assert!(h.svn.mutations().is_empty());
    assert!(h.svn.is_dirty(&h.dest));
}

#[test]
fn test_dirty_working_copy_is_reverted_with_force() {
    let h = Harness::new();
    h.svn.seed_working_copy(&h.dest, TRUNK, 10);
    h.svn.mark_dirty(&h.dest);

    let result = h.reconciler().reconcile(&h.desired(TRUNK).with_force(true));

    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(
        result.plan,
        Some(ReconciliationPlan::ForceDiscardAndUpdate { switch: false })
    );
    assert_eq!(h.svn.mutations(), vec![Operation::Revert, Operation::Update]);
    assert!(!h.svn.is_dirty(&h.dest));
    assert_eq!(result.final_revision, Some(12));
}

#[test]
fn test_dirty_working_copy_on_other_url_reverts_before_switch() {
    let h = Harness::new();
    h.svn.seed_working_copy(&h.dest, TRUNK, 10);
    h.svn.mark_dirty(&h.dest);

    let result = h.reconciler().reconcile(&h.desired(RELEASE).with_force(true));

    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(
        h.svn.mutations(),
        vec![Operation::Revert, Operation::Switch, Operation::Update]
    );
    assert_eq!(h.svn.working_copy(&h.dest), Some((RELEASE.to_string(), 12)));
}

#[test]
fn test_url_change_switches_then_updates() {
    let h = Harness::new();
    h.svn.seed_working_copy(&h.dest, TRUNK, 12);

    let result = h.reconciler().reconcile(&h.desired(RELEASE));

    assert_eq!(result.plan, Some(ReconciliationPlan::Switch));
    assert!(result.changed);
    assert_eq!(h.svn.mutations(), vec![Operation::Switch, Operation::Update]);
    assert_eq!(h.svn.working_copy(&h.dest), Some((RELEASE.to_string(), 12)));
}

#[test]
fn test_url_change_without_switch_fails_untouched() {
    let h = Harness::new();
    h.svn.seed_working_copy(&h.dest, TRUNK, 12);

    let result = h
        .reconciler()
        .reconcile(&h.desired(RELEASE).with_switch(false));

    assert_eq!(result.error_kind(), Some(ErrorKind::UrlMismatch));
    assert!(!result.changed);
    assert!(h.svn.mutations().is_empty());
    assert_eq!(h.svn.working_copy(&h.dest), Some((TRUNK.to_string(), 12)));
}

#[test]
fn test_failed_switch_skips_update() {
    let h = Harness::new();
    h.svn.seed_working_copy(&h.dest, TRUNK, 12);
    let stderr = "svn: E170013: Unable to connect to a repository at URL 'svn+ssh://host/repo'\n";
    h.svn.fail_with(Operation::Switch, stderr);

    let result = h.reconciler().reconcile(&h.desired(RELEASE));

    assert_eq!(result.error_kind(), Some(ErrorKind::ExecutionFailed));
    assert!(!result.changed);
    assert_eq!(h.svn.mutations(), vec![Operation::Switch]);
    let error = result.error.unwrap();
    assert!(error.message.contains(stderr), "stderr must be carried verbatim");
    assert!(result.stderr.contains("E170013"));
}

#[test]
fn test_failure_after_partial_success_reports_change() {
    let h = Harness::new();
    h.svn.seed_working_copy(&h.dest, TRUNK, 12);
    h.svn.fail_with(Operation::Update, "svn: E155004: Working copy locked\n");

    let result = h.reconciler().reconcile(&h.desired(RELEASE));

    assert_eq!(result.error_kind(), Some(ErrorKind::ExecutionFailed));
    assert!(result.changed);
    assert_eq!(result.final_revision, Some(12));
}

#[test]
fn test_timeout_is_execution_failure() {
    let h = Harness::new();
    h.svn.time_out(Operation::Checkout);

    let result = h.reconciler().reconcile(&h.desired(TRUNK));

    assert_eq!(result.error_kind(), Some(ErrorKind::ExecutionFailed));
    assert!(!result.changed);
    assert!(result.error.unwrap().message.contains("timed out"));
}

#[test]
fn test_unknown_repository_is_execution_failure() {
    let h = Harness::new();

    let result = h.reconciler().reconcile(&h.desired("svn://elsewhere/repo"));

    assert_eq!(result.error_kind(), Some(ErrorKind::ExecutionFailed));
    assert!(result.error.unwrap().message.contains("E170000"));
    assert!(!h.dest.to_native().exists());
}

#[test]
fn test_status_failure_is_inspection_error() {
    let h = Harness::new();
    h.svn.seed_working_copy(&h.dest, TRUNK, 12);
    h.svn.fail_with(Operation::Status, "svn: E155037: Previous operation has not finished\n");

    let result = h.reconciler().reconcile(&h.desired(TRUNK));

    assert_eq!(result.error_kind(), Some(ErrorKind::InspectionError));
    assert_eq!(result.plan, None);
    assert!(result.error.unwrap().message.contains("E155037"));
    assert!(h.svn.mutations().is_empty());
}

#[test]
fn test_export_into_absent_destination() {
    let h = Harness::new();

    let result = h.reconciler().reconcile(&h.desired(TRUNK).with_export(true));

    assert_eq!(result.plan, Some(ReconciliationPlan::Export { force: false }));
    assert_eq!(result.final_revision, Some(12));
    assert!(h.dest.to_native().join("README").exists());
    assert!(!h.dest.to_native().join(".svn").exists());
}

#[test]
fn test_existing_export_is_kept() {
    let h = Harness::new();
    let reconciler = h.reconciler();
    let desired = h.desired(TRUNK).with_export(true);
    reconciler.reconcile(&desired);
    h.svn.clear_invocations();

    let result = reconciler.reconcile(&desired);

    assert_eq!(result.plan, Some(ReconciliationPlan::NoOp));
    assert!(!result.changed);
    assert_eq!(result.final_revision, None);
    assert!(h.svn.invocations().is_empty());
}

#[test]
fn test_existing_export_is_refreshed_with_force() {
    let h = Harness::new();
    let reconciler = h.reconciler();
    reconciler.reconcile(&h.desired(TRUNK).with_export(true));

    let result = reconciler.reconcile(&h.desired(TRUNK).with_export(true).with_force(true));

    assert_eq!(result.plan, Some(ReconciliationPlan::Export { force: true }));
    assert!(result.changed);
}

#[test]
fn test_assess_does_not_mutate() {
    let h = Harness::new();

    let assessment = h.reconciler().assess(&h.desired(TRUNK)).unwrap();

    assert_eq!(assessment.plan, ReconciliationPlan::Checkout { force: false });
    assert!(h.svn.invocations().is_empty());
    assert!(!h.dest.to_native().exists());
}

#[test]
fn test_concurrent_reconciles_check_out_once() {
    let h = Harness::new();
    let desired = h.desired(TRUNK);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let reconciler = h.reconciler();
            let desired = desired.clone();
            scope.spawn(move || {
                let result = reconciler.reconcile(&desired);
                assert!(result.is_success(), "{:?}", result.error);
            });
        }
    });

    let checkouts = h
        .svn
        .operations()
        .into_iter()
        .filter(|op| *op == Operation::Checkout)
        .count();
    assert_eq!(checkouts, 1);
}

//! Check (dry-run) command implementation

use colored::Colorize;
use deploy_core::{ReconcileError, ReconciliationPlan, Reconciler, ResolvedRequest};
use serde_json::json;

use crate::error::Result;

/// Inspect the destination and show the plan without executing it.
pub fn run_check(request: &ResolvedRequest, json: bool) -> Result<()> {
    let desired = &request.desired;
    let assessment = Reconciler::for_request(desired, request.client.clone()).assess(desired)?;
    let plan = &assessment.plan;

    if json {
        let report = json!({
            "changed": plan.is_mutating(),
            "current": assessment.current,
            "plan": plan,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        println!("{}:  {}", "State".dimmed(), assessment.current);
        println!("{}:   {}", "Plan".dimmed(), plan);
        match plan {
            ReconciliationPlan::Fail { .. } => println!("{}", "Would fail".red().bold()),
            plan if plan.is_mutating() => println!("{}", "Would change the destination".yellow()),
            _ => println!("{}", "Nothing to do".green()),
        }
    }

    if let ReconciliationPlan::Fail { reason } = plan {
        return Err(ReconcileError::new(reason.into(), reason.to_string()).into());
    }
    Ok(())
}

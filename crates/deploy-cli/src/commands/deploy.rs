//! Deploy command implementation

use colored::Colorize;
use deploy_core::{ReconciliationResult, Reconciler, ResolvedRequest};

use crate::error::Result;

/// Reconcile the destination and report the outcome.
pub fn run_deploy(request: &ResolvedRequest, json: bool) -> Result<()> {
    let desired = &request.desired;
    let result = Reconciler::for_request(desired, request.client.clone()).reconcile(desired);

    if json {
        println!("{}", result.to_json());
    } else {
        print_result(desired.dest().as_str(), &result);
    }

    result.into_result()?;
    Ok(())
}

fn print_result(dest: &str, result: &ReconciliationResult) {
    let status = match (&result.error, result.changed) {
        (Some(_), _) => "failed".red().bold(),
        (None, true) => "changed".yellow().bold(),
        (None, false) => "unchanged".green().bold(),
    };
    println!("{} {}", status, dest.cyan());

    if let Some(plan) = &result.plan {
        println!("{}:     {}", "Plan".dimmed(), plan);
    }
    if let Some(revision) = result.final_revision {
        println!("{}: r{}", "Revision".dimmed(), revision);
    }
    if !result.stdout.trim().is_empty() {
        println!();
        print!("{}", result.stdout);
        if !result.stdout.ends_with('\n') {
            println!();
        }
    }
}

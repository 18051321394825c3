use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use std::time::Duration;
use triage_core::planner::{plan_with, DispatchPlan, PlanOptions};
use triage_core::types::ModeFlag;
use triage_dispatch::{CommandInvoker, Dispatcher, NoopInvoker, WorkerInvoker, WorkerResult};

use super::plan::load_items;

#[allow(clippy::too_many_arguments)]
pub fn run(
    items_path: &Path,
    worker_cmd: Option<&str>,
    worker_args: &[String],
    timeout_secs: Option<u64>,
    max_parallel: Option<usize>,
    sequential: bool,
    json: bool,
) -> anyhow::Result<()> {
    let items = load_items(items_path)?;
    let opts = PlanOptions {
        force_sequential: sequential,
        max_parallel,
    };
    let plan = plan_with(ModeFlag::Executing, items, &opts);

    if plan.is_empty() {
        println!("Nothing to dispatch.");
        return Ok(());
    }

    let results = match worker_cmd {
        Some(program) => dispatch(
            CommandInvoker::new(program, worker_args.to_vec()),
            &plan,
            timeout_secs,
        )?,
        None => dispatch(NoopInvoker, &plan, timeout_secs)?,
    };

    if json {
        print_json(&results)?;
    } else {
        for result in &results {
            let status = if result.success { "ok" } else { "FAILED" };
            print!(
                "{:<7} [{}] {} ({}ms)",
                status, result.role, result.description, result.duration_ms
            );
            match &result.failure_reason {
                Some(reason) => println!(" — {reason}"),
                None => println!(),
            }
        }
    }

    let failed = results.iter().filter(|r| !r.success).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} worker(s) failed", results.len());
    }
    Ok(())
}

fn dispatch<I: WorkerInvoker + 'static>(
    invoker: I,
    plan: &DispatchPlan,
    timeout_secs: Option<u64>,
) -> anyhow::Result<Vec<WorkerResult>> {
    let mut dispatcher = Dispatcher::new(invoker);
    if let Some(secs) = timeout_secs {
        dispatcher = dispatcher.with_timeout(Duration::from_secs(secs));
    }

    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    Ok(rt.block_on(dispatcher.execute(plan)))
}

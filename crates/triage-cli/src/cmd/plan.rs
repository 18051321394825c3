use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use triage_core::flags::parse_flags;
use triage_core::planner::{plan_with, DispatchStep, PlanOptions};
use triage_core::types::{ModeFlag, WorkItem};

pub fn run(
    mode: ModeFlag,
    request: Option<&str>,
    items_path: &Path,
    max_parallel: Option<usize>,
    sequential: bool,
    json: bool,
) -> anyhow::Result<()> {
    let items = load_items(items_path)?;

    let mut mode = mode;
    let mut opts = PlanOptions {
        force_sequential: sequential,
        max_parallel,
    };
    // Trailing flags on the request text adjust the plan: -q forces
    // sequential dispatch, -p/-s select the session mode.
    if let Some(text) = request {
        let (_, flags) = parse_flags(text);
        opts.force_sequential |= PlanOptions::from_flags(&flags).force_sequential;
        if let Some(requested) = flags.requested_mode() {
            mode = requested;
        }
    }

    let plan = plan_with(mode, items, &opts);

    if json {
        print_json(&plan)?;
        return Ok(());
    }

    if plan.is_empty() {
        println!("Nothing to dispatch.");
        return Ok(());
    }

    for (i, step) in plan.steps.iter().enumerate() {
        println!("Step {}: {}", i + 1, step.label());
        match step {
            DispatchStep::Local { items } => {
                for item in items {
                    println!("  - {}", item.description);
                }
            }
            DispatchStep::SingleDelegate { assignment } => {
                println!("  - [{}] {}", assignment.role, assignment.item.description);
            }
            DispatchStep::ParallelDelegates { assignments } => {
                for a in assignments {
                    println!("  - [{}] {}", a.role, a.item.description);
                }
            }
        }
    }

    Ok(())
}

pub fn load_items(path: &Path) -> anyhow::Result<Vec<WorkItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read items file '{}'", path.display()))?;
    let items: Vec<WorkItem> =
        serde_yaml::from_str(&content).context("failed to parse items file")?;
    Ok(items)
}

use crate::flags::{FlagSet, RequestFlag};
use crate::types::{ModeFlag, WorkItem, WorkerRole};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Assignment / DispatchStep / DispatchPlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub item: WorkItem,
    pub role: WorkerRole,
}

impl Assignment {
    fn for_item(item: WorkItem) -> Self {
        let role = item.role();
        Self { item, role }
    }
}

/// One step of a dispatch plan, processed strictly in plan order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DispatchStep {
    /// Hold the work in the caller's own context — no external invocation.
    Local { items: Vec<WorkItem> },
    /// One delegate, run to completion before the next step starts.
    SingleDelegate { assignment: Assignment },
    /// `assignments.len()` mutually independent delegates run concurrently.
    /// Invariant: pairwise-disjoint domain tags, no sequential dependencies.
    ParallelDelegates { assignments: Vec<Assignment> },
}

impl DispatchStep {
    pub fn label(&self) -> String {
        match self {
            DispatchStep::Local { items } => format!("local({})", items.len()),
            DispatchStep::SingleDelegate { .. } => "single_delegate".to_string(),
            DispatchStep::ParallelDelegates { assignments } => {
                format!("parallel_delegates({})", assignments.len())
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchPlan {
    pub steps: Vec<DispatchStep>,
}

impl DispatchPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total number of work items across all steps.
    pub fn item_count(&self) -> usize {
        self.steps
            .iter()
            .map(|s| match s {
                DispatchStep::Local { items } => items.len(),
                DispatchStep::SingleDelegate { .. } => 1,
                DispatchStep::ParallelDelegates { assignments } => assignments.len(),
            })
            .sum()
    }
}

// ---------------------------------------------------------------------------
// PlanOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Never emit a parallel group, even for independent items.
    pub force_sequential: bool,
    /// Cap on parallel group size; oversized groups split into consecutive
    /// parallel steps. `None` = unlimited.
    pub max_parallel: Option<usize>,
}

impl PlanOptions {
    pub fn from_flags(flags: &FlagSet) -> Self {
        Self {
            force_sequential: flags.contains(RequestFlag::Sequential),
            max_parallel: None,
        }
    }
}

// ---------------------------------------------------------------------------
// plan()
// ---------------------------------------------------------------------------

/// Produce a dispatch plan for a batch of work items.
///
/// Planning mode always holds the work locally — the planner never
/// recommends spawning workers while the host is only gathering context.
/// Empty input yields an empty plan, not an error.
pub fn plan(mode: ModeFlag, items: Vec<WorkItem>) -> DispatchPlan {
    plan_with(mode, items, &PlanOptions::default())
}

/// [`plan`] with explicit options.
///
/// Executing mode partitions items greedily, preserving input order: an item
/// with a sequential dependency flushes the open group and dispatches alone;
/// an item whose domain tags intersect the open group starts a new group.
/// Flushed groups of one item become single delegates, larger groups become
/// parallel steps. Parallel dispatch is only ever produced for items with
/// pairwise-disjoint domains — output of one unit must never feed another in
/// the same group.
pub fn plan_with(mode: ModeFlag, items: Vec<WorkItem>, opts: &PlanOptions) -> DispatchPlan {
    if items.is_empty() {
        return DispatchPlan::default();
    }

    if mode == ModeFlag::Planning {
        return DispatchPlan {
            steps: vec![DispatchStep::Local { items }],
        };
    }

    let mut steps = Vec::new();
    let mut group: Vec<WorkItem> = Vec::new();

    for item in items {
        if item.sequential_dependency || opts.force_sequential {
            flush_group(&mut steps, &mut group, opts);
            steps.push(DispatchStep::SingleDelegate {
                assignment: Assignment::for_item(item),
            });
        } else if group.iter().all(|g| item.independent_of(g)) {
            group.push(item);
        } else {
            flush_group(&mut steps, &mut group, opts);
            group.push(item);
        }
    }
    flush_group(&mut steps, &mut group, opts);

    DispatchPlan { steps }
}

fn flush_group(steps: &mut Vec<DispatchStep>, group: &mut Vec<WorkItem>, opts: &PlanOptions) {
    if group.is_empty() {
        return;
    }
    let items = std::mem::take(group);
    let cap = opts.max_parallel.unwrap_or(usize::MAX).max(1);

    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        let chunk: Vec<WorkItem> = items.by_ref().take(cap).collect();
        if let [item] = &chunk[..] {
            steps.push(DispatchStep::SingleDelegate {
                assignment: Assignment::for_item(item.clone()),
            });
        } else {
            steps.push(DispatchStep::ParallelDelegates {
                assignments: chunk.into_iter().map(Assignment::for_item).collect(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use std::sync::Arc;
use std::time::{Duration, Instant};

use triage_core::planner::{Assignment, DispatchPlan, DispatchStep};

use crate::invoker::{WorkerInvoker, WorkerResult};

// ─── Dispatcher ───────────────────────────────────────────────────────────

/// Executes a [`DispatchPlan`] against a worker invocation collaborator.
///
/// - `Local` steps run through [`WorkerInvoker::run_local`] — no external
///   invocation.
/// - `SingleDelegate` steps run strictly one after another; the next
///   invocation starts only after the previous completed.
/// - `ParallelDelegates` steps spawn all invocations without waiting
///   between them, then join. Results preserve assignment order regardless
///   of completion order, and one failure never cancels siblings.
///
/// Workers share no mutable state by construction — each task owns its
/// immutable [`WorkItem`] — so no locking is involved.
pub struct Dispatcher<I> {
    invoker: Arc<I>,
    timeout: Option<Duration>,
}

impl<I: WorkerInvoker + 'static> Dispatcher<I> {
    pub fn new(invoker: I) -> Self {
        Self {
            invoker: Arc::new(invoker),
            timeout: None,
        }
    }

    /// Per-worker time budget. An elapsed timeout is recorded as a failed
    /// [`WorkerResult`] instead of blocking the dispatcher.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Execute the plan in step order, returning one result per work item.
    pub async fn execute(&self, plan: &DispatchPlan) -> Vec<WorkerResult> {
        let mut results = Vec::with_capacity(plan.item_count());

        for step in &plan.steps {
            match step {
                DispatchStep::Local { items } => {
                    for item in items {
                        results.push(self.invoker.run_local(item).await);
                    }
                }
                DispatchStep::SingleDelegate { assignment } => {
                    tracing::debug!(item = %assignment.item.id, "dispatching single delegate");
                    results.push(self.invoke_bounded(assignment).await);
                }
                DispatchStep::ParallelDelegates { assignments } => {
                    tracing::debug!(n = assignments.len(), "dispatching parallel delegates");
                    results.extend(self.fan_out(assignments).await);
                }
            }
        }

        results
    }

    /// Spawn every assignment, then join. Handles are awaited in assignment
    /// order, which fixes the aggregate order independent of completion
    /// order.
    async fn fan_out(&self, assignments: &[Assignment]) -> Vec<WorkerResult> {
        let mut handles = Vec::with_capacity(assignments.len());

        for assignment in assignments {
            let invoker = Arc::clone(&self.invoker);
            let timeout = self.timeout;
            let assignment = assignment.clone();
            handles.push(tokio::spawn(async move {
                invoke_with_timeout(&*invoker, &assignment, timeout).await
            }));
        }

        let joined = futures::future::join_all(handles).await;
        let mut results = Vec::with_capacity(joined.len());
        for (outcome, assignment) in joined.into_iter().zip(assignments) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!(item = %assignment.item.id, error = %e, "worker task panicked");
                    results.push(join_failure(assignment, e.to_string()));
                }
            }
        }
        results
    }

    async fn invoke_bounded(&self, assignment: &Assignment) -> WorkerResult {
        invoke_with_timeout(&*self.invoker, assignment, self.timeout).await
    }
}

async fn invoke_with_timeout<I: WorkerInvoker + ?Sized>(
    invoker: &I,
    assignment: &Assignment,
    timeout: Option<Duration>,
) -> WorkerResult {
    let started = Instant::now();
    match timeout {
        None => invoker.invoke(&assignment.item, &assignment.role).await,
        Some(limit) => {
            match tokio::time::timeout(limit, invoker.invoke(&assignment.item, &assignment.role))
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        item = %assignment.item.id,
                        timeout_ms = limit.as_millis() as u64,
                        "worker timed out"
                    );
                    WorkerResult::failure(
                        &assignment.item,
                        &assignment.role,
                        format!("timed out after {}ms", limit.as_millis()),
                        started,
                    )
                }
            }
        }
    }
}

fn join_failure(assignment: &Assignment, reason: String) -> WorkerResult {
    WorkerResult::failure(
        &assignment.item,
        &assignment.role,
        format!("worker task failed: {reason}"),
        Instant::now(),
    )
}

// ─── Tests ────────────────────────────────────────────────────────────────

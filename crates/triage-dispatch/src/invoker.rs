use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use triage_core::types::{WorkItem, WorkerRole};
use uuid::Uuid;

use crate::error::{DispatchError, Result};

// ─── WorkerResult ─────────────────────────────────────────────────────────

/// Terminal outcome of one worker invocation.
///
/// Failures are recorded here, never raised: one failed worker must not
/// abort its siblings, and the caller decides whether a partial failure is
/// fatal to the overall task.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerResult {
    pub item_id: Uuid,
    pub description: String,
    pub role: WorkerRole,
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub duration_ms: u64,
}

impl WorkerResult {
    pub fn success(item: &WorkItem, role: &WorkerRole, output: String, started: Instant) -> Self {
        Self {
            item_id: item.id,
            description: item.description.clone(),
            role: role.clone(),
            success: true,
            output,
            failure_reason: None,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    pub fn failure(item: &WorkItem, role: &WorkerRole, reason: String, started: Instant) -> Self {
        Self {
            item_id: item.id,
            description: item.description.clone(),
            role: role.clone(),
            success: false,
            output: String::new(),
            failure_reason: Some(reason),
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

// ─── WorkerInvoker ────────────────────────────────────────────────────────

/// Worker invocation collaborator: given a work item and a role hint,
/// perform the work and report a [`WorkerResult`].
///
/// `run_local` handles `Local` plan steps. The default implementation
/// succeeds in the caller's context without spawning anything; hosts
/// override it when held-back work is real.
#[async_trait]
pub trait WorkerInvoker: Send + Sync {
    async fn invoke(&self, item: &WorkItem, role: &WorkerRole) -> WorkerResult;

    async fn run_local(&self, item: &WorkItem) -> WorkerResult {
        let started = Instant::now();
        WorkerResult::success(
            item,
            &WorkerRole("local".to_string()),
            "held in caller context".to_string(),
            started,
        )
    }
}

// ─── NoopInvoker ──────────────────────────────────────────────────────────

/// Dry-run invoker: marks every assignment successful without performing
/// any work. Stands in when no worker command is configured.
pub struct NoopInvoker;

#[async_trait]
impl WorkerInvoker for NoopInvoker {
    async fn invoke(&self, item: &WorkItem, role: &WorkerRole) -> WorkerResult {
        WorkerResult::success(
            item,
            role,
            "dry run, no worker configured".to_string(),
            Instant::now(),
        )
    }
}

// ─── CommandInvoker ───────────────────────────────────────────────────────

/// A [`WorkerInvoker`] backed by an external command, spawned once per
/// assignment.
///
/// The work description is written to the worker's stdin; stdout becomes the
/// result output. The role hint is passed in `TRIAGE_WORKER_ROLE`. A nonzero
/// exit status is a per-item failure with stderr as the reason.
pub struct CommandInvoker {
    program: String,
    args: Vec<String>,
}

impl CommandInvoker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    async fn spawn_worker(
        &self,
        item: &WorkItem,
        role: &WorkerRole,
    ) -> Result<std::process::Output> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("TRIAGE_WORKER_ROLE", role.as_str())
            .env("TRIAGE_ITEM_ID", item.id.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out invocation drops this future mid-wait; the worker
            // must not outlive it.
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DispatchError::Process("stdin not captured".into()))?;
        stdin.write_all(item.description.as_bytes()).await?;
        // Drop closes stdin so the worker sees EOF.
        drop(stdin);

        Ok(child.wait_with_output().await?)
    }
}

#[async_trait]
impl WorkerInvoker for CommandInvoker {
    async fn invoke(&self, item: &WorkItem, role: &WorkerRole) -> WorkerResult {
        let started = Instant::now();
        tracing::debug!(item = %item.id, role = %role, program = %self.program, "spawning worker");

        match self.spawn_worker(item, role).await {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
                WorkerResult::success(item, role, stdout, started)
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
                let reason = if stderr.is_empty() {
                    format!("worker exited with {}", output.status)
                } else {
                    stderr
                };
                tracing::warn!(item = %item.id, %reason, "worker failed");
                WorkerResult::failure(item, role, reason, started)
            }
            Err(e) => {
                tracing::warn!(item = %item.id, error = %e, "failed to spawn worker");
                WorkerResult::failure(item, role, format!("failed to spawn worker: {e}"), started)
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_run_local_succeeds_without_invocation() {
        struct Never;

        #[async_trait]
        impl WorkerInvoker for Never {
            async fn invoke(&self, _item: &WorkItem, _role: &WorkerRole) -> WorkerResult {
                panic!("local work must not be delegated");
            }
        }

        let item = WorkItem::new("keep this here");
        let result = Never.run_local(&item).await;
        assert!(result.success);
        assert_eq!(result.item_id, item.id);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_invoker_pipes_description_through_stdin() {
        let invoker = CommandInvoker::new("cat", vec![]);
        let item = WorkItem::new("echo me back").with_tags(["backend"]);
        let role = item.role();

        let result = invoker.invoke(&item, &role).await;
        assert!(result.success, "reason: {:?}", result.failure_reason);
        assert_eq!(result.output, "echo me back");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_invoker_records_nonzero_exit_as_failure() {
        let invoker = CommandInvoker::new("false", vec![]);
        let item = WorkItem::new("doomed");
        let role = item.role();

        let result = invoker.invoke(&item, &role).await;
        assert!(!result.success);
        assert!(result.failure_reason.is_some());
    }

    #[tokio::test]
    async fn missing_program_is_a_per_item_failure() {
        let invoker = CommandInvoker::new("definitely-not-a-real-binary-xyz", vec![]);
        let item = WorkItem::new("x");
        let role = item.role();

        let result = invoker.invoke(&item, &role).await;
        assert!(!result.success);
        assert!(result
            .failure_reason
            .as_deref()
            .unwrap_or("")
            .contains("failed to spawn"));
    }
}

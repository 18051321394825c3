//! `triage-dispatch` — async executor for triage dispatch plans.
//!
//! Takes a [`DispatchPlan`](triage_core::planner::DispatchPlan) produced by
//! the delegation planner and drives it against a worker invocation
//! collaborator:
//!
//! ```text
//! DispatchPlan
//!     │
//!     ▼
//! Dispatcher      ← strict sequencing for single delegates,
//!     │             spawn-then-join barrier for parallel groups
//!     ▼
//! WorkerInvoker   ← collaborator trait; CommandInvoker spawns an
//!     │             external command per assignment
//!     ▼
//! WorkerResult    ← per-item success/failure, never escalated
//! ```
//!
//! Failure of one parallel worker never cancels its siblings; the caller
//! decides whether a partial failure is fatal. An optional per-worker
//! timeout converts a hung worker into a failed result.

pub mod dispatcher;
pub mod error;
pub mod invoker;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result};
pub use invoker::{CommandInvoker, NoopInvoker, WorkerInvoker, WorkerResult};

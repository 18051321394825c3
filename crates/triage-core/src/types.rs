use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// CategoryId
// ---------------------------------------------------------------------------

/// A classification bucket with an associated output schema.
///
/// Closed per deployment. The classifier never branches on this enum — it
/// iterates the rule table — so adding a variant touches only this file plus
/// the default rule and template tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    BugReport,
    FeatureRequest,
    Documentation,
    ModelBehavior,
}

impl CategoryId {
    pub fn all() -> &'static [CategoryId] {
        &[
            CategoryId::BugReport,
            CategoryId::FeatureRequest,
            CategoryId::Documentation,
            CategoryId::ModelBehavior,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryId::BugReport => "bug_report",
            CategoryId::FeatureRequest => "feature_request",
            CategoryId::Documentation => "documentation",
            CategoryId::ModelBehavior => "model_behavior",
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CategoryId {
    type Err = crate::error::TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bug_report" | "bug-report" | "bug" => Ok(CategoryId::BugReport),
            "feature_request" | "feature-request" | "feature" => Ok(CategoryId::FeatureRequest),
            "documentation" | "docs" => Ok(CategoryId::Documentation),
            "model_behavior" | "model-behavior" | "model" => Ok(CategoryId::ModelBehavior),
            _ => Err(crate::error::TriageError::UnknownCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ModeFlag
// ---------------------------------------------------------------------------

/// Host-session phase flag. Owned by the surrounding session and passed
/// explicitly into `plan` — the planner never reads ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeFlag {
    Planning,
    Executing,
}

impl ModeFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            ModeFlag::Planning => "planning",
            ModeFlag::Executing => "executing",
        }
    }
}

impl fmt::Display for ModeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModeFlag {
    type Err = crate::error::TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(ModeFlag::Planning),
            "executing" => Ok(ModeFlag::Executing),
            _ => Err(crate::error::TriageError::InvalidMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// WorkerRole
// ---------------------------------------------------------------------------

/// Hint passed to the worker invocation collaborator alongside a work item.
/// Derived from the item's primary domain tag; "generalist" when untagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRole(pub String);

impl WorkerRole {
    pub fn generalist() -> Self {
        WorkerRole("generalist".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// WorkItem
// ---------------------------------------------------------------------------

/// One unit of delegatable work.
///
/// `domain_tags` drive the planner's independence check: items sharing a tag
/// are coupled and never dispatched in the same parallel group.
/// `sequential_dependency` marks an item whose input is the output of an
/// earlier item in the same batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub description: String,
    #[serde(default)]
    pub domain_tags: BTreeSet<String>,
    #[serde(default)]
    pub sequential_dependency: bool,
}

impl WorkItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            domain_tags: BTreeSet::new(),
            sequential_dependency: false,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn sequential(mut self) -> Self {
        self.sequential_dependency = true;
        self
    }

    /// Role hint for the worker collaborator: the first domain tag in
    /// lexicographic order, or generalist when the item is untagged.
    pub fn role(&self) -> WorkerRole {
        self.domain_tags
            .iter()
            .next()
            .map(|t| WorkerRole(t.clone()))
            .unwrap_or_else(WorkerRole::generalist)
    }

    /// True if this item can share a parallel group with `other`.
    pub fn independent_of(&self, other: &WorkItem) -> bool {
        !self.sequential_dependency
            && !other.sequential_dependency
            && self.domain_tags.is_disjoint(&other.domain_tags)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

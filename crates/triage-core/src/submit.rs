use crate::error::{Result, TriageError};
use crate::render::StructuredDocument;
use crate::template::FieldSchema;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AuthStatus / SubmitReceipt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Identifier the target hands back, typically a URL.
    pub location: String,
}

// ---------------------------------------------------------------------------
// SubmissionTarget
// ---------------------------------------------------------------------------

/// External tracker collaborator (issue/PR client) that accepts a finalized
/// document.
pub trait SubmissionTarget {
    fn auth_status(&self) -> AuthStatus;
    fn submit(&self, doc: &StructuredDocument) -> Result<SubmitReceipt>;
}

// ---------------------------------------------------------------------------
// submit_document()
// ---------------------------------------------------------------------------

/// Verify preconditions and submit.
///
/// Every required field in the schema must be non-empty, and the target must
/// report an authenticated session before the call goes out. Authentication
/// failure is a precondition violation surfaced immediately with a
/// remediation hint — never retried silently.
pub fn submit_document(
    target: &dyn SubmissionTarget,
    doc: &StructuredDocument,
    schema: &FieldSchema,
) -> Result<SubmitReceipt> {
    for spec in schema.required_fields() {
        let satisfied = doc
            .field(&spec.name)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        if !satisfied {
            return Err(TriageError::MissingRequiredField {
                field: spec.name.clone(),
                category: doc.category.to_string(),
            });
        }
    }

    if target.auth_status() != AuthStatus::Authenticated {
        return Err(TriageError::PreconditionFailed {
            reason: "submission target session is not authenticated".to_string(),
            remediation: "authenticate with the tracker CLI and retry".to_string(),
        });
    }

    target.submit(doc)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

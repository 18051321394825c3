use crate::context::ContextSource;
use crate::error::{Result, TriageError};
use crate::template::FieldSchema;
use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// StructuredDocument
// ---------------------------------------------------------------------------

/// A rendered, fixed-schema document ready for the submission collaborator.
///
/// Fields are ordered as the category's schema declares them. Every required
/// field holds a non-empty value — `render` refuses to produce a document
/// otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub title: String,
    pub category: CategoryId,
    pub fields: Vec<(String, String)>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl StructuredDocument {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Markdown body: one `### section` per field, in schema order.
    pub fn body_markdown(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.fields {
            out.push_str("### ");
            out.push_str(name);
            out.push_str("\n\n");
            out.push_str(value);
            out.push_str("\n\n");
        }
        out.trim_end().to_string()
    }
}

// ---------------------------------------------------------------------------
// Title composition
// ---------------------------------------------------------------------------

/// Longest summary kept verbatim; beyond that the title is cut on word
/// boundaries. Matches the source material's 5-10 word guideline.
const MAX_SUMMARY_WORDS: usize = 10;

/// Compose `{prefix}{summary}`, truncating the summary to
/// [`MAX_SUMMARY_WORDS`] whole words. Pure function.
pub fn compose_title(prefix: &str, summary: &str) -> String {
    let words: Vec<&str> = summary.split_whitespace().collect();
    let kept = if words.len() > MAX_SUMMARY_WORDS {
        words[..MAX_SUMMARY_WORDS].join(" ")
    } else {
        words.join(" ")
    };
    format!("{prefix}{kept}")
}

// ---------------------------------------------------------------------------
// render()
// ---------------------------------------------------------------------------

/// Fill a category's schema from extracted values and context facts.
///
/// Resolution order per field: caller-supplied extracted value (if
/// non-empty) → context fact via the field's `context_key` (missing fact
/// degrades to `"unknown"`) → the field's default → error if required.
/// Missing required values block rendering; they are never silently
/// defaulted or dropped.
pub fn render(
    category: CategoryId,
    schema: &FieldSchema,
    title: String,
    extracted: &BTreeMap<String, String>,
    context: &dyn ContextSource,
) -> Result<StructuredDocument> {
    let mut fields = Vec::with_capacity(schema.fields.len());

    for spec in &schema.fields {
        let extracted_value = extracted
            .get(&spec.name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());

        let value = match extracted_value {
            Some(v) => v.to_string(),
            None => match &spec.context_key {
                Some(key) => context
                    .fact(key)
                    .unwrap_or_else(|| "unknown".to_string()),
                None => match &spec.default {
                    Some(d) => d.clone(),
                    None if spec.required => {
                        return Err(TriageError::MissingRequiredField {
                            field: spec.name.clone(),
                            category: category.to_string(),
                        });
                    }
                    None => "None".to_string(),
                },
            },
        };

        fields.push((spec.name.clone(), value));
    }

    Ok(StructuredDocument {
        title,
        category,
        fields,
        created_at: Utc::now(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

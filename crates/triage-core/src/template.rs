use crate::error::{Result, TriageError};
use crate::types::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// FieldSpec / FieldSchema
// ---------------------------------------------------------------------------

/// One named section in a category's output schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    /// Guidance for whoever extracts the value from the raw request.
    #[serde(default)]
    pub hint: String,
    /// Value used when nothing was extracted. Required fields without a
    /// default block rendering instead of silently defaulting.
    #[serde(default)]
    pub default: Option<String>,
    /// Pull the value from the context-fact collaborator under this key.
    #[serde(default)]
    pub context_key: Option<String>,
}

impl FieldSpec {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            hint: String::new(),
            default: None,
            context_key: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn hint(mut self, hint: &str) -> Self {
        self.hint = hint.to_string();
        self
    }

    fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    fn from_context(mut self, key: &str) -> Self {
        self.context_key = Some(key.to_string());
        self
    }
}

/// Ordered field list for one category. Field order is stable and defines
/// the output document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub fields: Vec<FieldSpec>,
}

impl FieldSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

// ---------------------------------------------------------------------------
// TemplateRegistry
// ---------------------------------------------------------------------------

/// Category → field schema mapping. Built-in defaults cover every category;
/// deployments override individual schemas via config.
pub struct TemplateRegistry {
    schemas: BTreeMap<CategoryId, FieldSchema>,
}

impl TemplateRegistry {
    pub fn new(schemas: BTreeMap<CategoryId, FieldSchema>) -> Self {
        Self { schemas }
    }

    pub fn schema(&self, category: CategoryId) -> Result<&FieldSchema> {
        self.schemas
            .get(&category)
            .ok_or_else(|| TriageError::NoSchemaForCategory(category.to_string()))
    }

    pub fn categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.schemas.keys().copied()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new(default_schemas())
    }
}

// ---------------------------------------------------------------------------
// Default schemas
// ---------------------------------------------------------------------------

pub fn default_schemas() -> BTreeMap<CategoryId, FieldSchema> {
    let mut schemas = BTreeMap::new();

    schemas.insert(
        CategoryId::BugReport,
        FieldSchema {
            fields: vec![
                FieldSpec::new("What went wrong?")
                    .required()
                    .hint("one-paragraph description of the failure"),
                FieldSpec::new("Steps to reproduce")
                    .required()
                    .hint("numbered list, smallest failing case"),
                FieldSpec::new("Expected behavior")
                    .hint("what should have happened")
                    .default_value("None"),
                FieldSpec::new("Environment")
                    .hint("tool version, OS, terminal")
                    .from_context("environment"),
                FieldSpec::new("Severity")
                    .hint("low | medium | high | critical")
                    .default_value("Medium"),
            ],
        },
    );

    schemas.insert(
        CategoryId::FeatureRequest,
        FieldSchema {
            fields: vec![
                FieldSpec::new("Problem statement")
                    .required()
                    .hint("what the user cannot do today"),
                FieldSpec::new("Proposed solution")
                    .hint("sketch of the desired behavior")
                    .default_value("None"),
                FieldSpec::new("Alternatives considered")
                    .hint("workarounds tried, other designs")
                    .default_value("None"),
                FieldSpec::new("Priority")
                    .hint("low | medium | high")
                    .default_value("Medium"),
            ],
        },
    );

    schemas.insert(
        CategoryId::Documentation,
        FieldSchema {
            fields: vec![
                FieldSpec::new("Affected page or section")
                    .required()
                    .hint("URL or doc path"),
                FieldSpec::new("What is wrong or missing?")
                    .required()
                    .hint("quote the misleading text if possible"),
                FieldSpec::new("Suggested fix")
                    .hint("proposed wording")
                    .default_value("None"),
            ],
        },
    );

    schemas.insert(
        CategoryId::ModelBehavior,
        FieldSchema {
            fields: vec![
                FieldSpec::new("What did the model do?")
                    .required()
                    .hint("observed behavior, verbatim where possible"),
                FieldSpec::new("What did you expect?")
                    .required()
                    .hint("the behavior you wanted instead"),
                FieldSpec::new("Prompt or transcript")
                    .hint("minimal reproduction, redact secrets")
                    .default_value("None"),
                FieldSpec::new("Environment")
                    .hint("tool version, OS, terminal")
                    .from_context("environment"),
            ],
        },
    );

    schemas
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

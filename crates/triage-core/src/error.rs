use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("invalid mode '{0}': expected 'planning' or 'executing'")]
    InvalidMode(String),

    #[error("no classification rules registered for category '{0}'")]
    NoRulesForCategory(String),

    #[error("no field schema registered for category '{0}'")]
    NoSchemaForCategory(String),

    #[error("missing required field '{field}' for category '{category}'")]
    MissingRequiredField { field: String, category: String },

    #[error("precondition failed: {reason} ({remediation})")]
    PreconditionFailed { reason: String, remediation: String },

    #[error("disambiguation rejected: {0}")]
    DisambiguationRejected(String),

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    #[error("invalid intent pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;

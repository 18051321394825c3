use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// ContextSource
// ---------------------------------------------------------------------------

/// Environment-fact collaborator consumed by the renderer.
///
/// Absence of a fact is not an error: the renderer degrades missing facts to
/// a literal `"unknown"` rather than blocking.
pub trait ContextSource {
    fn fact(&self, key: &str) -> Option<String>;
}

impl ContextSource for BTreeMap<String, String> {
    fn fact(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

// ---------------------------------------------------------------------------
// EnvContext
// ---------------------------------------------------------------------------

/// Context facts gathered from the running process environment.
///
/// `tool_version` is supplied by the host (the version of the tool the
/// request is about, not of this crate); `os` and `terminal` are probed
/// locally.
pub struct EnvContext {
    tool_version: Option<String>,
}

impl EnvContext {
    pub fn new(tool_version: Option<String>) -> Self {
        Self { tool_version }
    }

    /// The composite "environment" fact folded into reserved template
    /// fields (e.g. a bug report's Environment block).
    fn environment_line(&self) -> String {
        let version = self.tool_version.as_deref().unwrap_or("unknown");
        let terminal = std::env::var("TERM_PROGRAM")
            .or_else(|_| std::env::var("TERM"))
            .unwrap_or_else(|_| "unknown".to_string());
        format!(
            "version: {version}, os: {}, terminal: {terminal}",
            std::env::consts::OS
        )
    }
}

impl ContextSource for EnvContext {
    fn fact(&self, key: &str) -> Option<String> {
        match key {
            "tool_version" => self.tool_version.clone(),
            "os" => Some(std::env::consts::OS.to_string()),
            "terminal" => std::env::var("TERM_PROGRAM")
                .or_else(|_| std::env::var("TERM"))
                .ok(),
            "environment" => Some(self.environment_line()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

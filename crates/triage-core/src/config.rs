use crate::classifier::Classifier;
use crate::error::{Result, TriageError};
use crate::rules::{default_rules, ClassificationRule};
use crate::template::{default_schemas, FieldSchema, TemplateRegistry};
use crate::types::CategoryId;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Project config filename, looked up at the project root.
pub const CONFIG_FILE: &str = "triage.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ConfigFile (on-disk shape)
// ---------------------------------------------------------------------------

/// Partial config as written on disk. Anything omitted falls through to the
/// layer below (project → global → built-in defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub rules: Vec<ClassificationRule>,
    #[serde(default)]
    pub templates: BTreeMap<CategoryId, FieldSchema>,
}

// ---------------------------------------------------------------------------
// RouterConfig
// ---------------------------------------------------------------------------

/// Merged rule table and template registry.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub rules: Vec<ClassificationRule>,
    pub templates: BTreeMap<CategoryId, FieldSchema>,
}

impl RouterConfig {
    pub fn defaults() -> Self {
        Self {
            rules: default_rules(),
            templates: default_schemas(),
        }
    }

    /// Load the merged config: built-in defaults, overlaid by the global
    /// table at `~/.triage/config.yaml`, overlaid by `triage.yaml` at the
    /// project root. Per category, the topmost layer that defines rules or
    /// a template wins. Missing files are not errors.
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = Self::defaults();

        if let Some(global) = global_config_path() {
            if global.exists() {
                config.overlay(read_config_file(&global)?);
            }
        }

        let project = root.join(CONFIG_FILE);
        if project.exists() {
            config.overlay(read_config_file(&project)?);
        }

        Ok(config)
    }

    /// Overlay a partial config file: categories it defines rules for have
    /// their rules replaced wholesale; templates replace per category.
    fn overlay(&mut self, file: ConfigFile) {
        if !file.rules.is_empty() {
            let overridden: Vec<CategoryId> = file.rules.iter().map(|r| r.category).collect();
            self.rules.retain(|r| !overridden.contains(&r.category));
            self.rules.extend(file.rules);
        }
        for (category, schema) in file.templates {
            self.templates.insert(category, schema);
        }
    }

    /// Validate the merged config. Errors are invariant violations (a
    /// category without rules or schema, a regex that does not compile);
    /// warnings flag suspicious but workable data.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for &category in CategoryId::all() {
            if !self.rules.iter().any(|r| r.category == category) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("category '{category}' has no classification rules"),
                });
            }
            if !self.templates.contains_key(&category) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("category '{category}' has no field schema"),
                });
            }
        }

        for rule in &self.rules {
            if rule.keywords.is_empty() && rule.intent_patterns.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "rule for '{}' has no keywords or intent patterns and can never match",
                        rule.category
                    ),
                });
            }
            for pattern in &rule.intent_patterns {
                if let Err(e) = RegexBuilder::new(pattern).case_insensitive(true).build() {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!("invalid intent pattern '{pattern}': {e}"),
                    });
                }
            }
        }

        warnings
    }

    pub fn classifier(&self) -> Result<Classifier> {
        Classifier::new(self.rules.clone())
    }

    pub fn registry(&self) -> TemplateRegistry {
        TemplateRegistry::new(self.templates.clone())
    }

    /// Title prefix for a category from the merged rule table.
    pub fn title_prefix(&self, category: CategoryId) -> Result<&str> {
        self.rules
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.title_prefix.as_str())
            .ok_or_else(|| TriageError::NoRulesForCategory(category.to_string()))
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// `~/.triage/config.yaml`, or `None` when no home directory is resolvable.
pub fn global_config_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(".triage").join("config.yaml"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_validate_clean() {
        let warnings = RouterConfig::defaults().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn load_without_files_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = RouterConfig::load(dir.path()).unwrap();
        assert_eq!(config.rules.len(), default_rules().len());
    }

    #[test]
    fn project_file_replaces_rules_per_category() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
rules:
  - category: bug_report
    keywords: ["kaboom"]
    title_prefix: "[BOOM] "
"#,
        )
        .unwrap();

        let config = RouterConfig::load(dir.path()).unwrap();
        let bug_rules: Vec<&ClassificationRule> = config
            .rules
            .iter()
            .filter(|r| r.category == CategoryId::BugReport)
            .collect();
        assert_eq!(bug_rules.len(), 1);
        assert_eq!(bug_rules[0].keywords, vec!["kaboom"]);
        assert_eq!(config.title_prefix(CategoryId::BugReport).unwrap(), "[BOOM] ");

        // Other categories keep their defaults.
        assert!(config
            .rules
            .iter()
            .any(|r| r.category == CategoryId::Documentation));
    }

    #[test]
    fn project_template_override_keeps_other_schemas() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
templates:
  documentation:
    fields:
      - name: "Where?"
        required: true
"#,
        )
        .unwrap();

        let config = RouterConfig::load(dir.path()).unwrap();
        let registry = config.registry();
        let docs = registry.schema(CategoryId::Documentation).unwrap();
        assert_eq!(docs.fields.len(), 1);
        assert_eq!(docs.fields[0].name, "Where?");
        assert!(registry.schema(CategoryId::BugReport).is_ok());
    }

    #[test]
    fn validate_flags_uncoverable_category() {
        let mut config = RouterConfig::defaults();
        config.rules.retain(|r| r.category != CategoryId::ModelBehavior);

        let warnings = config.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("model_behavior")));
    }

    #[test]
    fn validate_flags_bad_pattern_and_empty_rule() {
        let mut config = RouterConfig::defaults();
        config.rules.push(ClassificationRule {
            category: CategoryId::BugReport,
            keywords: vec![],
            intent_patterns: vec!["([".to_string()],
            title_prefix: "[BUG] ".to_string(),
        });

        let warnings = config.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("invalid intent pattern")));
    }
}

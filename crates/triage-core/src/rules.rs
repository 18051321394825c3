use crate::types::CategoryId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ClassificationRule
// ---------------------------------------------------------------------------

/// One keyword/pattern trigger mapping free text to a category.
///
/// `keywords` match as case-insensitive substrings; `intent_patterns` are
/// case-insensitive regexes for phrasings a keyword list can't capture.
/// A rule matches when at least one keyword or pattern is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub category: CategoryId,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub intent_patterns: Vec<String>,
    pub title_prefix: String,
}

// ---------------------------------------------------------------------------
// Default rule table
// ---------------------------------------------------------------------------

/// The built-in rule table. Declaration order is the documented tie-listing
/// order for ambiguous classifications.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule {
            category: CategoryId::BugReport,
            keywords: strings(&[
                "crash",
                "error",
                "broken",
                "bug",
                "fails",
                "failure",
                "freeze",
                "hangs",
                "doesn't work",
                "does not work",
                "unexpected",
            ]),
            intent_patterns: strings(&[r"stopped\s+working", r"used\s+to\s+work"]),
            title_prefix: "[BUG] ".to_string(),
        },
        ClassificationRule {
            category: CategoryId::FeatureRequest,
            keywords: strings(&[
                "feature",
                "enhancement",
                "would be nice",
                "wish",
                "add support",
                "please add",
                "improve",
            ]),
            intent_patterns: strings(&[
                r"can\s+you\s+add",
                r"it\s+would\s+help\s+if",
                r"support\s+for\s+\w+",
            ]),
            title_prefix: "[FEATURE] ".to_string(),
        },
        ClassificationRule {
            category: CategoryId::Documentation,
            keywords: strings(&[
                "docs",
                "documentation",
                "readme",
                "typo",
                "unclear",
                "misleading",
                "undocumented",
            ]),
            intent_patterns: strings(&[r"docs?\s+(say|state|claim)"]),
            title_prefix: "[DOCS] ".to_string(),
        },
        ClassificationRule {
            category: CategoryId::ModelBehavior,
            keywords: strings(&[
                "hallucinat",
                "refuses",
                "refusal",
                "wrong answer",
                "ignores instructions",
                "made up",
                "model behavior",
            ]),
            intent_patterns: strings(&[r"(model|assistant)\s+(said|claimed|invented)"]),
            title_prefix: "[MODEL] ".to_string(),
        },
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_at_least_one_rule() {
        let rules = default_rules();
        for &cat in CategoryId::all() {
            assert!(
                rules.iter().any(|r| r.category == cat),
                "no rule for {cat}"
            );
        }
    }

    #[test]
    fn default_patterns_compile() {
        for rule in default_rules() {
            for pattern in &rule.intent_patterns {
                assert!(
                    regex::RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .build()
                        .is_ok(),
                    "bad pattern: {pattern}"
                );
            }
        }
    }
}

use crate::error::{Result, TriageError};
use crate::rules::ClassificationRule;
use crate::types::CategoryId;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Outcome / Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Exactly one category matched.
    Single { category: CategoryId },
    /// Zero or more than one category matched. Candidates are listed in
    /// rule-table declaration order; empty when nothing matched at all.
    Ambiguous { candidates: Vec<CategoryId> },
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub matched_keywords: BTreeSet<String>,
}

impl Classification {
    pub fn category(&self) -> Option<CategoryId> {
        match &self.outcome {
            Outcome::Single { category } => Some(*category),
            Outcome::Ambiguous { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Disambiguator
// ---------------------------------------------------------------------------

/// External choice-prompting collaborator for ambiguous classifications.
///
/// Synchronous by contract: classification cannot proceed without a
/// resolution, so this models a cooperative suspension point as a blocking
/// call. Implementations must return one of the presented candidates.
pub trait Disambiguator {
    fn choose(&self, input: &str, candidates: &[CategoryId]) -> Result<CategoryId>;
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

struct CompiledRule {
    rule: ClassificationRule,
    patterns: Vec<Regex>,
}

/// Pure, data-driven matcher over the rule table. No probabilistic ranking:
/// anything other than exactly one matching category surfaces as ambiguous.
pub struct Classifier {
    rules: Vec<CompiledRule>,
}

impl Classifier {
    /// Compile the rule table. Fails on an invalid intent pattern.
    pub fn new(rules: Vec<ClassificationRule>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let mut patterns = Vec::with_capacity(rule.intent_patterns.len());
            for pattern in &rule.intent_patterns {
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| TriageError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })?;
                patterns.push(re);
            }
            compiled.push(CompiledRule { rule, patterns });
        }
        Ok(Self { rules: compiled })
    }

    /// Classify free-text input against the rule table.
    ///
    /// A rule matches if any of its keywords appears case-insensitively in
    /// the input or any intent pattern matches. Side effects: none.
    pub fn classify(&self, input: &str) -> Classification {
        let haystack = input.to_lowercase();
        let mut matched_keywords = BTreeSet::new();
        let mut candidates: Vec<CategoryId> = Vec::new();

        for compiled in &self.rules {
            let mut hit = false;

            for keyword in &compiled.rule.keywords {
                if haystack.contains(&keyword.to_lowercase()) {
                    matched_keywords.insert(keyword.to_lowercase());
                    hit = true;
                }
            }
            for re in &compiled.patterns {
                if let Some(m) = re.find(input) {
                    matched_keywords.insert(m.as_str().to_lowercase());
                    hit = true;
                }
            }

            if hit && !candidates.contains(&compiled.rule.category) {
                candidates.push(compiled.rule.category);
            }
        }

        let outcome = if candidates.len() == 1 {
            Outcome::Single {
                category: candidates[0],
            }
        } else {
            Outcome::Ambiguous { candidates }
        };

        Classification {
            outcome,
            matched_keywords,
        }
    }

    /// Classify, resolving ambiguity through the injected collaborator.
    ///
    /// When nothing matched at all, the collaborator is presented with the
    /// full category set. Returns the chosen category and the matched
    /// keywords from the original classification.
    pub fn classify_resolved(
        &self,
        input: &str,
        disambiguator: &dyn Disambiguator,
    ) -> Result<(CategoryId, BTreeSet<String>)> {
        let classification = self.classify(input);
        match classification.outcome {
            Outcome::Single { category } => Ok((category, classification.matched_keywords)),
            Outcome::Ambiguous { candidates } => {
                let presented: Vec<CategoryId> = if candidates.is_empty() {
                    CategoryId::all().to_vec()
                } else {
                    candidates
                };
                let chosen = disambiguator.choose(input, &presented)?;
                if !presented.contains(&chosen) {
                    return Err(TriageError::DisambiguationRejected(format!(
                        "'{chosen}' is not among the presented candidates"
                    )));
                }
                Ok((chosen, classification.matched_keywords))
            }
        }
    }

    /// Title prefix for a category, from its first-declared rule.
    pub fn title_prefix(&self, category: CategoryId) -> Option<&str> {
        self.rules
            .iter()
            .find(|c| c.rule.category == category)
            .map(|c| c.rule.title_prefix.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

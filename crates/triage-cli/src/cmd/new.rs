use crate::output::print_json;
use anyhow::{bail, Context};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use triage_core::classifier::Disambiguator;
use triage_core::config::RouterConfig;
use triage_core::context::EnvContext;
use triage_core::flags::parse_flags;
use triage_core::render::{compose_title, render};
use triage_core::types::CategoryId;
use triage_core::{Result as CoreResult, TriageError};

/// Non-interactive disambiguation: `--category` is the answer. Without it an
/// ambiguous classification is an error the user can retry narrowly.
struct CategoryFlag {
    choice: Option<CategoryId>,
}

impl Disambiguator for CategoryFlag {
    fn choose(&self, _input: &str, candidates: &[CategoryId]) -> CoreResult<CategoryId> {
        match self.choice {
            Some(category) => Ok(category),
            None => {
                let labels: Vec<&str> = candidates.iter().map(|c| c.as_str()).collect();
                Err(TriageError::DisambiguationRejected(format!(
                    "request is ambiguous; rerun with --category <{}>",
                    labels.join("|")
                )))
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    root: &Path,
    text: &str,
    category: Option<&str>,
    summary: Option<&str>,
    field_args: &[String],
    tool_version: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = RouterConfig::load(root).context("failed to load config")?;
    let classifier = config.classifier().context("failed to compile rule table")?;
    let registry = config.registry();

    let (cleaned, _flags) = parse_flags(text);

    let choice = category
        .map(CategoryId::from_str)
        .transpose()
        .context("invalid --category")?;
    let disambiguator = CategoryFlag { choice };

    let (category, _matched) = classifier
        .classify_resolved(&cleaned, &disambiguator)
        .context("classification failed")?;

    let schema = registry.schema(category)?;
    let prefix = config.title_prefix(category)?;
    let title = compose_title(prefix, summary.unwrap_or(&cleaned));

    let mut extracted = parse_field_args(field_args)?;
    // The raw request seeds the first required field unless the caller
    // supplied it explicitly.
    if let Some(first_required) = schema.required_fields().next() {
        extracted
            .entry(first_required.name.clone())
            .or_insert_with(|| cleaned.clone());
    }

    let context = EnvContext::new(tool_version.map(str::to_string));
    let doc = render(category, schema, title, &extracted, &context)
        .context("failed to render document")?;

    if json {
        print_json(&doc)?;
    } else {
        println!("# {}", doc.title);
        println!();
        println!("{}", doc.body_markdown());
    }

    Ok(())
}

fn parse_field_args(args: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    let mut extracted = BTreeMap::new();
    for arg in args {
        match arg.split_once('=') {
            Some((name, value)) => {
                extracted.insert(name.trim().to_string(), value.to_string());
            }
            None => bail!("--field expects name=value, got '{arg}'"),
        }
    }
    Ok(extracted)
}

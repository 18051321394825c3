use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use triage_core::classifier::Outcome;
use triage_core::config::RouterConfig;
use triage_core::flags::parse_flags;

pub fn run(root: &Path, text: &str, json: bool) -> anyhow::Result<()> {
    let config = RouterConfig::load(root).context("failed to load config")?;
    let classifier = config.classifier().context("failed to compile rule table")?;

    let (cleaned, flags) = parse_flags(text);
    let classification = classifier.classify(&cleaned);

    if json {
        print_json(&classification)?;
        return Ok(());
    }

    match &classification.outcome {
        Outcome::Single { category } => {
            println!("Category: {category}");
        }
        Outcome::Ambiguous { candidates } if candidates.is_empty() => {
            println!("Category: ambiguous (no rule matched)");
        }
        Outcome::Ambiguous { candidates } => {
            let labels: Vec<&str> = candidates.iter().map(|c| c.as_str()).collect();
            println!("Category: ambiguous ({})", labels.join(", "));
        }
    }

    if !classification.matched_keywords.is_empty() {
        let matched: Vec<&str> = classification
            .matched_keywords
            .iter()
            .map(|k| k.as_str())
            .collect();
        println!("Matched:  {}", matched.join(", "));
    }
    if !flags.is_empty() {
        println!("Flags:    {:?}", flags.flags);
    }

    Ok(())
}

//! Diff command handler.

use anyhow::{Context, Result};
use serde_json::json;
use walkthru_core::script::{ACT1, ACT2};
use walkthru_core::word_diff::{self, DiffToken, MorphPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DiffPair {
    /// Rough draft against the polished rewrite
    Rewrite,
    /// Proofread paragraph against its corrected text
    Proofread,
}

pub fn run(pair: DiffPair, json: bool) -> Result<()> {
    let (from, to) = match pair {
        DiffPair::Rewrite => (ACT1.rough_draft, ACT1.polished_draft),
        DiffPair::Proofread => (ACT2.text_with_errors, ACT2.clean_text),
    };

    if json {
        let value = match pair {
            DiffPair::Rewrite => json!({
                "pair": "rewrite",
                "plan": MorphPlan::new(from, to, ACT1.morph_duration),
            }),
            DiffPair::Proofread => json!({
                "pair": "proofread",
                "tokens": word_diff::diff(from, to),
                "scripted": ACT2.diffs,
            }),
        };
        let out = serde_json::to_string_pretty(&value).context("serialize diff")?;
        println!("{out}");
        return Ok(());
    }

    let tokens = word_diff::diff(from, to);
    println!("{}", markup(&tokens));
    if pair == DiffPair::Proofread {
        println!();
        for diff in ACT2.diffs {
            println!("- {}", diff.description());
        }
    }
    Ok(())
}

/// `wdiff`-style markup: `[-removed-]` and `{+added+}`.
fn markup(tokens: &[DiffToken]) -> String {
    tokens
        .iter()
        .map(|token| match token {
            DiffToken::Keep { text, .. } => text.clone(),
            DiffToken::Add { text, .. } => format!("{{+{text}+}}"),
            DiffToken::Remove { text, .. } => format!("[-{text}-]"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_wraps_changes() {
        let tokens = word_diff::diff("the quick fox", "the slow fox");
        let out = markup(&tokens);
        assert!(out.starts_with("the "));
        assert!(out.contains("[-quick-]"));
        assert!(out.contains("{+slow+}"));
        assert!(out.ends_with(" fox"));
    }

    #[test]
    fn test_proofread_markup_names_both_fixes() {
        let out = markup(&word_diff::diff(ACT2.text_with_errors, ACT2.clean_text));
        assert!(out.contains("[-handcrafed-]"));
        assert!(out.contains("{+handcrafted+}"));
        assert!(out.contains("{+afford+}"));
    }
}

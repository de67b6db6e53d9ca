//! Heuristic wording analysis for new cards.
//!
//! Flags cards that are long, vaguely named or that bundle several actions,
//! and proposes ways to split them. Purely advisory: nothing here blocks card
//! creation.

use serde::{Deserialize, Serialize};

use crate::storage::AnalyzerConfig;

/// Verbs and phrasal verbs that say little about the actual work on their own.
const VAGUE_VERBS: &[&str] = &[
    "handle",
    "finish",
    "organize",
    "learn",
    "study",
    "research",
    "review",
    "look into",
    "sort out",
    "deal with",
];

/// Verbs counted as separate actions.
const ACTION_VERBS: &[&str] = &[
    "write", "finish", "organize", "learn", "study", "research", "create", "update", "fix",
    "delete", "review", "draft", "read", "clean", "plan", "test", "build", "deploy", "email",
    "call",
];

const DOC_KEYWORDS: &[&str] = &["doc", "docs", "document", "documentation", "report"];
const CODE_KEYWORDS: &[&str] = &["code", "implement", "feature", "bug", "refactor"];
const LEARN_KEYWORDS: &[&str] = &["learn", "study", "course", "tutorial"];

/// Warnings and suggestions for one card.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskAnalysis {
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl TaskAnalysis {
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.suggestions.is_empty()
    }

    fn suggest(&mut self, suggestion: String) {
        if !self.suggestions.contains(&suggestion) {
            self.suggestions.push(suggestion);
        }
    }
}

/// Analyze a card name and estimate.
pub fn analyze_task(name: &str, estimated_minutes: u32, config: &AnalyzerConfig) -> TaskAnalysis {
    let mut analysis = TaskAnalysis::default();
    if !config.enabled {
        return analysis;
    }

    let lower = name.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if estimated_minutes > config.long_task_minutes {
        analysis.warnings.push(format!(
            "Estimated time ({estimated_minutes} min) is long; consider splitting into smaller cards"
        ));
        for s in decomposition(&words) {
            analysis.suggest(s);
        }
    }

    if is_vague(&words, name.chars().count(), config.vague_name_chars) {
        analysis
            .warnings
            .push("Card name may be too vague; describe the concrete outcome".to_string());
        analysis.suggest(
            "Name the deliverable, e.g. 'Finish docs' becomes 'Write the install section of the README'"
                .to_string(),
        );
    }

    if action_count(&words) >= 2 {
        analysis
            .warnings
            .push("Card seems to contain several actions; consider one card per action".to_string());
        for s in decomposition(&words) {
            analysis.suggest(s);
        }
    }

    analysis
}

fn is_vague(words: &[&str], name_chars: usize, max_chars: usize) -> bool {
    name_chars < max_chars && VAGUE_VERBS.iter().any(|verb| contains_phrase(words, verb))
}

/// Whether `phrase` occurs in `words` as consecutive whole words.
fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let parts: Vec<&str> = phrase.split(' ').collect();
    words.windows(parts.len()).any(|window| window == parts.as_slice())
}

fn action_count(words: &[&str]) -> usize {
    words.iter().filter(|w| ACTION_VERBS.contains(*w)).count()
}

fn decomposition(words: &[&str]) -> Vec<String> {
    let has_any = |keys: &[&str]| words.iter().any(|w| keys.contains(w));

    let steps: &[&str] = if has_any(DOC_KEYWORDS) {
        &["Write an outline", "Draft the content", "Review and revise"]
    } else if has_any(CODE_KEYWORDS) {
        &["Write the core logic", "Add tests", "Debug and fix issues"]
    } else if has_any(LEARN_KEYWORDS) {
        &["Read the material", "Work through an example", "Summarize notes"]
    } else {
        return vec!["Split the work by phase, keeping each card within 15 minutes".to_string()];
    };

    steps.iter().map(|s| format!("Split into: {s}")).collect()
}

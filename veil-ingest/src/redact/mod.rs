//! Multi-pass PII redaction.
//!
//! Each stage rewrites the whole text and hands its output to the next
//! stage. Matches become typed placeholders and every substitution is
//! recorded as a [`RedactionEvent`] for the caller's audit trail.

mod rules;

pub use rules::{RedactionRule, RedactionStage, default_rules};

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::RedactError;
use crate::types::{PiiClass, RedactionEvent};

/// Suffix shared by every placeholder token.
const PLACEHOLDER_MARKER: &str = "_REDACTED]";

/// Output of one redaction call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub text: String,
    pub events: Vec<RedactionEvent>,
}

impl Redaction {
    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of substitutions per class, for logging without the spans.
    pub fn counts(&self) -> BTreeMap<PiiClass, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.class).or_insert(0) += 1;
        }
        counts
    }
}

struct CompiledRule {
    stage: RedactionStage,
    pattern: Regex,
}

/// Applies the rule table to text. Holds no state beyond the compiled
/// rules, so one instance can be shared freely.
pub struct PatternRedactor {
    rules: Vec<CompiledRule>,
    errors: Vec<RedactError>,
}

impl PatternRedactor {
    /// Compile `rules`, ordered by stage (stable within a stage).
    ///
    /// A rule that fails to compile is skipped and reported through
    /// [`PatternRedactor::compile_errors`]; the remaining stages still run.
    pub fn new(mut rules: Vec<RedactionRule>) -> Self {
        rules.sort_by_key(|r| r.stage.ordinal());

        let mut compiled = Vec::with_capacity(rules.len());
        let mut errors = Vec::new();
        for rule in rules {
            match Regex::new(&rule.pattern) {
                Ok(pattern) => compiled.push(CompiledRule {
                    stage: rule.stage,
                    pattern,
                }),
                Err(source) => {
                    warn!(stage = ?rule.stage, error = %source, "redaction rule disabled");
                    errors.push(RedactError::InvalidPattern {
                        stage: rule.stage,
                        source,
                    });
                }
            }
        }

        Self {
            rules: compiled,
            errors,
        }
    }

    pub fn compile_errors(&self) -> &[RedactError] {
        &self.errors
    }

    /// Stages that will actually run, in order.
    pub fn active_stages(&self) -> Vec<RedactionStage> {
        let mut stages: Vec<RedactionStage> = self.rules.iter().map(|r| r.stage).collect();
        stages.dedup();
        stages
    }

    pub fn redact(&self, text: &str) -> Redaction {
        let mut current = text.to_string();
        let mut events = Vec::new();

        for rule in &self.rules {
            let before = events.len();
            current = apply(rule, &current, &mut events);
            let matched = events.len() - before;
            if matched > 0 {
                debug!(stage = ?rule.stage, matched, "redaction pass");
            }
        }

        if !self.errors.is_empty() {
            warn!(
                disabled = self.errors.len(),
                "redaction ran with disabled stages; review output manually"
            );
        }

        Redaction {
            text: current,
            events,
        }
    }
}

impl Default for PatternRedactor {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

fn apply(rule: &CompiledRule, text: &str, events: &mut Vec<RedactionEvent>) -> String {
    let stage = rule.stage;
    let class = stage.class();

    rule.pattern
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            match stage {
                RedactionStage::PaymentCard if digit_count(whole) < 13 => whole.to_string(),
                RedactionStage::GenericPhone if contains_placeholder(whole) => whole.to_string(),
                RedactionStage::LabeledName => match (caps.get(1), caps.get(2)) {
                    (Some(label), Some(name)) => {
                        events.push(RedactionEvent {
                            class,
                            original: name.as_str().to_string(),
                        });
                        format!("{}{}", label.as_str(), stage.placeholder())
                    }
                    _ => whole.to_string(),
                },
                _ => {
                    events.push(RedactionEvent {
                        class,
                        original: whole.to_string(),
                    });
                    stage.placeholder().to_string()
                }
            }
        })
        .into_owned()
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Already-masked spans are passed through untouched.
fn contains_placeholder(s: &str) -> bool {
    s.contains(PLACEHOLDER_MARKER)
}

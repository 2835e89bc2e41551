// src/services/hashtags.rs

//! Keyword to hashtag substitution.

use crate::models::HashtagRule;

/// Rewrites descriptions with an ordered table of literal substitutions.
///
/// Rules run one after another over the whole text, so a rule sees what the
/// previous rules produced. Casing variants are listed explicitly rather than
/// matched case-insensitively.
#[derive(Debug, Clone)]
pub struct HashtagAnnotator {
    rules: Vec<HashtagRule>,
}

impl HashtagAnnotator {
    pub fn new(rules: Vec<HashtagRule>) -> Self {
        Self { rules }
    }

    pub fn annotate(&self, description: &str) -> String {
        self.rules
            .iter()
            .fold(description.to_string(), |text, rule| apply_rule(&text, rule))
    }
}

/// Replace every standalone occurrence of the rule pattern.
///
/// An occurrence is left alone when it already follows a `#`, or when a word
/// character edge of the pattern runs into a neighbouring word character.
fn apply_rule(text: &str, rule: &HashtagRule) -> String {
    if rule.pattern.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for (start, matched) in text.match_indices(rule.pattern.as_str()) {
        let end = start + matched.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();

        if before == Some('#') || touches_word(&rule.pattern, before, after) {
            continue;
        }

        result.push_str(&text[last..start]);
        result.push_str(&rule.replacement);
        last = end;
    }
    result.push_str(&text[last..]);
    result
}

fn touches_word(pattern: &str, before: Option<char>, after: Option<char>) -> bool {
    let starts_with_word = pattern.chars().next().is_some_and(is_word_char);
    let ends_with_word = pattern.chars().next_back().is_some_and(is_word_char);

    (starts_with_word && before.is_some_and(is_word_char))
        || (ends_with_word && after.is_some_and(is_word_char))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

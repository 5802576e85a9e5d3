//! Shallow text analysis used by the reference engine

use crate::enums::Language;

/// Coarse shape of a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionKind {
    /// Something stated
    Statement,
    /// Something asked
    Question,
    /// An order
    Command,
    /// "to X means Y"
    Teaching {
        /// What the user will ask for
        label: String,
        /// What the robot should do
        result: String,
    },
}

const COMMAND_VERBS: &[&str] = &[
    "say", "tell", "dance", "raise", "look", "go", "move", "walk", "turn", "sing", "stop", "show",
    "dis", "danse", "lève", "regarde", "va", "avance", "tourne", "chante", "montre",
];

const TEACHING_MARKERS: &[&str] = &[" means ", " signifie "];

const QUESTION_WORDS: &[&str] = &[
    "what", "who", "where", "when", "why", "how", "is", "are", "do", "does", "the", "a", "an",
    "qui", "que", "quoi", "où", "quand", "est", "ce", "le", "la", "les", "un", "une",
];

const FRENCH_MARKERS: &[&str] = &[
    "le", "la", "les", "je", "tu", "il", "est", "et", "un", "une", "bonjour", "merci", "oui", "non",
    "vous", "dis", "moi", "suis", "qui",
];

const ENGLISH_MARKERS: &[&str] = &[
    "the", "i", "you", "is", "and", "a", "an", "hello", "thanks", "yes", "no", "say", "me", "am",
    "who", "what",
];

const NOT_PROPER_NOUNS: &[&str] = &["I", "The", "A", "An", "Le", "La", "Les", "Un", "Une", "Je"];

/// Lowercase, drop punctuation, collapse whitespace
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Words of a normalized text
pub fn words(text: &str) -> Vec<String> {
    normalize(text).split(' ').filter(|w| !w.is_empty()).map(str::to_string).collect()
}

/// Words worth matching when answering a question
pub fn content_words(text: &str) -> Vec<String> {
    words(text)
        .into_iter()
        .filter(|w| !QUESTION_WORDS.contains(&w.as_str()))
        .collect()
}

/// Strip a leading "to " / "de " infinitive marker
fn strip_infinitive(s: &str) -> &str {
    s.strip_prefix("to ")
        .or_else(|| s.strip_prefix("de "))
        .unwrap_or(s)
}

/// Classify a sentence
pub fn classify(text: &str) -> ExpressionKind {
    let trimmed = text.trim();
    if trimmed.ends_with('?') {
        return ExpressionKind::Question;
    }
    let lower = format!(" {} ", normalize(trimmed));
    for marker in TEACHING_MARKERS {
        if let Some(at) = lower.find(marker) {
            let label = strip_infinitive(lower[..at].trim()).to_string();
            let result = strip_infinitive(lower[at + marker.len()..].trim()).to_string();
            if !label.is_empty() && !result.is_empty() {
                return ExpressionKind::Teaching { label, result };
            }
        }
    }
    let first = words(trimmed).into_iter().next().unwrap_or_default();
    if trimmed.ends_with('!') || COMMAND_VERBS.contains(&first.as_str()) {
        return ExpressionKind::Command;
    }
    ExpressionKind::Statement
}

/// Guess the language of a text from function words
pub fn detect_language(text: &str) -> Option<Language> {
    let ws = words(text);
    let french = ws.iter().filter(|w| FRENCH_MARKERS.contains(&w.as_str())).count()
        + text.chars().filter(|c| "éèêàçùôî".contains(*c)).count();
    let english = ws.iter().filter(|w| ENGLISH_MARKERS.contains(&w.as_str())).count();
    match french.cmp(&english) {
        std::cmp::Ordering::Greater => Some(Language::French),
        std::cmp::Ordering::Less => Some(Language::English),
        std::cmp::Ordering::Equal => None,
    }
}

/// Every word capitalized and none of them a capitalized function word
pub fn is_a_proper_noun(text: &str) -> bool {
    let mut any = false;
    for word in text.split_whitespace() {
        any = true;
        let starts_upper = word.chars().next().map(char::is_uppercase).unwrap_or(false);
        if !starts_upper || NOT_PROPER_NOUNS.contains(&word) {
            return false;
        }
    }
    any
}

/// Parse an inline resource `\label=value\` whose label is allowed
pub fn inline_resource<'a>(text: &'a str, labels: &[String]) -> Option<(&'a str, &'a str)> {
    let inner = text.trim().strip_prefix('\\')?.strip_suffix('\\')?;
    let (label, value) = inner.split_once('=')?;
    if labels.iter().any(|l| l == label) {
        Some((label, value))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_punctuation() {
        assert_eq!(normalize("  Hello,   World! "), "hello world");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("Who is Paul?"), ExpressionKind::Question);
        assert_eq!(classify("say hello"), ExpressionKind::Command);
        assert_eq!(classify("Paul is tall"), ExpressionKind::Statement);
        assert_eq!(
            classify("to greet means to say hello"),
            ExpressionKind::Teaching {
                label: "greet".to_string(),
                result: "say hello".to_string(),
            }
        );
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("je suis content et toi"), Some(Language::French));
        assert_eq!(detect_language("the cat is on the mat"), Some(Language::English));
        assert_eq!(detect_language("xyz"), None);
    }

    #[test]
    fn test_proper_noun() {
        assert!(is_a_proper_noun("Paul Dupont"));
        assert!(!is_a_proper_noun("paul"));
        assert!(!is_a_proper_noun("The"));
        assert!(!is_a_proper_noun(""));
    }

    #[test]
    fn test_inline_resource() {
        let labels = vec!["anim".to_string()];
        assert_eq!(inline_resource("\\anim=wave\\", &labels), Some(("anim", "wave")));
        assert_eq!(inline_resource("\\url=x\\", &labels), None);
        assert_eq!(inline_resource("anim=wave", &labels), None);
    }
}

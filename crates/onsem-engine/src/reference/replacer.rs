//! Literal string replacement

/// Ordered list of literal replacements
#[derive(Debug, Clone)]
pub struct RefReplacer {
    case_sensitive: bool,
    whole_words: bool,
    patterns: Vec<(String, String)>,
}

impl RefReplacer {
    /// Create a replacer; `whole_words` only replaces patterns delimited by
    /// non-alphanumeric characters
    pub fn new(case_sensitive: bool, whole_words: bool) -> Self {
        Self {
            case_sensitive,
            whole_words,
            patterns: Vec::new(),
        }
    }

    /// Register a replacement; empty patterns are ignored
    pub fn add(&mut self, pattern: &str, output: &str) {
        if !pattern.is_empty() {
            self.patterns.push((pattern.to_string(), output.to_string()));
        }
    }

    /// Apply every replacement in registration order
    pub fn apply(&self, input: &str) -> String {
        self.patterns
            .iter()
            .fold(input.to_string(), |acc, (pattern, output)| self.replace_one(&acc, pattern, output))
    }

    fn replace_one(&self, input: &str, pattern: &str, output: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut pos = 0;
        while let Some(c) = input[pos..].chars().next() {
            if let Some(len) = self.match_len(&input[pos..], pattern) {
                if !self.whole_words || is_word_boundary(input, pos, pos + len) {
                    out.push_str(output);
                    pos += len;
                    continue;
                }
            }
            out.push(c);
            pos += c.len_utf8();
        }
        out
    }

    fn match_len(&self, rest: &str, pattern: &str) -> Option<usize> {
        let mut chars = rest.chars();
        let mut len = 0;
        for p in pattern.chars() {
            let c = chars.next()?;
            let same = if self.case_sensitive {
                c == p
            } else {
                c.to_lowercase().eq(p.to_lowercase())
            };
            if !same {
                return None;
            }
            len += c.len_utf8();
        }
        Some(len)
    }
}

fn is_word_boundary(input: &str, start: usize, end: usize) -> bool {
    let before = input[..start].chars().next_back();
    let after = input[end..].chars().next();
    !before.map(char::is_alphanumeric).unwrap_or(false) && !after.map(char::is_alphanumeric).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_whole_words() {
        let mut r = RefReplacer::new(false, true);
        r.add("cat", "dog");
        assert_eq!(r.apply("Cat and category"), "dog and category");
    }

    #[test]
    fn test_case_sensitive_substrings() {
        let mut r = RefReplacer::new(true, false);
        r.add("ab", "X");
        assert_eq!(r.apply("abAbab"), "XAbX");
    }

    #[test]
    fn test_patterns_apply_in_order() {
        let mut r = RefReplacer::new(true, false);
        r.add("a", "b");
        r.add("b", "c");
        assert_eq!(r.apply("a"), "c");
    }

    #[test]
    fn test_non_ascii_input() {
        let mut r = RefReplacer::new(false, true);
        r.add("été", "summer");
        assert_eq!(r.apply("L'ÉTÉ est là"), "L'summer est là");
    }
}

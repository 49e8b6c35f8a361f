//! Display-name override rules
//!
//! Rules are `pattern -> replacement` pairs kept in insertion order. A name
//! is overridden by the FIRST rule whose pattern occurs anywhere inside it
//! (plain substring containment, not anchored and not a regex). The whole
//! name is replaced, not just the matched part.
//!
//! Because matching is unanchored, short patterns can hit partial words
//! (`"Fire"` also matches `"Fire IV"` and `"Wildfire"`). Applying overrides
//! twice is only stable when no replacement contains another rule's pattern.

/// A single override rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRule {
    pub pattern: String,
    pub replacement: String,
}

/// Ordered set of override rules.
#[derive(Debug, Clone, Default)]
pub struct NameOverrides {
    rules: Vec<OverrideRule>,
}

impl NameOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule. Re-inserting an existing pattern updates its replacement
    /// but keeps the rule at its original position.
    pub fn insert(&mut self, pattern: impl Into<String>, replacement: impl Into<String>) {
        let pattern = pattern.into();
        let replacement = replacement.into();
        if let Some(rule) = self.rules.iter_mut().find(|r| r.pattern == pattern) {
            rule.replacement = replacement;
        } else {
            self.rules.push(OverrideRule {
                pattern,
                replacement,
            });
        }
    }

    /// Replacement of the first rule whose pattern is contained in `name`,
    /// or `name` unchanged if nothing matches.
    pub fn apply(&self, name: &str) -> String {
        self.rules
            .iter()
            .find(|rule| name.contains(rule.pattern.as_str()))
            .map(|rule| rule.replacement.clone())
            .unwrap_or_else(|| name.to_string())
    }

    pub fn rules(&self) -> &[OverrideRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<P: Into<String>, R: Into<String>> FromIterator<(P, R)> for NameOverrides {
    fn from_iter<I: IntoIterator<Item = (P, R)>>(iter: I) -> Self {
        let mut overrides = NameOverrides::new();
        for (pattern, replacement) in iter {
            overrides.insert(pattern, replacement);
        }
        overrides
    }
}

/// Parse `pattern|replacement` lines from an override file.
///
/// Blank lines, `#` comments and lines without a `|` are ignored. Only the
/// first `|` splits, so replacements may contain further pipes.
pub fn parse_override_lines(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('|'))
        .map(|(pattern, replacement)| (pattern.to_string(), replacement.to_string()))
        .collect()
}

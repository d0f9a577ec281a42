use std::collections::HashSet;

use regex::Regex;

use crate::error::IgnorePatternError;

/// One compiled ignore specification.
///
/// Specifications are class or package names, dotted (`org.objectweb.*`) or
/// slashed, where `*` matches any run of characters (including `/`) and `?`
/// matches exactly one character. They are matched against internal names
/// (`org/objectweb/asm/ClassReader`).
#[derive(Debug, Clone)]
pub enum IgnoreRule {
    Exact(String),
    /// A single trailing `*`: matches every name starting with the prefix.
    Prefix(String),
    /// Wildcards anywhere else, compiled to an anchored regex.
    Pattern(Regex),
}

impl IgnoreRule {
    pub fn compile(spec: &str) -> Result<Self, IgnorePatternError> {
        if spec.is_empty() {
            return Err(IgnorePatternError::Empty);
        }
        if spec.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(IgnorePatternError::InvalidCharacter {
                pattern: spec.to_string(),
            });
        }

        let normalized = spec.replace('.', "/");
        if normalized.split('/').any(str::is_empty) {
            return Err(IgnorePatternError::EmptySegment {
                pattern: spec.to_string(),
            });
        }

        let stars = normalized.matches('*').count();
        if stars == 0 && !normalized.contains('?') {
            return Ok(IgnoreRule::Exact(normalized));
        }
        if stars == 1 && normalized.ends_with('*') && !normalized.contains('?') {
            let prefix = normalized.trim_end_matches('*').to_string();
            return Ok(IgnoreRule::Prefix(prefix));
        }

        let regex = Regex::new(&wildcard_to_regex(&normalized)).map_err(|source| {
            IgnorePatternError::Regex {
                pattern: spec.to_string(),
                source,
            }
        })?;
        Ok(IgnoreRule::Pattern(regex))
    }

    pub fn matches(&self, class_name: &str) -> bool {
        match self {
            IgnoreRule::Exact(name) => name == class_name,
            IgnoreRule::Prefix(prefix) => class_name.starts_with(prefix.as_str()),
            IgnoreRule::Pattern(regex) => regex.is_match(class_name),
        }
    }
}

fn wildcard_to_regex(wildcard: &str) -> String {
    let mut out = String::with_capacity(wildcard.len() + 8);
    out.push('^');
    let mut literal = String::new();
    for c in wildcard.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

/// Per-run memo of class names already shown to be ignored by a wildcard rule.
#[derive(Debug, Default, Clone)]
pub struct IgnoreCache {
    ignored: HashSet<String>,
}

impl IgnoreCache {
    pub fn len(&self) -> usize {
        self.ignored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ignored.is_empty()
    }
}

/// The compiled set of ignore specifications for a run.
///
/// Immutable after [`IgnoreRuleSet::build`], so it can be shared between
/// threads; the mutable memo lives in an [`IgnoreCache`] owned by each checker.
#[derive(Debug, Default, Clone)]
pub struct IgnoreRuleSet {
    exact: HashSet<String>,
    rules: Vec<IgnoreRule>,
}

impl IgnoreRuleSet {
    pub fn build<I, S>(specs: I) -> Result<Self, IgnorePatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for spec in specs {
            match IgnoreRule::compile(spec.as_ref())? {
                IgnoreRule::Exact(name) => {
                    set.exact.insert(name);
                }
                rule => set.rules.push(rule),
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.rules.is_empty()
    }

    /// Uncached membership test.
    pub fn matches(&self, class_name: &str) -> bool {
        self.exact.contains(class_name) || self.rules.iter().any(|rule| rule.matches(class_name))
    }

    /// Membership test that consults and feeds `cache`: exact names first,
    /// then names already known to match, then the wildcard rules in order.
    pub fn matches_cached(&self, class_name: &str, cache: &mut IgnoreCache) -> bool {
        if self.exact.contains(class_name) || cache.ignored.contains(class_name) {
            return true;
        }
        if self.rules.iter().any(|rule| rule.matches(class_name)) {
            cache.ignored.insert(class_name.to_string());
            return true;
        }
        false
    }
}

use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
}

/// A detected incompatibility: a reference the baseline cannot resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// `Undefined reference: <owner>[.<member>]`.
    pub message: String,
    /// Display name of the class where the reference was first seen.
    pub class_name: String,
    pub severity: Severity,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.message, self.class_name)
    }
}

/// Result of checking a batch of classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    pub broken: bool,
    /// Deduplicated by message, in first-seen order.
    pub findings: Vec<Finding>,
    /// Classes skipped under [`crate::MalformedClassPolicy::Continue`].
    pub malformed_classes: Vec<String>,
}

impl CheckOutcome {
    pub fn is_signature_broken(&self) -> bool {
        self.broken
    }

    /// Fold `other` into `self`. Verdicts are OR-ed; findings whose message is
    /// already present are dropped.
    pub fn merge(&mut self, other: CheckOutcome) {
        self.broken |= other.broken;

        let mut seen: HashSet<String> = self.findings.iter().map(|f| f.message.clone()).collect();
        for finding in other.findings {
            if seen.insert(finding.message.clone()) {
                self.findings.push(finding);
            }
        }
        self.malformed_classes.extend(other.malformed_classes);
    }
}

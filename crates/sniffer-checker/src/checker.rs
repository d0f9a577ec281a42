use std::collections::HashSet;
use std::path::Path;

use sniffer_config::MalformedClassPolicy;
use sniffer_signatures::{member, SignatureIndex};

use crate::classpath::ClassPathEntry;
use crate::error::{CheckError, MalformedClassError};
use crate::ignore::{IgnoreCache, IgnoreRuleSet};
use crate::outcome::{CheckOutcome, Finding, Severity};
use crate::reference::{Reference, ReferenceExtractor};

const UNDEFINED_REFERENCE: &str = "Undefined reference: ";

/// Resolves the references of application classes against a baseline.
///
/// A checker starts clean and becomes broken at the first unresolved
/// reference; it never becomes clean again. Findings are deduplicated by
/// message for the lifetime of the checker, but every unresolved reference
/// counts towards the verdict.
///
/// The index and the ignore rules are shared read-only; everything mutable
/// (the ignore memo, the set of reported messages) is owned by the checker, so
/// concurrent runs use one checker per thread (see [`crate::check_parallel`]).
#[derive(Debug)]
pub struct CompatibilityChecker<'a> {
    index: &'a SignatureIndex,
    ignores: &'a IgnoreRuleSet,
    extractor: ReferenceExtractor,
    ignore_cache: IgnoreCache,
    reported: HashSet<String>,
    findings: Vec<Finding>,
    malformed_classes: Vec<String>,
    had_error: bool,
}

impl<'a> CompatibilityChecker<'a> {
    pub fn new(index: &'a SignatureIndex, ignores: &'a IgnoreRuleSet) -> Self {
        Self {
            index,
            ignores,
            extractor: ReferenceExtractor::default(),
            ignore_cache: IgnoreCache::default(),
            reported: HashSet::new(),
            findings: Vec::new(),
            malformed_classes: Vec::new(),
            had_error: false,
        }
    }

    pub fn with_extractor(mut self, extractor: ReferenceExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn extractor(&self) -> &ReferenceExtractor {
        &self.extractor
    }

    /// Check every reference made by the class named `display_name`.
    pub fn process_class<I>(&mut self, display_name: &str, references: I)
    where
        I: IntoIterator<Item = Reference>,
    {
        for reference in references {
            if reference.site_suppressed || reference.owner.starts_with('[') {
                continue;
            }
            if self
                .ignores
                .matches_cached(&reference.owner, &mut self.ignore_cache)
            {
                continue;
            }

            let resolved = match &reference.member {
                None => self.index.contains(&reference.owner),
                Some(member) => self.resolve(&reference.owner, member),
            };
            if !resolved {
                self.record(display_name, &reference);
            }
        }
    }

    /// Parse `bytes`, then [`process_class`](Self::process_class) the result.
    /// A class that cannot be parsed is reported without touching the verdict.
    pub fn check_class_bytes(
        &mut self,
        display_name: &str,
        bytes: &[u8],
    ) -> Result<(), MalformedClassError> {
        let references = self.extractor.extract(display_name, bytes)?;
        self.process_class(display_name, references);
        Ok(())
    }

    /// Like [`check_class_bytes`](Self::check_class_bytes), but a malformed
    /// class under [`MalformedClassPolicy::Continue`] is logged and remembered
    /// instead of returned.
    pub fn check_class_with_policy(
        &mut self,
        display_name: &str,
        bytes: &[u8],
        policy: MalformedClassPolicy,
    ) -> Result<(), MalformedClassError> {
        match self.check_class_bytes(display_name, bytes) {
            Err(err) if policy == MalformedClassPolicy::Continue => {
                tracing::error!(class = %display_name, error = %err.source, "skipping malformed class");
                self.malformed_classes.push(display_name.to_string());
                Ok(())
            }
            result => result,
        }
    }

    /// Check every class under `path` (a directory, archive or class file).
    pub fn check_path(
        &mut self,
        path: impl AsRef<Path>,
        policy: MalformedClassPolicy,
    ) -> Result<(), CheckError> {
        let Some(entry) = ClassPathEntry::from_path(path)? else {
            return Ok(());
        };
        entry.for_each_class(|unit| {
            self.check_class_with_policy(&unit.name, &unit.bytes, policy)?;
            Ok(())
        })
    }

    /// Whether `member` is declared by `owner` or, unless it is a constructor
    /// or static initializer, inherited from one of its supertypes. Ignore
    /// rules are not consulted.
    pub fn resolve(&self, owner: &str, member: &str) -> bool {
        let mut visited = HashSet::new();
        self.find(owner, member, &mut visited)
    }

    fn find<'s>(&'s self, class_name: &'s str, member: &str, visited: &mut HashSet<&'s str>) -> bool {
        if !visited.insert(class_name) {
            tracing::trace!(class = %class_name, "supertype cycle in baseline");
            return false;
        }
        let Some(class) = self.index.lookup(class_name) else {
            return false;
        };
        if class.declares(member) {
            return true;
        }
        if member::is_initializer(member) {
            return false;
        }
        class
            .supertypes()
            .any(|supertype| self.find(supertype, member, visited))
    }

    fn record(&mut self, display_name: &str, reference: &Reference) {
        self.had_error = true;

        let message = format!("{UNDEFINED_REFERENCE}{}", reference.describe());
        if !self.reported.insert(message.clone()) {
            tracing::trace!(class = %display_name, %message, "duplicate finding");
            return;
        }

        let finding = Finding {
            message,
            class_name: display_name.to_string(),
            severity: Severity::Error,
        };
        tracing::error!("{finding}");
        self.findings.push(finding);
    }

    pub fn is_signature_broken(&self) -> bool {
        self.had_error
    }

    /// Deduplicated findings in first-seen order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn malformed_classes(&self) -> &[String] {
        &self.malformed_classes
    }

    pub fn into_outcome(self) -> CheckOutcome {
        CheckOutcome {
            broken: self.had_error,
            findings: self.findings,
            malformed_classes: self.malformed_classes,
        }
    }
}

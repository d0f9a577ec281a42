use std::path::Path;

use sniffer_config::{MalformedClassPolicy, SnifferConfig};
use sniffer_signatures::SignatureIndex;

use crate::checker::CompatibilityChecker;
use crate::classpath;
use crate::error::CheckError;
use crate::ignore::IgnoreRuleSet;
use crate::outcome::CheckOutcome;
use crate::parallel::check_parallel;
use crate::reference::ReferenceExtractor;

/// Everything needed to check a set of class paths: a loaded baseline,
/// compiled ignore rules and the run options.
#[derive(Debug, Clone)]
pub struct CheckSession {
    index: SignatureIndex,
    ignores: IgnoreRuleSet,
    extractor: ReferenceExtractor,
    policy: MalformedClassPolicy,
    parallel: bool,
}

impl CheckSession {
    pub fn new(index: SignatureIndex) -> Self {
        Self {
            index,
            ignores: IgnoreRuleSet::default(),
            extractor: ReferenceExtractor::default(),
            policy: MalformedClassPolicy::default(),
            parallel: false,
        }
    }

    /// Load the configured baseline and compile the ignore rules. Both
    /// configuration problems surface here rather than mid-run.
    pub fn from_config(config: &SnifferConfig) -> Result<Self, CheckError> {
        let baseline = config.baseline.as_ref().ok_or(CheckError::MissingBaseline)?;
        let index = SignatureIndex::load_from_path(baseline)?;
        let ignores = IgnoreRuleSet::build(&config.ignores)?;
        tracing::info!(
            baseline = %baseline.display(),
            classes = index.len(),
            "loaded signature baseline"
        );

        Ok(Self::new(index)
            .with_ignores(ignores)
            .with_extractor(ReferenceExtractor::with_suppression_annotations(
                &config.suppression_annotations,
            ))
            .with_policy(config.malformed_classes)
            .with_parallel(config.parallel))
    }

    pub fn with_ignores(mut self, ignores: IgnoreRuleSet) -> Self {
        self.ignores = ignores;
        self
    }

    pub fn with_extractor(mut self, extractor: ReferenceExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_policy(mut self, policy: MalformedClassPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn index(&self) -> &SignatureIndex {
        &self.index
    }

    /// A fresh sequential checker over this session's baseline and rules.
    pub fn checker(&self) -> CompatibilityChecker<'_> {
        CompatibilityChecker::new(&self.index, &self.ignores).with_extractor(self.extractor.clone())
    }

    pub fn check_paths<I, P>(&self, paths: I) -> Result<CheckOutcome, CheckError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        if self.parallel {
            let units = classpath::collect_classes(paths)?;
            let outcome = check_parallel(
                &self.index,
                &self.ignores,
                &self.extractor,
                units,
                self.policy,
            )?;
            return Ok(outcome);
        }

        let mut checker = self.checker();
        for path in paths {
            checker.check_path(path, self.policy)?;
        }
        Ok(checker.into_outcome())
    }
}

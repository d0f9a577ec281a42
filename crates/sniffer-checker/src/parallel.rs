use rayon::prelude::*;
use sniffer_config::MalformedClassPolicy;
use sniffer_signatures::SignatureIndex;

use crate::checker::CompatibilityChecker;
use crate::error::MalformedClassError;
use crate::ignore::IgnoreRuleSet;
use crate::outcome::CheckOutcome;
use crate::reference::ReferenceExtractor;

/// Bytes of one class together with the name used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassUnit {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ClassUnit {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Partial result of one worker. The error is tagged with the input index of
/// the class that raised it so the earliest one wins after reduction.
struct Partial {
    outcome: CheckOutcome,
    halted: Option<(usize, MalformedClassError)>,
}

impl Partial {
    fn merge(mut self, other: Partial) -> Partial {
        self.outcome.merge(other.outcome);
        self.halted = match (self.halted, other.halted) {
            (Some(left), Some(right)) => Some(if left.0 <= right.0 { left } else { right }),
            (left, right) => left.or(right),
        };
        self
    }
}

/// Check `units` on the rayon pool, one [`CompatibilityChecker`] per worker.
///
/// The merged outcome is what a single sequential checker would report: the
/// verdicts are OR-ed and findings are deduplicated keeping the first class
/// in input order. Under [`MalformedClassPolicy::Halt`] the malformed class
/// with the lowest input index is returned.
pub fn check_parallel(
    index: &SignatureIndex,
    ignores: &IgnoreRuleSet,
    extractor: &ReferenceExtractor,
    units: Vec<ClassUnit>,
    policy: MalformedClassPolicy,
) -> Result<CheckOutcome, MalformedClassError> {
    let total = units.len();
    let partial = units
        .into_par_iter()
        .enumerate()
        .fold(
            || {
                let checker =
                    CompatibilityChecker::new(index, ignores).with_extractor(extractor.clone());
                (checker, None::<(usize, MalformedClassError)>)
            },
            |(mut checker, mut halted), (position, unit)| {
                if halted.is_none() {
                    if let Err(err) = checker.check_class_with_policy(&unit.name, &unit.bytes, policy)
                    {
                        halted = Some((position, err));
                    }
                }
                (checker, halted)
            },
        )
        .map(|(checker, halted)| Partial {
            outcome: checker.into_outcome(),
            halted,
        })
        .reduce(
            || Partial {
                outcome: CheckOutcome::default(),
                halted: None,
            },
            Partial::merge,
        );

    if let Some((position, err)) = partial.halted {
        tracing::debug!(position, total, "parallel check halted on malformed class");
        return Err(err);
    }
    tracing::debug!(
        classes = total,
        findings = partial.outcome.findings.len(),
        "parallel check finished"
    );
    Ok(partial.outcome)
}

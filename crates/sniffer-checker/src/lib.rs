//! API signature compatibility checking.
//!
//! Given a baseline [`SignatureIndex`] (the API a platform promises) and the
//! compiled classes of an application, report every method, field or type the
//! application references that the baseline cannot resolve.
//!
//! ```no_run
//! use sniffer_checker::{CompatibilityChecker, IgnoreRuleSet};
//! use sniffer_signatures::SignatureIndex;
//!
//! let index = SignatureIndex::load_from_path("java18.sig")?;
//! let ignores = IgnoreRuleSet::build(["org.objectweb.*"])?;
//! let mut checker = CompatibilityChecker::new(&index, &ignores);
//! checker.check_class_bytes("App.class", &std::fs::read("App.class")?)?;
//! if checker.is_signature_broken() {
//!     std::process::exit(1);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod checker;
pub mod classpath;
mod error;
mod ignore;
mod outcome;
mod parallel;
mod reference;
mod session;

pub use crate::checker::CompatibilityChecker;
pub use crate::error::{CheckError, IgnorePatternError, MalformedClassError};
pub use crate::ignore::{IgnoreCache, IgnoreRule, IgnoreRuleSet};
pub use crate::outcome::{CheckOutcome, Finding, Severity};
pub use crate::parallel::{check_parallel, ClassUnit};
pub use crate::reference::{ClassReferences, Reference, ReferenceExtractor, ReferenceKind};
pub use crate::session::CheckSession;

pub use sniffer_config::MalformedClassPolicy;
pub use sniffer_signatures::{ClassSignature, SignatureIndex};

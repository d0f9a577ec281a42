//! Baseline API signatures.
//!
//! A baseline is the set of classes (and their directly declared members) that
//! make up an approved API surface, e.g. a particular Java platform release.
//! [`SignatureIndex`] is the read-only, in-memory form used while checking;
//! [`SignatureWriter`] produces the on-disk form [`SignatureIndex::load`] reads.

mod error;
mod index;
pub mod member;
mod persist;
mod signature;

pub use crate::error::BaselineError;
pub use crate::index::SignatureIndex;
pub use crate::persist::{SignatureWriter, BASELINE_VERSION};
pub use crate::signature::ClassSignature;

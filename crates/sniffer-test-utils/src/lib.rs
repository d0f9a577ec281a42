//! Utilities shared by sniffer tests.
//!
//! [`ClassFileBuilder`] hand-assembles `.class` files so tests never need a
//! JDK on the machine. The `fixture-fs` feature adds helpers that lay those
//! classes out as directories and jars.

mod classfile;

#[cfg(feature = "fixture-fs")]
mod fixture_fs;

pub use classfile::{ClassFileBuilder, MethodBuilder};

#[cfg(feature = "fixture-fs")]
pub use fixture_fs::*;

/// Annotation descriptor recognised by default as "do not check this method".
pub const IGNORE_JRE_REQUIREMENT: &str = "Lorg/codehaus/mojo/animal_sniffer/IgnoreJRERequirement;";

/// Legacy spelling of [`IGNORE_JRE_REQUIREMENT`].
pub const LEGACY_IGNORE_JRE_REQUIREMENT: &str = "Lorg/jvnet/animal_sniffer/IgnoreJRERequirement;";

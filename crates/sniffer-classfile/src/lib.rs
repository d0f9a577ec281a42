//! Minimal JVM class-file reader.
//!
//! Parses just enough of a `.class` file to answer "what does this class
//! reference?": the constant pool, the member table, annotation types and the
//! decoded `Code` of every method.

#![forbid(unsafe_code)]

mod annotation;
mod classfile;
mod code;
mod constant_pool;
mod descriptor;
mod error;
mod reader;

pub use crate::annotation::Annotation;
pub use crate::classfile::{ClassFile, ClassMember};
pub use crate::code::{opcodes, Code, Instruction, Operand};
pub use crate::constant_pool::{MemberKind, MemberRef};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{FieldType, MethodDescriptor};
pub use crate::error::{Error, Result};

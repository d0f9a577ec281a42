//! Member signature strings as stored in [`ClassSignature::member_signatures`].
//!
//! [`ClassSignature::member_signatures`]: crate::ClassSignature::member_signatures

/// `name + descriptor`, e.g. `size()I`.
pub fn method_signature(name: &str, descriptor: &str) -> String {
    format!("{name}{descriptor}")
}

/// `name + '#' + descriptor`, e.g. `out#Ljava/io/PrintStream;`. The separator
/// keeps a field from colliding with a method of the same spelling.
pub fn field_signature(name: &str, descriptor: &str) -> String {
    format!("{name}#{descriptor}")
}

/// Constructors (`<init>`) and static initializers (`<clinit>`) belong to
/// exactly one class and are never inherited.
pub fn is_initializer(signature: &str) -> bool {
    signature.starts_with('<')
}

use sniffer_classfile::{opcodes, ClassFile, ClassMember, MemberKind, MemberRef, Operand};
use sniffer_config::DEFAULT_SUPPRESSION_ANNOTATIONS;
use sniffer_signatures::member;

use crate::error::MalformedClassError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    MethodCall,
    FieldAccess,
    /// `new`, `anewarray`, `checkcast` or `instanceof`.
    TypeReference,
}

/// One symbolic use of a class or member found in a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Internal name of the referenced class.
    pub owner: String,
    /// Member signature (see [`sniffer_signatures::member`]); `None` for a
    /// bare type reference.
    pub member: Option<String>,
    pub kind: ReferenceKind,
    /// The enclosing method (or class) carries a suppression annotation.
    pub site_suppressed: bool,
}

impl Reference {
    pub fn method(owner: impl Into<String>, name: &str, descriptor: &str) -> Self {
        Self {
            owner: owner.into(),
            member: Some(member::method_signature(name, descriptor)),
            kind: ReferenceKind::MethodCall,
            site_suppressed: false,
        }
    }

    pub fn field(owner: impl Into<String>, name: &str, descriptor: &str) -> Self {
        Self {
            owner: owner.into(),
            member: Some(member::field_signature(name, descriptor)),
            kind: ReferenceKind::FieldAccess,
            site_suppressed: false,
        }
    }

    pub fn type_ref(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            member: None,
            kind: ReferenceKind::TypeReference,
            site_suppressed: false,
        }
    }

    pub fn suppressed(mut self, suppressed: bool) -> Self {
        self.site_suppressed = suppressed;
        self
    }

    /// `owner` or `owner.member`, as used in diagnostics.
    pub fn describe(&self) -> String {
        match &self.member {
            Some(member) => format!("{}.{}", self.owner, member),
            None => self.owner.clone(),
        }
    }

    fn from_member_ref(member_ref: &MemberRef) -> Self {
        match member_ref.kind {
            MemberKind::Field => Self::field(&*member_ref.owner, &member_ref.name, &member_ref.descriptor),
            MemberKind::Method | MemberKind::InterfaceMethod => {
                Self::method(&*member_ref.owner, &member_ref.name, &member_ref.descriptor)
            }
        }
    }
}

/// Every reference made by one class, in method order then instruction order.
#[derive(Debug, Clone, Default)]
pub struct ClassReferences {
    pub class_name: String,
    pub references: Vec<Reference>,
}

impl ClassReferences {
    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.references.iter()
    }
}

impl IntoIterator for ClassReferences {
    type Item = Reference;
    type IntoIter = std::vec::IntoIter<Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.references.into_iter()
    }
}

impl<'a> IntoIterator for &'a ClassReferences {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.references.iter()
    }
}

/// Turns class-file bytes into [`ClassReferences`].
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    /// Annotation type descriptors, e.g. `Lorg/jvnet/animal_sniffer/IgnoreJRERequirement;`.
    suppression_markers: Vec<String>,
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::with_suppression_annotations(DEFAULT_SUPPRESSION_ANNOTATIONS)
    }
}

impl ReferenceExtractor {
    /// Annotation names may be dotted (`org.example.Skip`), internal
    /// (`org/example/Skip`) or descriptors (`Lorg/example/Skip;`).
    pub fn with_suppression_annotations<I, S>(annotations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut suppression_markers: Vec<String> = Vec::new();
        for annotation in annotations {
            let descriptor = annotation_descriptor(annotation.as_ref().trim());
            if !suppression_markers.contains(&descriptor) {
                suppression_markers.push(descriptor);
            }
        }
        Self {
            suppression_markers,
        }
    }

    pub fn suppression_markers(&self) -> &[String] {
        &self.suppression_markers
    }

    pub fn extract(
        &self,
        display_name: &str,
        bytes: &[u8],
    ) -> Result<ClassReferences, MalformedClassError> {
        let class = ClassFile::parse(bytes).map_err(|source| MalformedClassError {
            class: display_name.to_string(),
            source,
        })?;
        self.extract_from(display_name, &class)
    }

    pub fn extract_from(
        &self,
        display_name: &str,
        class: &ClassFile,
    ) -> Result<ClassReferences, MalformedClassError> {
        let class_suppressed = self
            .suppression_markers
            .iter()
            .any(|marker| class.has_annotation(marker));

        let mut references = Vec::new();
        for method in &class.methods {
            let suppressed = class_suppressed || self.is_suppressed(method);
            self.extract_method(method, suppressed, &mut references)
                .map_err(|source| MalformedClassError {
                    class: display_name.to_string(),
                    source,
                })?;
        }

        tracing::trace!(
            class = %class.this_class,
            references = references.len(),
            "extracted references"
        );
        Ok(ClassReferences {
            class_name: class.this_class.clone(),
            references,
        })
    }

    fn is_suppressed(&self, method: &ClassMember) -> bool {
        self.suppression_markers
            .iter()
            .any(|marker| method.has_annotation(marker))
    }

    fn extract_method(
        &self,
        method: &ClassMember,
        suppressed: bool,
        out: &mut Vec<Reference>,
    ) -> sniffer_classfile::Result<()> {
        let Some(code) = &method.code else {
            return Ok(());
        };

        for insn in &code.instructions {
            let reference = match &insn.operand {
                Operand::Member(member_ref) => {
                    match member_ref.kind {
                        MemberKind::Field => {
                            sniffer_classfile::parse_field_descriptor(&member_ref.descriptor)?;
                        }
                        MemberKind::Method | MemberKind::InterfaceMethod => {
                            sniffer_classfile::parse_method_descriptor(&member_ref.descriptor)?;
                        }
                    }
                    Reference::from_member_ref(member_ref)
                }
                Operand::Class(name) if is_type_reference(insn.opcode) => Reference::type_ref(name),
                _ => continue,
            };

            if reference.owner.starts_with('[') {
                continue;
            }
            out.push(reference.suppressed(suppressed));
        }
        Ok(())
    }
}

fn is_type_reference(opcode: u8) -> bool {
    matches!(
        opcode,
        opcodes::NEW | opcodes::ANEWARRAY | opcodes::CHECKCAST | opcodes::INSTANCEOF
    )
}

fn annotation_descriptor(name: &str) -> String {
    if name.starts_with('L') && name.ends_with(';') {
        return name.to_string();
    }
    format!("L{};", name.replace('.', "/"))
}

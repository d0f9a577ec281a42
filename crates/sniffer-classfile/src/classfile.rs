use crate::annotation::Annotation;
use crate::code::Code;
use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal name, e.g. `com/example/Main`.
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<Annotation>,
    /// Present for methods that are neither `abstract` nor `native`.
    pub code: Option<Code>,
}

impl ClassMember {
    pub fn has_annotation(&self, type_descriptor: &str) -> bool {
        self.annotations
            .iter()
            .any(|ann| ann.type_descriptor == type_descriptor)
    }
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != 0xCAFEBABE {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?;
        let super_class = match reader.read_u2()? {
            0 => None,
            idx => Some(cp.get_class_name(idx)?),
        };

        let interfaces_count = reader.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(reader.read_u2()?)?);
        }

        let fields_count = reader.read_u2()? as usize;
        let mut fields = Vec::with_capacity(fields_count);
        for _ in 0..fields_count {
            fields.push(parse_member(&mut reader, &cp, MemberTarget::Field)?);
        }

        let methods_count = reader.read_u2()? as usize;
        let mut methods = Vec::with_capacity(methods_count);
        for _ in 0..methods_count {
            methods.push(parse_member(&mut reader, &cp, MemberTarget::Method)?);
        }

        let class_attrs = parse_attributes(&mut reader, &cp, MemberTarget::Class)?;

        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            annotations: class_attrs.annotations,
        })
    }

    pub fn has_annotation(&self, type_descriptor: &str) -> bool {
        self.annotations
            .iter()
            .any(|ann| ann.type_descriptor == type_descriptor)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum MemberTarget {
    Class,
    Field,
    Method,
}

#[derive(Default)]
struct ParsedAttributes {
    annotations: Vec<Annotation>,
    code: Option<Code>,
}

fn parse_member(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    target: MemberTarget,
) -> Result<ClassMember> {
    let access_flags = reader.read_u2()?;
    let name = cp.get_utf8(reader.read_u2()?)?.to_string();
    let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

    let attrs = parse_attributes(reader, cp, target)?;
    Ok(ClassMember {
        access_flags,
        name,
        descriptor,
        annotations: attrs.annotations,
        code: attrs.code,
    })
}

fn parse_attributes(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    target: MemberTarget,
) -> Result<ParsedAttributes> {
    let attributes_count = reader.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let info = reader.read_bytes(length)?;
        let name = cp.get_utf8(name_index)?;

        match name {
            "RuntimeVisibleAnnotations" => {
                parsed
                    .annotations
                    .extend(Annotation::parse_attribute(info, cp, true)?);
            }
            "RuntimeInvisibleAnnotations" => {
                parsed
                    .annotations
                    .extend(Annotation::parse_attribute(info, cp, false)?);
            }
            "Code" if target == MemberTarget::Method => {
                if parsed.code.is_some() {
                    return Err(Error::MalformedAttribute("Code"));
                }
                parsed.code = Some(Code::parse(info, cp)?);
            }
            _ => {}
        }
    }

    Ok(parsed)
}

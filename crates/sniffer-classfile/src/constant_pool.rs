use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    Fieldref { class_index: u16, name_and_type_index: u16 },
    Methodref { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodref { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { reference_kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
}

impl CpInfo {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CpInfo::Utf8(_) => "Utf8",
            CpInfo::Integer(_) => "Integer",
            CpInfo::Float(_) => "Float",
            CpInfo::Long(_) => "Long",
            CpInfo::Double(_) => "Double",
            CpInfo::Class { .. } => "Class",
            CpInfo::String { .. } => "String",
            CpInfo::Fieldref { .. } => "Fieldref",
            CpInfo::Methodref { .. } => "Methodref",
            CpInfo::InterfaceMethodref { .. } => "InterfaceMethodref",
            CpInfo::NameAndType { .. } => "NameAndType",
            CpInfo::MethodHandle { .. } => "MethodHandle",
            CpInfo::MethodType { .. } => "MethodType",
            CpInfo::Dynamic { .. } => "Dynamic",
            CpInfo::InvokeDynamic { .. } => "InvokeDynamic",
            CpInfo::Module { .. } => "Module",
            CpInfo::Package { .. } => "Package",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
    InterfaceMethod,
}

/// A symbolic field or method reference resolved out of the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub kind: MemberKind,
    /// Internal name of the owning class, e.g. `java/util/List`. Array owners
    /// keep their descriptor form (`[Ljava/lang/Object;`).
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

/// Constant pool with 1-based indexing. The second slot of a `Long`/`Double`
/// entry is stored as `None`.
#[derive(Debug, Clone)]
pub(crate) struct ConstantPool {
    entries: Vec<Option<CpInfo>>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        // Index 0 is never valid.
        entries.push(None);

        while entries.len() < count {
            let tag = reader.read_u1()?;
            let info = match tag {
                1 => {
                    let len = reader.read_u2()? as usize;
                    CpInfo::Utf8(decode_modified_utf8(reader.read_bytes(len)?)?)
                }
                3 => CpInfo::Integer(reader.read_i4()?),
                4 => CpInfo::Float(f32::from_bits(reader.read_u4()?)),
                5 => CpInfo::Long(reader.read_u8()? as i64),
                6 => CpInfo::Double(f64::from_bits(reader.read_u8()?)),
                7 => CpInfo::Class {
                    name_index: reader.read_u2()?,
                },
                8 => CpInfo::String {
                    string_index: reader.read_u2()?,
                },
                9 => CpInfo::Fieldref {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                10 => CpInfo::Methodref {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                11 => CpInfo::InterfaceMethodref {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                12 => CpInfo::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                15 => CpInfo::MethodHandle {
                    reference_kind: reader.read_u1()?,
                    reference_index: reader.read_u2()?,
                },
                16 => CpInfo::MethodType {
                    descriptor_index: reader.read_u2()?,
                },
                17 => CpInfo::Dynamic {
                    bootstrap_method_attr_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                18 => CpInfo::InvokeDynamic {
                    bootstrap_method_attr_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                19 => CpInfo::Module {
                    name_index: reader.read_u2()?,
                },
                20 => CpInfo::Package {
                    name_index: reader.read_u2()?,
                },
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };

            let wide = matches!(info, CpInfo::Long(_) | CpInfo::Double(_));
            entries.push(Some(info));
            if wide {
                if entries.len() >= count {
                    return Err(Error::Other("8-byte constant occupies the last pool slot"));
                }
                entries.push(None);
            }
        }

        Ok(Self { entries })
    }

    pub(crate) fn get(&self, index: u16) -> Result<&CpInfo> {
        self.entries
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidConstantPoolIndex(index))
    }

    pub(crate) fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            CpInfo::Utf8(s) => Ok(s),
            other => Err(mismatch(index, "Utf8", other)),
        }
    }

    pub(crate) fn get_class_name(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            CpInfo::Class { name_index } => Ok(self.get_utf8(*name_index)?.to_string()),
            other => Err(mismatch(index, "Class", other)),
        }
    }

    pub(crate) fn get_name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            CpInfo::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((
                self.get_utf8(*name_index)?,
                self.get_utf8(*descriptor_index)?,
            )),
            other => Err(mismatch(index, "NameAndType", other)),
        }
    }

    pub(crate) fn get_member_ref(&self, index: u16) -> Result<MemberRef> {
        let (kind, class_index, name_and_type_index) = match self.get(index)? {
            CpInfo::Fieldref {
                class_index,
                name_and_type_index,
            } => (MemberKind::Field, *class_index, *name_and_type_index),
            CpInfo::Methodref {
                class_index,
                name_and_type_index,
            } => (MemberKind::Method, *class_index, *name_and_type_index),
            CpInfo::InterfaceMethodref {
                class_index,
                name_and_type_index,
            } => (MemberKind::InterfaceMethod, *class_index, *name_and_type_index),
            other => return Err(mismatch(index, "Fieldref/Methodref", other)),
        };

        let owner = self.get_class_name(class_index)?;
        let (name, descriptor) = self.get_name_and_type(name_and_type_index)?;
        Ok(MemberRef {
            kind,
            owner,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    pub(crate) fn get_invoke_dynamic(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            CpInfo::InvokeDynamic {
                name_and_type_index,
                ..
            } => self.get_name_and_type(*name_and_type_index),
            other => Err(mismatch(index, "InvokeDynamic", other)),
        }
    }
}

fn mismatch(index: u16, expected: &'static str, found: &CpInfo) -> Error {
    Error::ConstantPoolTypeMismatch {
        index,
        expected,
        found: found.kind(),
    }
}

/// Decode the JVM's "modified UTF-8": NUL is encoded as `C0 80` and
/// supplementary characters as a surrogate pair of 3-byte sequences.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    // Fast path: plain ASCII without embedded NULs.
    if bytes.iter().all(|b| *b != 0 && *b < 0x80) {
        return String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidModifiedUtf8);
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let a = bytes[i] as u16;
        if a == 0 {
            return Err(Error::InvalidModifiedUtf8);
        }
        if a < 0x80 {
            units.push(a);
            i += 1;
        } else if a & 0xE0 == 0xC0 {
            let b = continuation(bytes, i + 1)?;
            units.push(((a & 0x1F) << 6) | b);
            i += 2;
        } else if a & 0xF0 == 0xE0 {
            let b = continuation(bytes, i + 1)?;
            let c = continuation(bytes, i + 2)?;
            units.push(((a & 0x0F) << 12) | (b << 6) | c);
            i += 3;
        } else {
            return Err(Error::InvalidModifiedUtf8);
        }
    }

    String::from_utf16(&units).map_err(|_| Error::InvalidModifiedUtf8)
}

fn continuation(bytes: &[u8], idx: usize) -> Result<u16> {
    match bytes.get(idx) {
        Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        _ => Err(Error::InvalidModifiedUtf8),
    }
}

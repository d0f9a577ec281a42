use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

/// Deepest nesting of array and annotation element values accepted.
const MAX_ELEMENT_DEPTH: usize = 256;

/// An annotation attached to a class or member. Only the annotation type is
/// retained; element values are validated and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Field descriptor of the annotation type, e.g. `Ljava/lang/Deprecated;`.
    pub type_descriptor: String,
    pub visible: bool,
}

impl Annotation {
    pub fn type_internal_name(&self) -> Option<&str> {
        self.type_descriptor
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
    }

    /// Parse the body of a `Runtime{Visible,Invisible}Annotations` attribute.
    pub(crate) fn parse_attribute(
        info: &[u8],
        cp: &ConstantPool,
        visible: bool,
    ) -> Result<Vec<Self>> {
        let mut reader = Reader::new(info);
        let num = reader.read_u2()? as usize;
        let mut out = Vec::with_capacity(num);
        for _ in 0..num {
            out.push(Self::parse(&mut reader, cp, visible)?);
        }
        reader.ensure_empty()?;
        Ok(out)
    }

    fn parse(reader: &mut Reader<'_>, cp: &ConstantPool, visible: bool) -> Result<Self> {
        let type_descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();
        skip_element_value_pairs(reader, cp, 0)?;
        Ok(Self {
            type_descriptor,
            visible,
        })
    }
}

fn skip_element_value_pairs(reader: &mut Reader<'_>, cp: &ConstantPool, depth: usize) -> Result<()> {
    let pairs = reader.read_u2()? as usize;
    for _ in 0..pairs {
        cp.get_utf8(reader.read_u2()?)?;
        skip_element_value(reader, cp, depth)?;
    }
    Ok(())
}

fn skip_element_value(reader: &mut Reader<'_>, cp: &ConstantPool, depth: usize) -> Result<()> {
    if depth >= MAX_ELEMENT_DEPTH {
        return Err(Error::MalformedAttribute("RuntimeAnnotations"));
    }
    match reader.read_u1()? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => {
            cp.get(reader.read_u2()?)?;
        }
        b's' | b'c' => {
            cp.get_utf8(reader.read_u2()?)?;
        }
        b'e' => {
            cp.get_utf8(reader.read_u2()?)?;
            cp.get_utf8(reader.read_u2()?)?;
        }
        b'@' => {
            cp.get_utf8(reader.read_u2()?)?;
            skip_element_value_pairs(reader, cp, depth + 1)?;
        }
        b'[' => {
            let len = reader.read_u2()? as usize;
            for _ in 0..len {
                skip_element_value(reader, cp, depth + 1)?;
            }
        }
        _ => return Err(Error::MalformedAttribute("RuntimeAnnotations")),
    }
    Ok(())
}

use crate::error::{Error, Result};

/// A parsed JVM field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// One of `B C D F I J S Z`.
    Primitive(char),
    /// Internal class name, e.g. `java/lang/String`.
    Object(String),
    Array {
        dimensions: u8,
        element: Box<FieldType>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    /// `None` for `V`.
    pub return_type: Option<FieldType>,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let mut cursor = Cursor { desc, pos: 0 };
    let ty = cursor.field_type()?;
    cursor.finish()?;
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let mut cursor = Cursor { desc, pos: 0 };
    cursor.expect(b'(')?;

    let mut params = Vec::new();
    while cursor.peek()? != b')' {
        params.push(cursor.field_type()?);
    }
    cursor.expect(b')')?;

    let return_type = if cursor.peek()? == b'V' {
        cursor.pos += 1;
        None
    } else {
        Some(cursor.field_type()?)
    };
    cursor.finish()?;

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

struct Cursor<'a> {
    desc: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn invalid(&self) -> Error {
        Error::InvalidDescriptor(self.desc.to_string())
    }

    fn peek(&self) -> Result<u8> {
        self.desc
            .as_bytes()
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.invalid())
    }

    fn expect(&mut self, b: u8) -> Result<()> {
        if self.peek()? != b {
            return Err(self.invalid());
        }
        self.pos += 1;
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        if self.pos == self.desc.len() {
            Ok(())
        } else {
            Err(self.invalid())
        }
    }

    fn field_type(&mut self) -> Result<FieldType> {
        let mut dimensions: u32 = 0;
        while self.peek()? == b'[' {
            dimensions += 1;
            self.pos += 1;
        }
        if dimensions > u8::MAX as u32 {
            return Err(self.invalid());
        }

        let element = match self.peek()? {
            b @ (b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                self.pos += 1;
                FieldType::Primitive(b as char)
            }
            b'L' => {
                let start = self.pos + 1;
                let len = self.desc[start..].find(';').ok_or_else(|| self.invalid())?;
                if len == 0 {
                    return Err(self.invalid());
                }
                self.pos = start + len + 1;
                FieldType::Object(self.desc[start..start + len].to_string())
            }
            _ => return Err(self.invalid()),
        };

        Ok(if dimensions == 0 {
            element
        } else {
            FieldType::Array {
                dimensions: dimensions as u8,
                element: Box::new(element),
            }
        })
    }
}

use crate::constant_pool::{ConstantPool, MemberRef};
use crate::error::{Error, Result};
use crate::reader::Reader;

/// Opcodes whose operands are decoded into an [`Operand`].
pub mod opcodes {
    pub const LDC: u8 = 0x12;
    pub const LDC_W: u8 = 0x13;
    pub const LDC2_W: u8 = 0x14;
    pub const TABLESWITCH: u8 = 0xaa;
    pub const LOOKUPSWITCH: u8 = 0xab;
    pub const GETSTATIC: u8 = 0xb2;
    pub const PUTSTATIC: u8 = 0xb3;
    pub const GETFIELD: u8 = 0xb4;
    pub const PUTFIELD: u8 = 0xb5;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
    pub const INVOKESPECIAL: u8 = 0xb7;
    pub const INVOKESTATIC: u8 = 0xb8;
    pub const INVOKEINTERFACE: u8 = 0xb9;
    pub const INVOKEDYNAMIC: u8 = 0xba;
    pub const NEW: u8 = 0xbb;
    pub const NEWARRAY: u8 = 0xbc;
    pub const ANEWARRAY: u8 = 0xbd;
    pub const CHECKCAST: u8 = 0xc0;
    pub const INSTANCEOF: u8 = 0xc1;
    pub const WIDE: u8 = 0xc4;
    pub const MULTIANEWARRAY: u8 = 0xc5;
    pub const IINC: u8 = 0x84;
}

/// The decoded body of a `Code` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Byte offset from the start of the method's bytecode.
    pub offset: u32,
    pub opcode: u8,
    pub operand: Operand,
}

/// Symbolic operand of an instruction, when it points into the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    /// Field access or method invocation.
    Member(MemberRef),
    /// `new`, `anewarray`, `checkcast`, `instanceof`: internal name or array descriptor.
    Class(String),
    MultiANewArray { class: String, dimensions: u8 },
    /// `invokedynamic` call site name and descriptor.
    Dynamic { name: String, descriptor: String },
    /// `ldc` family; the index is kept unresolved.
    Constant(u16),
}

impl Code {
    pub(crate) fn parse(info: &[u8], cp: &ConstantPool) -> Result<Self> {
        let mut reader = Reader::new(info);
        let max_stack = reader.read_u2()?;
        let max_locals = reader.read_u2()?;
        let code_length = reader.read_u4()? as usize;
        if code_length == 0 {
            return Err(Error::MalformedAttribute("Code"));
        }
        let bytecode = reader.read_bytes(code_length)?;
        let instructions = decode(bytecode, cp)?;

        // exception_table: start_pc, end_pc, handler_pc, catch_type
        let exception_table_length = reader.read_u2()? as usize;
        reader.skip(exception_table_length * 8)?;

        let attributes_count = reader.read_u2()? as usize;
        for _ in 0..attributes_count {
            reader.read_u2()?;
            let length = reader.read_u4()? as usize;
            reader.skip(length)?;
        }
        reader.ensure_empty()?;

        Ok(Self {
            max_stack,
            max_locals,
            instructions,
        })
    }
}

fn decode(bytecode: &[u8], cp: &ConstantPool) -> Result<Vec<Instruction>> {
    use opcodes::*;

    let mut reader = Reader::new(bytecode);
    let mut out = Vec::new();
    while !reader.is_empty() {
        let offset = reader.position() as u32;
        let opcode = reader.read_u1()?;
        let operand = match opcode {
            GETSTATIC | PUTSTATIC | GETFIELD | PUTFIELD | INVOKEVIRTUAL | INVOKESPECIAL
            | INVOKESTATIC => Operand::Member(cp.get_member_ref(reader.read_u2()?)?),
            INVOKEINTERFACE => {
                let member = cp.get_member_ref(reader.read_u2()?)?;
                // count, 0
                reader.skip(2)?;
                Operand::Member(member)
            }
            INVOKEDYNAMIC => {
                let (name, descriptor) = cp.get_invoke_dynamic(reader.read_u2()?)?;
                reader.skip(2)?;
                Operand::Dynamic {
                    name: name.to_string(),
                    descriptor: descriptor.to_string(),
                }
            }
            NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
                Operand::Class(cp.get_class_name(reader.read_u2()?)?)
            }
            MULTIANEWARRAY => {
                let class = cp.get_class_name(reader.read_u2()?)?;
                let dimensions = reader.read_u1()?;
                Operand::MultiANewArray { class, dimensions }
            }
            LDC => Operand::Constant(reader.read_u1()? as u16),
            LDC_W | LDC2_W => Operand::Constant(reader.read_u2()?),
            TABLESWITCH => {
                skip_switch_padding(&mut reader, offset)?;
                reader.skip(4)?; // default
                let low = reader.read_i4()?;
                let high = reader.read_i4()?;
                if high < low {
                    return Err(Error::MalformedAttribute("Code"));
                }
                let count = (high as i64 - low as i64 + 1) as usize;
                reader.skip(count.checked_mul(4).ok_or(Error::UnexpectedEof)?)?;
                Operand::None
            }
            LOOKUPSWITCH => {
                skip_switch_padding(&mut reader, offset)?;
                reader.skip(4)?; // default
                let npairs = reader.read_i4()?;
                if npairs < 0 {
                    return Err(Error::MalformedAttribute("Code"));
                }
                reader.skip((npairs as usize).checked_mul(8).ok_or(Error::UnexpectedEof)?)?;
                Operand::None
            }
            WIDE => {
                let modified = reader.read_u1()?;
                match modified {
                    IINC => reader.skip(4)?,
                    // iload..aload, istore..astore, ret
                    0x15..=0x19 | 0x36..=0x3a | 0xa9 => reader.skip(2)?,
                    _ => return Err(Error::InvalidOpcode { offset, opcode: modified }),
                }
                Operand::None
            }
            _ => {
                let len = fixed_operand_len(opcode).ok_or(Error::InvalidOpcode { offset, opcode })?;
                reader.skip(len)?;
                Operand::None
            }
        };
        out.push(Instruction {
            offset,
            opcode,
            operand,
        });
    }
    Ok(out)
}

/// Switch operands start at the next 4-byte boundary relative to the start of
/// the bytecode.
fn skip_switch_padding(reader: &mut Reader<'_>, opcode_offset: u32) -> Result<()> {
    let pad = (4 - ((opcode_offset as usize + 1) % 4)) % 4;
    reader.skip(pad)
}

/// Operand length of every opcode with a fixed-size encoding. `None` marks
/// reserved or unassigned opcodes.
fn fixed_operand_len(opcode: u8) -> Option<usize> {
    let len = match opcode {
        // constants, loads/stores with implicit index, array ops, stack ops,
        // arithmetic, conversions, comparisons
        0x00..=0x0f => 0,
        0x10 => 1, // bipush
        0x11 => 2, // sipush
        0x15..=0x19 => 1,
        0x1a..=0x35 => 0,
        0x36..=0x3a => 1,
        0x3b..=0x83 => 0,
        0x84 => 2, // iinc
        0x85..=0x98 => 0,
        0x99..=0xa8 => 2, // if*, goto, jsr
        0xa9 => 1,        // ret
        0xac..=0xb1 => 0, // returns
        0xbc => 1,        // newarray
        0xbe | 0xbf => 0, // arraylength, athrow
        0xc2 | 0xc3 => 0, // monitorenter, monitorexit
        0xc6 | 0xc7 => 2, // ifnull, ifnonnull
        0xc8 | 0xc9 => 4, // goto_w, jsr_w
        _ => return None,
    };
    Some(len)
}

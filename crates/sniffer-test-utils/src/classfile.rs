use std::collections::HashMap;

const MAJOR_JAVA_8: u16 = 52;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_SUPER: u16 = 0x0020;
const ACC_ABSTRACT: u16 = 0x0400;

fn push_u2(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_u4(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum CpEntry {
    Utf8(String),
    Integer(i32),
    Class { name_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    Fieldref { class_index: u16, nat_index: u16 },
    Methodref { class_index: u16, nat_index: u16 },
    InterfaceMethodref { class_index: u16, nat_index: u16 },
    InvokeDynamic { bsm_index: u16, nat_index: u16 },
}

/// Deduplicating constant-pool writer.
#[derive(Default)]
struct Cp {
    entries: Vec<CpEntry>,
    lookup: HashMap<CpEntry, u16>,
}

impl Cp {
    fn push(&mut self, entry: CpEntry) -> u16 {
        if let Some(idx) = self.lookup.get(&entry) {
            return *idx;
        }
        self.entries.push(entry.clone());
        let idx = self.entries.len() as u16;
        self.lookup.insert(entry, idx);
        idx
    }

    fn utf8(&mut self, s: &str) -> u16 {
        self.push(CpEntry::Utf8(s.to_string()))
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.push(CpEntry::Class { name_index })
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.push(CpEntry::NameAndType {
            name_index,
            descriptor_index,
        })
    }

    fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(owner);
        let nat_index = self.name_and_type(name, descriptor);
        self.push(CpEntry::Fieldref {
            class_index,
            nat_index,
        })
    }

    fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str, interface: bool) -> u16 {
        let class_index = self.class(owner);
        let nat_index = self.name_and_type(name, descriptor);
        if interface {
            self.push(CpEntry::InterfaceMethodref {
                class_index,
                nat_index,
            })
        } else {
            self.push(CpEntry::Methodref {
                class_index,
                nat_index,
            })
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        push_u2(out, (self.entries.len() as u16) + 1);
        for entry in &self.entries {
            match entry {
                CpEntry::Utf8(s) => {
                    out.push(1);
                    push_u2(out, s.len() as u16);
                    out.extend_from_slice(s.as_bytes());
                }
                CpEntry::Integer(v) => {
                    out.push(3);
                    out.extend_from_slice(&v.to_be_bytes());
                }
                CpEntry::Class { name_index } => {
                    out.push(7);
                    push_u2(out, *name_index);
                }
                CpEntry::Fieldref {
                    class_index,
                    nat_index,
                } => {
                    out.push(9);
                    push_u2(out, *class_index);
                    push_u2(out, *nat_index);
                }
                CpEntry::Methodref {
                    class_index,
                    nat_index,
                } => {
                    out.push(10);
                    push_u2(out, *class_index);
                    push_u2(out, *nat_index);
                }
                CpEntry::InterfaceMethodref {
                    class_index,
                    nat_index,
                } => {
                    out.push(11);
                    push_u2(out, *class_index);
                    push_u2(out, *nat_index);
                }
                CpEntry::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    out.push(12);
                    push_u2(out, *name_index);
                    push_u2(out, *descriptor_index);
                }
                CpEntry::InvokeDynamic {
                    bsm_index,
                    nat_index,
                } => {
                    out.push(18);
                    push_u2(out, *bsm_index);
                    push_u2(out, *nat_index);
                }
            }
        }
    }
}

#[derive(Clone)]
enum Op {
    Invoke {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
    },
    Field {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
    },
    Type {
        opcode: u8,
        class: String,
    },
    MultiANewArray {
        class: String,
        dimensions: u8,
    },
    InvokeDynamic {
        name: String,
        descriptor: String,
    },
    LdcInt(i32),
    TableSwitch {
        low: i32,
        high: i32,
    },
    LookupSwitch {
        keys: Vec<i32>,
    },
    Raw(Vec<u8>),
}

/// Builder for one method. A `return` instruction is appended to non-empty
/// bodies automatically.
#[derive(Clone)]
pub struct MethodBuilder {
    name: String,
    descriptor: String,
    access_flags: u16,
    annotations: Vec<(String, bool)>,
    ops: Vec<Op>,
    has_code: bool,
}

impl MethodBuilder {
    pub fn new(name: &str, descriptor: &str) -> Self {
        Self {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access_flags: ACC_PUBLIC,
            annotations: Vec::new(),
            ops: Vec::new(),
            has_code: true,
        }
    }

    /// An `abstract` method without a `Code` attribute.
    pub fn abstract_method(name: &str, descriptor: &str) -> Self {
        let mut this = Self::new(name, descriptor);
        this.access_flags |= ACC_ABSTRACT;
        this.has_code = false;
        this
    }

    /// Attach an annotation by descriptor (`Lcom/example/Marker;`).
    pub fn annotation(mut self, descriptor: &str, visible: bool) -> Self {
        self.annotations.push((descriptor.to_string(), visible));
        self
    }

    fn invoke(mut self, opcode: u8, owner: &str, name: &str, descriptor: &str) -> Self {
        self.ops.push(Op::Invoke {
            opcode,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    pub fn invoke_virtual(self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.invoke(0xb6, owner, name, descriptor)
    }

    pub fn invoke_special(self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.invoke(0xb7, owner, name, descriptor)
    }

    pub fn invoke_static(self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.invoke(0xb8, owner, name, descriptor)
    }

    pub fn invoke_interface(self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.invoke(0xb9, owner, name, descriptor)
    }

    fn field(mut self, opcode: u8, owner: &str, name: &str, descriptor: &str) -> Self {
        self.ops.push(Op::Field {
            opcode,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    pub fn get_static(self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.field(0xb2, owner, name, descriptor)
    }

    pub fn put_static(self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.field(0xb3, owner, name, descriptor)
    }

    pub fn get_field(self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.field(0xb4, owner, name, descriptor)
    }

    pub fn put_field(self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.field(0xb5, owner, name, descriptor)
    }

    fn type_insn(mut self, opcode: u8, class: &str) -> Self {
        self.ops.push(Op::Type {
            opcode,
            class: class.to_string(),
        });
        self
    }

    pub fn new_object(self, class: &str) -> Self {
        self.type_insn(0xbb, class)
    }

    pub fn anewarray(self, class: &str) -> Self {
        self.type_insn(0xbd, class)
    }

    pub fn checkcast(self, class: &str) -> Self {
        self.type_insn(0xc0, class)
    }

    pub fn instance_of(self, class: &str) -> Self {
        self.type_insn(0xc1, class)
    }

    pub fn multianewarray(mut self, class: &str, dimensions: u8) -> Self {
        self.ops.push(Op::MultiANewArray {
            class: class.to_string(),
            dimensions,
        });
        self
    }

    pub fn invoke_dynamic(mut self, name: &str, descriptor: &str) -> Self {
        self.ops.push(Op::InvokeDynamic {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    pub fn ldc_int(mut self, value: i32) -> Self {
        self.ops.push(Op::LdcInt(value));
        self
    }

    pub fn table_switch(mut self, low: i32, high: i32) -> Self {
        self.ops.push(Op::TableSwitch { low, high });
        self
    }

    pub fn lookup_switch(mut self, keys: &[i32]) -> Self {
        self.ops.push(Op::LookupSwitch {
            keys: keys.to_vec(),
        });
        self
    }

    /// Append raw bytecode, e.g. `&[0x03, 0x57]` (`iconst_0; pop`).
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.ops.push(Op::Raw(bytes.to_vec()));
        self
    }

    fn write(&self, cp: &mut Cp, out: &mut Vec<u8>) {
        push_u2(out, self.access_flags);
        push_u2(out, cp.utf8(&self.name));
        push_u2(out, cp.utf8(&self.descriptor));

        let mut attributes: Vec<(u16, Vec<u8>)> = Vec::new();
        if self.has_code {
            let code = self.assemble(cp);
            let mut attr = Vec::new();
            push_u2(&mut attr, 8); // max_stack
            push_u2(&mut attr, 8); // max_locals
            push_u4(&mut attr, code.len() as u32);
            attr.extend_from_slice(&code);
            push_u2(&mut attr, 0); // exception_table_length
            push_u2(&mut attr, 0); // attributes_count
            attributes.push((cp.utf8("Code"), attr));
        }
        attributes.extend(annotation_attributes(cp, &self.annotations));

        write_attributes(out, &attributes);
    }

    fn assemble(&self, cp: &mut Cp) -> Vec<u8> {
        let mut code = Vec::new();
        for op in &self.ops {
            match op {
                Op::Invoke {
                    opcode,
                    owner,
                    name,
                    descriptor,
                } => {
                    let interface = *opcode == 0xb9;
                    let idx = cp.method_ref(owner, name, descriptor, interface);
                    code.push(*opcode);
                    push_u2(&mut code, idx);
                    if interface {
                        code.push(1); // count
                        code.push(0);
                    }
                }
                Op::Field {
                    opcode,
                    owner,
                    name,
                    descriptor,
                } => {
                    let idx = cp.field_ref(owner, name, descriptor);
                    code.push(*opcode);
                    push_u2(&mut code, idx);
                }
                Op::Type { opcode, class } => {
                    let idx = cp.class(class);
                    code.push(*opcode);
                    push_u2(&mut code, idx);
                }
                Op::MultiANewArray { class, dimensions } => {
                    let idx = cp.class(class);
                    code.push(0xc5);
                    push_u2(&mut code, idx);
                    code.push(*dimensions);
                }
                Op::InvokeDynamic { name, descriptor } => {
                    let nat_index = cp.name_and_type(name, descriptor);
                    let idx = cp.push(CpEntry::InvokeDynamic {
                        bsm_index: 0,
                        nat_index,
                    });
                    code.push(0xba);
                    push_u2(&mut code, idx);
                    code.extend_from_slice(&[0, 0]);
                }
                Op::LdcInt(value) => {
                    let idx = cp.push(CpEntry::Integer(*value));
                    code.push(0x13); // ldc_w
                    push_u2(&mut code, idx);
                }
                Op::TableSwitch { low, high } => {
                    code.push(0xaa);
                    pad_to_four(&mut code);
                    code.extend_from_slice(&0i32.to_be_bytes());
                    code.extend_from_slice(&low.to_be_bytes());
                    code.extend_from_slice(&high.to_be_bytes());
                    for _ in *low..=*high {
                        code.extend_from_slice(&0i32.to_be_bytes());
                    }
                }
                Op::LookupSwitch { keys } => {
                    code.push(0xab);
                    pad_to_four(&mut code);
                    code.extend_from_slice(&0i32.to_be_bytes());
                    code.extend_from_slice(&(keys.len() as i32).to_be_bytes());
                    for key in keys {
                        code.extend_from_slice(&key.to_be_bytes());
                        code.extend_from_slice(&0i32.to_be_bytes());
                    }
                }
                Op::Raw(bytes) => code.extend_from_slice(bytes),
            }
        }
        code.push(0xb1); // return
        code
    }
}

fn pad_to_four(code: &mut Vec<u8>) {
    while code.len() % 4 != 0 {
        code.push(0);
    }
}

fn annotation_attributes(cp: &mut Cp, annotations: &[(String, bool)]) -> Vec<(u16, Vec<u8>)> {
    let mut out = Vec::new();
    for (attr_name, visible) in [
        ("RuntimeVisibleAnnotations", true),
        ("RuntimeInvisibleAnnotations", false),
    ] {
        let selected: Vec<&String> = annotations
            .iter()
            .filter(|(_, v)| *v == visible)
            .map(|(desc, _)| desc)
            .collect();
        if selected.is_empty() {
            continue;
        }
        let mut attr = Vec::new();
        push_u2(&mut attr, selected.len() as u16);
        for desc in selected {
            push_u2(&mut attr, cp.utf8(desc));
            push_u2(&mut attr, 0); // num_element_value_pairs
        }
        out.push((cp.utf8(attr_name), attr));
    }
    out
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    push_u2(out, attributes.len() as u16);
    for (name_index, body) in attributes {
        push_u2(out, *name_index);
        push_u4(out, body.len() as u32);
        out.extend_from_slice(body);
    }
}

/// Hand-assembles a Java 8 class file.
///
/// ```
/// use sniffer_test_utils::{ClassFileBuilder, MethodBuilder};
///
/// let bytes = ClassFileBuilder::new("com/example/App")
///     .method(MethodBuilder::new("run", "()V").invoke_interface("java/util/List", "size", "()I"))
///     .build();
/// assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
/// ```
#[derive(Clone)]
pub struct ClassFileBuilder {
    name: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<(String, String)>,
    methods: Vec<MethodBuilder>,
    annotations: Vec<(String, bool)>,
}

impl ClassFileBuilder {
    pub fn new(internal_name: &str) -> Self {
        Self {
            name: internal_name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn super_class(mut self, super_class: Option<&str>) -> Self {
        self.super_class = super_class.map(str::to_string);
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        self.fields.push((name.to_string(), descriptor.to_string()));
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    pub fn annotation(mut self, descriptor: &str, visible: bool) -> Self {
        self.annotations.push((descriptor.to_string(), visible));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut cp = Cp::default();
        let this_class = cp.class(&self.name);
        let super_class = self.super_class.as_deref().map(|s| cp.class(s)).unwrap_or(0);
        let interfaces: Vec<u16> = self.interfaces.iter().map(|i| cp.class(i)).collect();

        let mut body = Vec::new();
        push_u2(&mut body, ACC_PUBLIC | ACC_SUPER);
        push_u2(&mut body, this_class);
        push_u2(&mut body, super_class);
        push_u2(&mut body, interfaces.len() as u16);
        for idx in interfaces {
            push_u2(&mut body, idx);
        }

        push_u2(&mut body, self.fields.len() as u16);
        for (name, descriptor) in &self.fields {
            push_u2(&mut body, ACC_PUBLIC);
            push_u2(&mut body, cp.utf8(name));
            push_u2(&mut body, cp.utf8(descriptor));
            push_u2(&mut body, 0); // attributes_count
        }

        push_u2(&mut body, self.methods.len() as u16);
        for method in &self.methods {
            method.write(&mut cp, &mut body);
        }

        let class_attributes = annotation_attributes(&mut cp, &self.annotations);
        write_attributes(&mut body, &class_attributes);

        // The constant pool is only complete once every member has been
        // written, so it is emitted last and spliced in front of the body.
        let mut out = Vec::new();
        push_u4(&mut out, 0xCAFEBABE);
        push_u2(&mut out, 0); // minor
        push_u2(&mut out, MAJOR_JAVA_8);
        cp.write(&mut out);
        out.extend_from_slice(&body);
        out
    }
}

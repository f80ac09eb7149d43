//! Type node model.
//!
//! [`Type`] is a name plus a [`TypeData`] variant. The variant set is closed:
//! it is fixed by the kernel ABI and only grows on format version bumps.

use crate::{StrOffset, TypeId};

/// BTF kind tags, with their wire discriminants.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Kind {
    Void = 0,
    Int = 1,
    Pointer = 2,
    Array = 3,
    Struct = 4,
    Union = 5,
    Enum = 6,
    Fwd = 7,
    Typedef = 8,
    Volatile = 9,
    Const = 10,
    Restrict = 11,
    Func = 12,
    FuncProto = 13,
    Var = 14,
    DataSec = 15,
    Float = 16,
    DeclTag = 17,
    TypeTag = 18,
    Enum64 = 19,
}

impl Kind {
    /// Convert from raw discriminant.
    pub fn from_u8(v: u8) -> Option<Self> {
        let kind = match v {
            0 => Self::Void,
            1 => Self::Int,
            2 => Self::Pointer,
            3 => Self::Array,
            4 => Self::Struct,
            5 => Self::Union,
            6 => Self::Enum,
            7 => Self::Fwd,
            8 => Self::Typedef,
            9 => Self::Volatile,
            10 => Self::Const,
            11 => Self::Restrict,
            12 => Self::Func,
            13 => Self::FuncProto,
            14 => Self::Var,
            15 => Self::DataSec,
            16 => Self::Float,
            17 => Self::DeclTag,
            18 => Self::TypeTag,
            19 => Self::Enum64,
            _ => return None,
        };
        Some(kind)
    }

    /// Upper-case name as printed by `bpftool btf dump`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Void => "VOID",
            Self::Int => "INT",
            Self::Pointer => "PTR",
            Self::Array => "ARRAY",
            Self::Struct => "STRUCT",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::Fwd => "FWD",
            Self::Typedef => "TYPEDEF",
            Self::Volatile => "VOLATILE",
            Self::Const => "CONST",
            Self::Restrict => "RESTRICT",
            Self::Func => "FUNC",
            Self::FuncProto => "FUNC_PROTO",
            Self::Var => "VAR",
            Self::DataSec => "DATASEC",
            Self::Float => "FLOAT",
            Self::DeclTag => "DECL_TAG",
            Self::TypeTag => "TYPE_TAG",
            Self::Enum64 => "ENUM64",
        }
    }

    /// Kinds without edges. They can never sit on a cycle.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            Self::Void | Self::Int | Self::Enum | Self::Enum64 | Self::Fwd | Self::Float
        )
    }

    /// Kinds that wrap a single type without changing its layout.
    pub fn is_qualifier(self) -> bool {
        matches!(
            self,
            Self::Typedef | Self::Volatile | Self::Const | Self::Restrict | Self::TypeTag
        )
    }
}

/// Integer encoding bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(transparent)]
pub struct IntEncoding(pub u8);

impl IntEncoding {
    pub const SIGNED: u8 = 1 << 0;
    pub const CHAR: u8 = 1 << 1;
    pub const BOOL: u8 = 1 << 2;

    pub fn is_signed(self) -> bool {
        self.0 & Self::SIGNED != 0
    }

    pub fn is_char(self) -> bool {
        self.0 & Self::CHAR != 0
    }

    pub fn is_bool(self) -> bool {
        self.0 & Self::BOOL != 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Int {
    /// Size in bytes.
    pub size: u32,
    pub encoding: IntEncoding,
    /// Bit offset of the value inside `size` bytes.
    pub bit_offset: u8,
    /// Number of value bits.
    pub bits: u8,
}

impl Int {
    /// Plain integer occupying all of its bytes.
    ///
    /// # Panics
    /// Panics if `size` is over 31 bytes, whose bit count does not fit in
    /// the 8-bit field.
    pub fn new(size: u32, signed: bool) -> Self {
        let Some(bits) = size.checked_mul(8).and_then(|b| u8::try_from(b).ok()) else {
            panic!("Int: {size}-byte integer has more bits than the 8-bit field holds");
        };
        Self {
            size,
            encoding: IntEncoding(if signed { IntEncoding::SIGNED } else { 0 }),
            bit_offset: 0,
            bits,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Array {
    pub element: TypeId,
    pub index: TypeId,
    pub len: u32,
}

/// Struct or union member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Member {
    pub name: StrOffset,
    pub ty: TypeId,
    /// Offset from the start of the composite, in bits.
    pub bit_offset: u32,
    /// Bitfield width; 0 when the member is not a bitfield.
    pub bitfield_size: u8,
}

/// Struct or union body.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Composite {
    /// Size in bytes.
    pub size: u32,
    /// Member offsets carry the bitfield size in their top byte (the kernel's `kind_flag`).
    pub bitfield_encoding: bool,
    pub members: Vec<Member>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EnumValue {
    pub name: StrOffset,
    /// Raw value bits. 32-bit enums only use the low half.
    pub value: u64,
}

/// Body of both `ENUM` (32-bit values) and `ENUM64`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Enum {
    pub size: u32,
    pub signed: bool,
    pub values: Vec<EnumValue>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FwdKind {
    Struct,
    Union,
}

impl FwdKind {
    /// The definition kind a forward declaration of this flavour stands for.
    pub fn kind(self) -> Kind {
        match self {
            Self::Struct => Kind::Struct,
            Self::Union => Kind::Union,
        }
    }
}

/// Linkage of functions and variables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u32)]
pub enum Linkage {
    Static = 0,
    Global = 1,
    Extern = 2,
}

impl Linkage {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Static),
            1 => Some(Self::Global),
            2 => Some(Self::Extern),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Global => "global",
            Self::Extern => "extern",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Func {
    pub linkage: Linkage,
    pub proto: TypeId,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Param {
    pub name: StrOffset,
    pub ty: TypeId,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FuncProto {
    pub ret: TypeId,
    pub params: Vec<Param>,
    pub variadic: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Var {
    pub linkage: Linkage,
    pub ty: TypeId,
}

/// One variable placed in a data section.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct VarSecinfo {
    pub var: TypeId,
    pub offset: u32,
    pub size: u32,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct DataSec {
    pub size: u32,
    pub vars: Vec<VarSecinfo>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DeclTag {
    pub target: TypeId,
    /// Member or parameter index the tag applies to, -1 for the whole type.
    pub component: i32,
    /// The tag is a plain attribute rather than a `btf_decl_tag` string.
    pub attribute: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeTag {
    pub target: TypeId,
    /// The tag is a plain attribute rather than a `btf_type_tag` string.
    pub attribute: bool,
}

/// Kind-specific payload of a type node.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeData {
    Void,
    Int(Int),
    Pointer(TypeId),
    Array(Array),
    Struct(Composite),
    Union(Composite),
    Enum(Enum),
    Fwd(FwdKind),
    Typedef(TypeId),
    Volatile(TypeId),
    Const(TypeId),
    Restrict(TypeId),
    Func(Func),
    FuncProto(FuncProto),
    Var(Var),
    DataSec(DataSec),
    Float(u32),
    DeclTag(DeclTag),
    TypeTag(TypeTag),
    Enum64(Enum),
}

/// A type node: name plus payload.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Type {
    pub name: StrOffset,
    pub data: TypeData,
}

impl Type {
    pub fn new(name: StrOffset, data: TypeData) -> Self {
        Self { name, data }
    }

    pub fn void() -> Self {
        Self::new(StrOffset::EMPTY, TypeData::Void)
    }

    pub fn anon(data: TypeData) -> Self {
        Self::new(StrOffset::EMPTY, data)
    }

    pub fn kind(&self) -> Kind {
        match &self.data {
            TypeData::Void => Kind::Void,
            TypeData::Int(_) => Kind::Int,
            TypeData::Pointer(_) => Kind::Pointer,
            TypeData::Array(_) => Kind::Array,
            TypeData::Struct(_) => Kind::Struct,
            TypeData::Union(_) => Kind::Union,
            TypeData::Enum(_) => Kind::Enum,
            TypeData::Fwd(_) => Kind::Fwd,
            TypeData::Typedef(_) => Kind::Typedef,
            TypeData::Volatile(_) => Kind::Volatile,
            TypeData::Const(_) => Kind::Const,
            TypeData::Restrict(_) => Kind::Restrict,
            TypeData::Func(_) => Kind::Func,
            TypeData::FuncProto(_) => Kind::FuncProto,
            TypeData::Var(_) => Kind::Var,
            TypeData::DataSec(_) => Kind::DataSec,
            TypeData::Float(_) => Kind::Float,
            TypeData::DeclTag(_) => Kind::DeclTag,
            TypeData::TypeTag(_) => Kind::TypeTag,
            TypeData::Enum64(_) => Kind::Enum64,
        }
    }

    /// Outgoing edges, in a fixed kind-specific order.
    pub fn edges(&self) -> Vec<TypeId> {
        match &self.data {
            TypeData::Void
            | TypeData::Int(_)
            | TypeData::Enum(_)
            | TypeData::Enum64(_)
            | TypeData::Fwd(_)
            | TypeData::Float(_) => Vec::new(),
            TypeData::Pointer(t)
            | TypeData::Typedef(t)
            | TypeData::Volatile(t)
            | TypeData::Const(t)
            | TypeData::Restrict(t) => vec![*t],
            TypeData::TypeTag(t) => vec![t.target],
            TypeData::Array(a) => vec![a.element, a.index],
            TypeData::Struct(c) | TypeData::Union(c) => c.members.iter().map(|m| m.ty).collect(),
            TypeData::Func(f) => vec![f.proto],
            TypeData::FuncProto(p) => std::iter::once(p.ret)
                .chain(p.params.iter().map(|p| p.ty))
                .collect(),
            TypeData::Var(v) => vec![v.ty],
            TypeData::DataSec(d) => d.vars.iter().map(|v| v.var).collect(),
            TypeData::DeclTag(t) => vec![t.target],
        }
    }

    /// Mutable access to the edges, in the same order as [`edges`](Self::edges).
    pub fn edges_mut(&mut self) -> Vec<&mut TypeId> {
        match &mut self.data {
            TypeData::Void
            | TypeData::Int(_)
            | TypeData::Enum(_)
            | TypeData::Enum64(_)
            | TypeData::Fwd(_)
            | TypeData::Float(_) => Vec::new(),
            TypeData::Pointer(t)
            | TypeData::Typedef(t)
            | TypeData::Volatile(t)
            | TypeData::Const(t)
            | TypeData::Restrict(t) => vec![t],
            TypeData::TypeTag(t) => vec![&mut t.target],
            TypeData::Array(a) => vec![&mut a.element, &mut a.index],
            TypeData::Struct(c) | TypeData::Union(c) => {
                c.members.iter_mut().map(|m| &mut m.ty).collect()
            }
            TypeData::Func(f) => vec![&mut f.proto],
            TypeData::FuncProto(p) => std::iter::once(&mut p.ret)
                .chain(p.params.iter_mut().map(|p| &mut p.ty))
                .collect(),
            TypeData::Var(v) => vec![&mut v.ty],
            TypeData::DataSec(d) => d.vars.iter_mut().map(|v| &mut v.var).collect(),
            TypeData::DeclTag(t) => vec![&mut t.target],
        }
    }

    /// Every string offset the node holds: its own name first, then member,
    /// parameter or enumerator names in declaration order.
    pub fn names(&self) -> Vec<StrOffset> {
        let mut names = vec![self.name];
        match &self.data {
            TypeData::Struct(c) | TypeData::Union(c) => {
                names.extend(c.members.iter().map(|m| m.name));
            }
            TypeData::Enum(e) | TypeData::Enum64(e) => {
                names.extend(e.values.iter().map(|v| v.name));
            }
            TypeData::FuncProto(p) => names.extend(p.params.iter().map(|p| p.name)),
            _ => {}
        }
        names
    }

    /// Mutable access to the string offsets, in the same order as [`names`](Self::names).
    pub fn names_mut(&mut self) -> Vec<&mut StrOffset> {
        let mut names = vec![&mut self.name];
        match &mut self.data {
            TypeData::Struct(c) | TypeData::Union(c) => {
                names.extend(c.members.iter_mut().map(|m| &mut m.name));
            }
            TypeData::Enum(e) | TypeData::Enum64(e) => {
                names.extend(e.values.iter_mut().map(|v| &mut v.name));
            }
            TypeData::FuncProto(p) => names.extend(p.params.iter_mut().map(|p| &mut p.name)),
            _ => {}
        }
        names
    }

    /// Number of trailing records (the `vlen` of the wire format).
    pub fn vlen(&self) -> usize {
        match &self.data {
            TypeData::Struct(c) | TypeData::Union(c) => c.members.len(),
            TypeData::Enum(e) | TypeData::Enum64(e) => e.values.len(),
            TypeData::FuncProto(p) => p.params.len() + usize::from(p.variadic),
            TypeData::DataSec(d) => d.vars.len(),
            _ => 0,
        }
    }

    /// Copy of the node with every edge pointing at void.
    ///
    /// Two nodes with equal shapes differ at most in where their edges lead.
    pub fn shape(&self) -> Type {
        let mut shape = self.clone();
        for edge in shape.edges_mut() {
            *edge = TypeId::VOID;
        }
        shape
    }
}

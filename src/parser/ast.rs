// AST definitions for the declaration parser

use crate::types::registry::TypeId;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Built-in (primitive) types
///
/// Multi-word specifier sequences (`unsigned long long`, `signed char`, ...)
/// collapse to one variant with a canonical name and bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Void,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
}

impl Primitive {
    /// Canonical C spelling
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Char => "char",
            Primitive::SignedChar => "signed char",
            Primitive::UnsignedChar => "unsigned char",
            Primitive::Short => "short",
            Primitive::UnsignedShort => "unsigned short",
            Primitive::Int => "int",
            Primitive::UnsignedInt => "unsigned int",
            Primitive::Long => "long",
            Primitive::UnsignedLong => "unsigned long",
            Primitive::LongLong => "long long",
            Primitive::UnsignedLongLong => "unsigned long long",
        }
    }

    /// Storage width in bits (0 for `void`)
    pub fn bit_width(&self) -> u32 {
        match self {
            Primitive::Void => 0,
            Primitive::Char | Primitive::SignedChar | Primitive::UnsignedChar => 8,
            Primitive::Short | Primitive::UnsignedShort => 16,
            Primitive::Int | Primitive::UnsignedInt => 32,
            Primitive::Long
            | Primitive::UnsignedLong
            | Primitive::LongLong
            | Primitive::UnsignedLongLong => 64,
        }
    }

    /// Whether a bitfield may use this as its base type
    pub fn is_integer(&self) -> bool {
        !matches!(self, Primitive::Void)
    }
}

/// Resolved type of a declaration or struct field.
///
/// `Pointer`, `Array` and `FunctionPointer` own their nested descriptor
/// exclusively; `Struct` and `Enum` reference a shared registry entry through
/// a stable [`TypeId`], so a pointer field can name an in-progress struct
/// without a cyclic ownership graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Pointer {
        to: Box<TypeDescriptor>,
        depth: usize,
    },
    Array {
        of: Box<TypeDescriptor>,
        len: usize,
    },
    FunctionPointer {
        ret: Box<TypeDescriptor>,
        params: Vec<TypeDescriptor>,
    },
    Struct {
        tag: Option<String>,
        id: TypeId,
    },
    Enum {
        tag: Option<String>,
        id: TypeId,
    },
}

impl TypeDescriptor {
    /// Wrap this type in `depth` levels of pointer, merging with an existing
    /// pointer layer so `**` and `*` applied twice produce the same descriptor.
    pub fn pointer_to(self, depth: usize) -> Self {
        if depth == 0 {
            return self;
        }
        match self {
            TypeDescriptor::Pointer { to, depth: inner } => TypeDescriptor::Pointer {
                to,
                depth: inner + depth,
            },
            other => TypeDescriptor::Pointer {
                to: Box::new(other),
                depth,
            },
        }
    }

    pub fn array_of(self, len: usize) -> Self {
        TypeDescriptor::Array {
            of: Box::new(self),
            len,
        }
    }

    /// Render in C declarator syntax with `name` in declarator position,
    /// e.g. `int (*iii[5])(unsigned long long)`.
    pub fn display_with_name(&self, name: &str) -> String {
        render_declarator(self, name.to_string())
    }
}

/// Inside-out declarator rendering: the accumulated declarator string wraps
/// around the name while we walk from the name's type outward to the base.
fn render_declarator(ty: &TypeDescriptor, inner: String) -> String {
    fn base_with(base: &str, inner: String) -> String {
        if inner.is_empty() {
            base.to_string()
        } else {
            format!("{} {}", base, inner)
        }
    }

    match ty {
        TypeDescriptor::Primitive(p) => base_with(p.name(), inner),
        TypeDescriptor::Struct { tag, .. } => {
            let tag = tag.as_deref().unwrap_or("<anonymous>");
            base_with(&format!("struct {}", tag), inner)
        }
        TypeDescriptor::Enum { tag, .. } => {
            let tag = tag.as_deref().unwrap_or("<anonymous>");
            base_with(&format!("enum {}", tag), inner)
        }
        TypeDescriptor::Pointer { to, depth } => {
            let decorated = format!("{}{}", "*".repeat(*depth), inner);
            // pointer-to-array needs explicit grouping: int (*p)[5]
            if matches!(**to, TypeDescriptor::Array { .. }) {
                render_declarator(to, format!("({})", decorated))
            } else {
                render_declarator(to, decorated)
            }
        }
        TypeDescriptor::Array { of, len } => render_declarator(of, format!("{}[{}]", inner, len)),
        TypeDescriptor::FunctionPointer { ret, params } => {
            let list = if params.is_empty() {
                "void".to_string()
            } else {
                params
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            render_declarator(ret, format!("(*{})({})", inner, list))
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_with_name(""))
    }
}

/// Struct member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Bitfield width; only legal on integer primitives, `0 < w <= base width`
    pub bit_width: Option<u32>,
}

/// Storage qualifiers on a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Qualifiers {
    pub is_static: bool,
    pub is_const: bool,
    pub is_inline: bool,
}

/// A resolved top-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub ty: TypeDescriptor,
    pub qualifiers: Qualifiers,
    /// `__attribute__((...))` names, e.g. "always_inline"
    pub attributes: Vec<String>,
    pub location: SourceLocation,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.qualifiers.is_static {
            write!(f, "static ")?;
        }
        if self.qualifiers.is_inline {
            write!(f, "inline ")?;
        }
        if self.qualifiers.is_const {
            write!(f, "const ")?;
        }
        if !self.attributes.is_empty() {
            write!(f, "__attribute__(({})) ", self.attributes.join(", "))?;
        }
        write!(f, "{}", self.ty.display_with_name(&self.name))
    }
}

/// All declarations of one translation unit, plus the registry that owns the
/// struct/enum shapes they reference.
#[derive(Debug)]
pub struct TranslationUnit {
    pub declarations: Vec<Declaration>,
    pub registry: crate::types::registry::TypeRegistry,
}

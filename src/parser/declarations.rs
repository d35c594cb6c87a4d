//! Declaration parsing implementation
//!
//! This module handles parsing of declarations in the C subset:
//!
//! - Struct definitions with bitfields: `struct Name { int a:10; ... };`
//! - Enum definitions: `enum Name { A, B = 2 };`, anonymous bodies included
//! - Typedefs: `typedef enum Dier DierEnum;`
//! - Variable and prototype declarations with qualifiers and attributes
//! - Declarators: pointers, arrays, function pointers, grouped declarators
//!
//! # Grammar
//!
//! ```text
//! declaration ::= qualifier* base_type declarator? ";"
//! qualifier   ::= "static" | "const" | "inline" | "typedef" | attribute
//! base_type   ::= primitive+ | "struct" tag? body? | "enum" tag? body? | typedef_name
//! declarator  ::= "*"* ( "(" declarator ")" | identifier )? suffix*
//! suffix      ::= "[" length "]" | "(" params ")"
//! ```
//!
//! Declarator binding is right-left per C precedence: suffixes bind tighter
//! than prefix `*`, and a parenthesized group binds tighter than either, which
//! is what separates `int *pointers[5]` (array of pointer) from
//! `int (*iii[5])(unsigned long long)` (array of pointer-to-function).
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};
use crate::types::registry::{TagKind, TypeShape};

/// One layer of declarator shape, in base-outward application order
#[derive(Debug)]
pub(crate) enum DeclOp {
    Pointer(usize),
    Array(usize),
    Function(Vec<TypeDescriptor>),
}

/// A parsed declarator before its ops are applied to a base type
#[derive(Debug)]
pub(crate) struct RawDeclarator {
    pub name: Option<String>,
    pub ops: Vec<DeclOp>,
}

/// Fold declarator ops over the base type, innermost wrapper first.
///
/// A `Function` op produces a [`TypeDescriptor::FunctionPointer`] and absorbs
/// the one pointer level that spelled the `(*name)` group; a bare function
/// declarator (a prototype) decays to the same descriptor.
pub(crate) fn apply_declarator(base: TypeDescriptor, ops: Vec<DeclOp>) -> TypeDescriptor {
    let mut ty = base;
    let mut ops = ops.into_iter().peekable();

    while let Some(op) = ops.next() {
        match op {
            DeclOp::Pointer(depth) => ty = ty.pointer_to(depth),
            DeclOp::Array(len) => ty = ty.array_of(len),
            DeclOp::Function(params) => {
                ty = TypeDescriptor::FunctionPointer {
                    ret: Box::new(ty),
                    params,
                };
                if let Some(DeclOp::Pointer(depth)) = ops.peek() {
                    let depth = *depth;
                    ops.next();
                    ty = ty.pointer_to(depth - 1);
                }
            }
        }
    }

    ty
}

impl Parser {
    /// Parse one declaration after the journal checkpoint is in place.
    pub(crate) fn parse_declaration_inner(&mut self) -> Result<Option<Declaration>, ParseError> {
        let location = self.current_location();
        let mut qualifiers = Qualifiers::default();
        let mut attributes = Vec::new();
        let mut is_typedef = false;

        loop {
            if self.match_token(&Token::Static(self.current_location())) {
                qualifiers.is_static = true;
            } else if self.match_token(&Token::Const(self.current_location())) {
                qualifiers.is_const = true;
            } else if self.match_token(&Token::Inline(self.current_location())) {
                qualifiers.is_inline = true;
            } else if self.match_token(&Token::Typedef(self.current_location())) {
                is_typedef = true;
            } else if self.check(&Token::Attribute(self.current_location())) {
                attributes.extend(self.parse_attribute_list()?);
            } else {
                break;
            }
        }

        let base = self.parse_base_type()?;

        // Tag-only definition: `struct teststruct { ... };`
        if self.check(&Token::Semicolon(self.current_location())) {
            if is_typedef {
                return Err(self.unexpected("Expected declarator after typedef"));
            }
            if !matches!(
                base,
                TypeDescriptor::Struct { .. } | TypeDescriptor::Enum { .. }
            ) {
                return Err(self.unexpected("Expected declarator"));
            }
            self.advance();
            return Ok(None);
        }

        let declarator = self.parse_declarator()?;
        let name = match declarator.name {
            Some(name) => name,
            None => return Err(self.unexpected("Expected identifier in declarator")),
        };
        let ty = apply_declarator(base, declarator.ops);

        if is_typedef {
            self.registry
                .bind_typedef(&name, ty)
                .map_err(|e| self.type_error(e))?;
            self.expect_semicolon("after typedef")?;
            return Ok(None);
        }

        let ty = self.registry.resolve(ty).map_err(|e| self.type_error(e))?;
        self.expect_semicolon("after declaration")?;

        Ok(Some(Declaration {
            name,
            ty,
            qualifiers,
            attributes,
            location,
        }))
    }

    /// Parse `__attribute__((name, ...))`
    pub(crate) fn parse_attribute_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.advance(); // consume '__attribute__'
        let open = self.current_location();
        self.expect_token(
            &Token::LParen(self.current_location()),
            "Expected '((' after '__attribute__'",
        )?;
        self.expect_token(
            &Token::LParen(self.current_location()),
            "Expected '((' after '__attribute__'",
        )?;

        let mut attrs = Vec::new();
        if !self.check(&Token::RParen(self.current_location())) {
            loop {
                attrs.push(self.expect_identifier()?);
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }

        if !self.match_token(&Token::RParen(self.current_location()))
            || !self.match_token(&Token::RParen(self.current_location()))
        {
            return Err(ParseError::MismatchedParens { location: open });
        }

        Ok(attrs)
    }

    /// Parse a base type specifier: primitives, struct/enum, or typedef name
    pub(crate) fn parse_base_type(&mut self) -> Result<TypeDescriptor, ParseError> {
        match self.peek_token() {
            Token::Struct(_) => {
                self.advance();
                self.parse_tag_type(TagKind::Struct)
            }
            Token::Enum(_) => {
                self.advance();
                self.parse_tag_type(TagKind::Enum)
            }
            Token::Void(_)
            | Token::Char(_)
            | Token::Short(_)
            | Token::Int(_)
            | Token::Long(_)
            | Token::Signed(_)
            | Token::Unsigned(_) => self.parse_primitive_specifiers(),
            Token::Ident(name, location) => {
                self.advance();
                self.registry
                    .lookup(&name)
                    .map_err(|_| ParseError::UnknownTypeName { name, location })
            }
            _ => Err(self.unexpected("Expected type specifier")),
        }
    }

    /// Parse a (possibly multi-word) primitive specifier sequence
    pub(crate) fn parse_primitive_specifiers(&mut self) -> Result<TypeDescriptor, ParseError> {
        #[derive(PartialEq)]
        enum Base {
            None,
            Void,
            Char,
            Int,
        }

        let mut base = Base::None;
        let mut signedness: Option<bool> = None; // Some(false) = unsigned
        let mut longs = 0usize;
        let mut short = false;

        loop {
            match self.peek_token() {
                Token::Void(_) | Token::Char(_) | Token::Int(_) => {
                    if base != Base::None {
                        return Err(self.unexpected("Expected a single base type specifier"));
                    }
                    base = match self.peek_token() {
                        Token::Void(_) => Base::Void,
                        Token::Char(_) => Base::Char,
                        _ => Base::Int,
                    };
                }
                Token::Short(_) => {
                    if short || longs > 0 {
                        return Err(self.unexpected("Expected a valid length modifier"));
                    }
                    short = true;
                }
                Token::Long(_) => {
                    if longs == 2 || short {
                        return Err(self.unexpected("Expected a valid length modifier"));
                    }
                    longs += 1;
                }
                Token::Signed(_) | Token::Unsigned(_) => {
                    if signedness.is_some() {
                        return Err(self.unexpected("Expected a single signedness modifier"));
                    }
                    signedness = Some(matches!(self.peek_token(), Token::Signed(_)));
                }
                _ => break,
            }
            self.advance();
        }

        let unsigned = signedness == Some(false);
        let prim = match base {
            Base::Void => {
                if signedness.is_some() || short || longs > 0 {
                    return Err(self.unexpected("Expected no modifiers on 'void'"));
                }
                Primitive::Void
            }
            Base::Char => {
                if short || longs > 0 {
                    return Err(self.unexpected("Expected no length modifier on 'char'"));
                }
                if unsigned {
                    Primitive::UnsignedChar
                } else if signedness == Some(true) {
                    Primitive::SignedChar
                } else {
                    Primitive::Char
                }
            }
            Base::Int | Base::None => {
                if short {
                    if unsigned {
                        Primitive::UnsignedShort
                    } else {
                        Primitive::Short
                    }
                } else if longs == 2 {
                    if unsigned {
                        Primitive::UnsignedLongLong
                    } else {
                        Primitive::LongLong
                    }
                } else if longs == 1 {
                    if unsigned {
                        Primitive::UnsignedLong
                    } else {
                        Primitive::Long
                    }
                } else if unsigned {
                    Primitive::UnsignedInt
                } else {
                    Primitive::Int
                }
            }
        };

        Ok(TypeDescriptor::Primitive(prim))
    }

    /// Parse the rest of a struct/enum type after its keyword: an optional
    /// tag, then either a defining body or a bare reference.
    pub(crate) fn parse_tag_type(&mut self, kind: TagKind) -> Result<TypeDescriptor, ParseError> {
        let tag = if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Some(name)
        } else {
            None
        };

        if self.check(&Token::LBrace(self.current_location())) {
            self.advance();
            let id = match &tag {
                Some(tag) => self
                    .registry
                    .intern_tag(kind, tag)
                    .map_err(|e| self.type_error(e))?,
                None => self.registry.add_anonymous(kind),
            };
            let shape = match kind {
                TagKind::Struct => TypeShape::Struct {
                    fields: self.parse_struct_fields()?,
                },
                TagKind::Enum => TypeShape::Enum {
                    enumerators: self.parse_enumerators()?,
                },
            };
            self.registry
                .define_tag(id, shape)
                .map_err(|e| self.type_error(e))?;
            return Ok(match kind {
                TagKind::Struct => TypeDescriptor::Struct { tag, id },
                TagKind::Enum => TypeDescriptor::Enum { tag, id },
            });
        }

        // Bare reference: the tag may name an incomplete type; only value
        // use of it is rejected, at resolve time.
        let tag = match tag {
            Some(tag) => tag,
            None => return Err(self.unexpected("Expected tag or '{'")),
        };
        let id = self
            .registry
            .intern_tag(kind, &tag)
            .map_err(|e| self.type_error(e))?;
        Ok(match kind {
            TagKind::Struct => TypeDescriptor::Struct { tag: Some(tag), id },
            TagKind::Enum => TypeDescriptor::Enum { tag: Some(tag), id },
        })
    }

    /// Parse struct fields up to and including the closing brace
    pub(crate) fn parse_struct_fields(&mut self) -> Result<Vec<Field>, ParseError> {
        let mut fields = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) {
            // field-level const affects neither shape nor layout here
            self.match_token(&Token::Const(self.current_location()));

            let base = self.parse_base_type()?;
            let declarator = self.parse_declarator()?;
            let name = match declarator.name {
                Some(name) => name,
                None => return Err(self.unexpected("Expected field name")),
            };
            let ty = apply_declarator(base, declarator.ops);

            let mut bit_width = None;
            if self.match_token(&Token::Colon(self.current_location())) {
                let location = self.current_location();
                let width = self.expect_int_literal()?;
                let (base_name, base_width) = match &ty {
                    TypeDescriptor::Primitive(p) if p.is_integer() => (p.name(), p.bit_width()),
                    other => {
                        return Err(ParseError::InvalidBitfieldWidth {
                            width,
                            base: other.to_string(),
                            base_width: 0,
                            location,
                        });
                    }
                };
                if width <= 0 || width > base_width as i64 {
                    return Err(ParseError::InvalidBitfieldWidth {
                        width,
                        base: base_name.to_string(),
                        base_width,
                        location,
                    });
                }
                bit_width = Some(width as u32);
            }

            // value members of incomplete types are rejected here; pointer
            // members to the struct being defined are fine
            let ty = self.registry.resolve(ty).map_err(|e| self.type_error(e))?;

            self.expect_semicolon("after struct field")?;
            fields.push(Field {
                name,
                ty,
                bit_width,
            });
        }

        self.expect_rbrace("after struct fields")?;
        Ok(fields)
    }

    /// Parse enumerators up to and including the closing brace.
    ///
    /// Values default to previous + 1 starting at 0; an explicit `= N`
    /// overrides and later members continue from it.
    pub(crate) fn parse_enumerators(&mut self) -> Result<Vec<(String, i64)>, ParseError> {
        let mut enumerators = Vec::new();
        let mut next_value = 0i64;

        while !self.check(&Token::RBrace(self.current_location())) {
            let name = self.expect_identifier()?;
            if self.match_token(&Token::Eq(self.current_location())) {
                let negative = self.match_token(&Token::Minus(self.current_location()));
                let value = self.expect_int_literal()?;
                next_value = if negative { -value } else { value };
            }
            enumerators.push((name, next_value));
            next_value += 1;

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_rbrace("after enumerators")?;
        Ok(enumerators)
    }

    /// Parse a (possibly abstract) declarator
    pub(crate) fn parse_declarator(&mut self) -> Result<RawDeclarator, ParseError> {
        let mut pointer_depth = 0;
        while self.match_token(&Token::Star(self.current_location())) {
            pointer_depth += 1;
        }

        let mut name = None;
        let mut inner: Option<RawDeclarator> = None;

        if self.check(&Token::LParen(self.current_location())) && self.lparen_starts_group() {
            let open = self.current_location();
            self.advance();
            let group = self.parse_declarator()?;
            if !self.match_token(&Token::RParen(self.current_location())) {
                return Err(ParseError::MismatchedParens { location: open });
            }
            inner = Some(group);
        } else if let Token::Ident(ident, _) = self.peek_token() {
            self.advance();
            name = Some(ident);
        }

        let mut suffixes = Vec::new();
        loop {
            if self.match_token(&Token::LBracket(self.current_location())) {
                let len = self.expect_int_literal()?;
                if len < 0 {
                    return Err(self.unexpected("Expected non-negative array length"));
                }
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' after array length",
                )?;
                suffixes.push(DeclOp::Array(len as usize));
            } else if self.check(&Token::LParen(self.current_location())) {
                let open = self.current_location();
                self.advance();
                let params = self.parse_parameter_types(open)?;
                suffixes.push(DeclOp::Function(params));
            } else {
                break;
            }
        }
        // trailing suffixes bind right-to-left: int a[2][3] is array[2] of array[3]
        suffixes.reverse();

        let mut ops = Vec::new();
        if pointer_depth > 0 {
            ops.push(DeclOp::Pointer(pointer_depth));
        }
        ops.append(&mut suffixes);
        if let Some(group) = inner {
            if name.is_none() {
                name = group.name;
            }
            ops.extend(group.ops);
        }

        Ok(RawDeclarator { name, ops })
    }

    /// Whether a '(' at declarator position opens a grouped declarator rather
    /// than a parameter list. A group starts with '*', a nested group, or an
    /// identifier that cannot begin a parameter's type.
    fn lparen_starts_group(&self) -> bool {
        match self.peek_ahead(1) {
            Some(Token::Star(_)) | Some(Token::LParen(_)) => true,
            Some(Token::Ident(name, _)) => !self.registry.contains_typedef(name),
            _ => false,
        }
    }

    /// Parse a parameter type list up to and including the closing paren.
    ///
    /// Parameter names are permitted and discarded; `(void)` is the empty
    /// list.
    pub(crate) fn parse_parameter_types(
        &mut self,
        open: SourceLocation,
    ) -> Result<Vec<TypeDescriptor>, ParseError> {
        let mut params = Vec::new();

        if self.match_token(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        if self.check(&Token::Void(self.current_location()))
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance();
            self.advance();
            return Ok(params);
        }

        loop {
            self.match_token(&Token::Const(self.current_location()));
            let base = self.parse_base_type()?;
            let declarator = self.parse_declarator()?;
            params.push(apply_declarator(base, declarator.ops));

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        if !self.match_token(&Token::RParen(self.current_location())) {
            return Err(ParseError::MismatchedParens { location: open });
        }

        Ok(params)
    }
}

//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the [`ParseError`] type, helper methods, and the translation-unit
//! entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: base types, declarators, struct/enum bodies, typedefs
//!
//! Parser methods are split across files using `impl Parser` blocks, allowing
//! each module to extend the Parser with related functionality while keeping
//! access to the shared parser state.
//!
//! # Atomicity
//!
//! The parser owns the [`TypeRegistry`] for the unit being parsed. Registry
//! mutations are journaled per declaration: a declaration that fails to parse
//! rolls back every tag, typedef, and shape it registered, so no partial
//! types survive the error.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use crate::types::errors::TypeError;
use crate::types::registry::TypeRegistry;
use std::fmt;

/// Parser error type
///
/// Every variant carries the location the parser was looking at when the
/// declaration failed. All errors are terminal for the declaration being
/// parsed; the translation-unit parse stops at the first one.
#[derive(Debug)]
pub enum ParseError {
    /// The token stream did not match the declaration grammar
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    /// An identifier in type position names no registered typedef
    UnknownTypeName {
        name: String,
        location: SourceLocation,
    },

    /// Bitfield width out of range for its base type, or bitfield on a
    /// non-integer base (`base_width` 0)
    InvalidBitfieldWidth {
        width: i64,
        base: String,
        base_width: u32,
        location: SourceLocation,
    },

    /// A grouped declarator or parameter list was never closed
    MismatchedParens { location: SourceLocation },

    /// The lexer could not produce a token stream
    InvalidToken {
        message: String,
        location: SourceLocation,
    },

    /// A registry operation failed (conflicting or incomplete types)
    Type {
        err: TypeError,
        location: SourceLocation,
    },
}

impl ParseError {
    /// Location the error was reported at
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::UnexpectedToken { location, .. }
            | ParseError::UnknownTypeName { location, .. }
            | ParseError::InvalidBitfieldWidth { location, .. }
            | ParseError::MismatchedParens { location }
            | ParseError::InvalidToken { location, .. }
            | ParseError::Type { location, .. } => *location,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = self.location();
        write!(f, "Parse error at line {}, column {}: ", loc.line, loc.column)?;
        match self {
            ParseError::UnexpectedToken {
                expected, found, ..
            } => {
                write!(f, "{}, found {}", expected, found)
            }
            ParseError::UnknownTypeName { name, .. } => {
                write!(f, "unknown type name '{}'", name)
            }
            ParseError::InvalidBitfieldWidth {
                width,
                base,
                base_width,
                ..
            } => {
                if *base_width == 0 {
                    write!(f, "bit-field on non-integer type '{}'", base)
                } else {
                    write!(
                        f,
                        "bit-field width {} invalid for '{}' ({} bits)",
                        width, base, base_width
                    )
                }
            }
            ParseError::MismatchedParens { .. } => {
                write!(f, "mismatched parentheses in declarator")
            }
            ParseError::InvalidToken { message, .. } => write!(f, "{}", message),
            ParseError::Type { err, .. } => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::InvalidToken {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for C declarations
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) registry: TypeRegistry,
}

impl Parser {
    /// Lex `source` and build a parser over the resulting token stream.
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Build a parser over an externally produced token stream.
    ///
    /// A trailing [`Token::Eof`] is appended if the stream lacks one.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        let needs_eof = !matches!(tokens.last(), Some(Token::Eof(_)));
        if needs_eof {
            let loc = tokens
                .last()
                .map(|t| t.location())
                .unwrap_or_else(|| SourceLocation::new(1, 1));
            tokens.push(Token::Eof(loc));
        }
        Self {
            tokens,
            position: 0,
            registry: TypeRegistry::new(),
        }
    }

    /// Registry for the unit currently being parsed
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Parse declarations up to end of file.
    ///
    /// The registry is moved into the returned unit, resetting this parser
    /// for the next translation unit.
    pub fn parse_unit(&mut self) -> Result<TranslationUnit, ParseError> {
        let mut declarations = Vec::new();

        while !self.is_at_end() {
            if let Some(decl) = self.parse_declaration()? {
                declarations.push(decl);
            }
        }

        Ok(TranslationUnit {
            declarations,
            registry: std::mem::take(&mut self.registry),
        })
    }

    /// Parse one declaration.
    ///
    /// Returns `Ok(None)` for declarations whose whole effect lives in the
    /// registry (tag-only struct/enum definitions and typedefs). On error,
    /// registry mutations made by the failing declaration are rolled back.
    pub fn parse_declaration(&mut self) -> Result<Option<Declaration>, ParseError> {
        let mark = self.registry.checkpoint();
        match self.parse_declaration_inner() {
            Ok(decl) => {
                self.registry.commit();
                Ok(decl)
            }
            Err(err) => {
                self.registry.rollback(mark);
                Err(err)
            }
        }
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if std::mem::discriminant(&self.peek_token()) == std::mem::discriminant(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.peek_token()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_token(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position - 1]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.peek().to_string(),
            location: self.current_location(),
        }
    }

    pub(crate) fn type_error(&self, err: TypeError) -> ParseError {
        ParseError::Type {
            err,
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(message))
        }
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("Expected identifier"))
        }
    }

    pub(crate) fn expect_int_literal(&mut self) -> Result<i64, ParseError> {
        if let Token::IntLiteral(value, _) = self.peek_token() {
            self.advance();
            Ok(value)
        } else {
            Err(self.unexpected("Expected integer literal"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_variable() {
        let mut parser = Parser::new("int x;").unwrap();
        let unit = parser.parse_unit().unwrap();

        assert_eq!(unit.declarations.len(), 1);
        let decl = &unit.declarations[0];
        assert_eq!(decl.name, "x");
        assert_eq!(decl.ty, TypeDescriptor::Primitive(Primitive::Int));
    }

    #[test]
    fn test_parse_struct_definition() {
        let mut parser = Parser::new("struct Point { int x; int y; };").unwrap();
        let unit = parser.parse_unit().unwrap();

        // Tag-only definition: no value-level declaration
        assert!(unit.declarations.is_empty());
        let id = unit.registry.tag_id("Point").unwrap();
        match unit.registry.shape(id) {
            crate::types::registry::TypeShape::Struct { fields } => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].name, "x");
                assert_eq!(fields[1].name, "y");
            }
            other => panic!("Expected struct shape, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_from_external_tokens() {
        let loc = SourceLocation::new(1, 1);
        let tokens = vec![
            Token::Int(loc),
            Token::Star(loc),
            Token::Ident("p".to_string(), loc),
            Token::Semicolon(loc),
        ];
        let mut parser = Parser::from_tokens(tokens);
        let unit = parser.parse_unit().unwrap();

        assert_eq!(
            unit.declarations[0].ty,
            TypeDescriptor::Primitive(Primitive::Int).pointer_to(1)
        );
    }

    #[test]
    fn test_error_reports_location() {
        let mut parser = Parser::new("int x\nint y;").unwrap();
        let err = parser.parse_unit().unwrap_err();

        // the missing ';' is discovered at the start of line 2
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_registry_reset_between_units() {
        let mut parser = Parser::new("struct S { int a; };").unwrap();
        let unit = parser.parse_unit().unwrap();

        assert!(unit.registry.tag_id("S").is_some());
        assert!(parser.registry().tag_id("S").is_none());
    }
}

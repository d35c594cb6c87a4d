//! # Introduction
//!
//! cdecl-core parses the declaration subset of C — structs with bitfields,
//! named and anonymous enums, typedefs, pointer/array/function-pointer
//! declarators, storage qualifiers and GNU attributes — into resolved,
//! immutable type descriptors backed by a canonical type registry.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → Declarations + TypeRegistry
//! ```
//!
//! 1. [`parser::lexer`] — tokenises the source (an externally produced token
//!    stream is accepted as well).
//! 2. [`parser`] — recursive descent over the declaration grammar, applying
//!    C's right-left declarator binding.
//! 3. [`types::registry`] — canonical struct/enum shapes referenced by stable
//!    index, typedef bindings, conflict detection, and per-declaration
//!    rollback so a failed declaration registers nothing.
//! 4. [`types::layout`] — pluggable bitfield packing policies for storage
//!    width queries.
//!
//! ## Example
//!
//! ```
//! use cdecl_core::parser::parse::Parser;
//!
//! let mut parser = Parser::new("int (*hooks[4])(unsigned long long);").unwrap();
//! let unit = parser.parse_unit().unwrap();
//! assert_eq!(unit.declarations[0].name, "hooks");
//! ```

pub mod parser;
pub mod types;

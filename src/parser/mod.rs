//! C declaration parser
//!
//! This module transforms C declaration source into resolved declarations:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser struct, helpers, and the translation-unit entry point
//! - [`declarations`]: base types, declarators, struct/enum bodies, typedefs
//! - [`ast`]: type descriptors and declaration definitions
//!
//! # Supported C Subset
//!
//! Declarations only: struct definitions (with bitfields), enum definitions
//! (named and anonymous), typedefs, variable declarations, and function
//! prototypes, with pointer/array/function-pointer declarators, the
//! `static`/`const`/`inline` qualifiers, and `__attribute__((...))` lists.
//! No statements, expressions, or preprocessor (directives are skipped).
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser. Declarators are parsed into a
//! per-level op list and folded over the base type, which expresses C's
//! right-left binding without a dynamic-dispatch node hierarchy.

pub mod ast;
pub mod declarations;
pub mod lexer;
pub mod parse;

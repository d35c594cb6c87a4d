//! Type resolution error types
//!
//! This module defines [`TypeError`], which represents all errors the type
//! registry can report (as opposed to declarator syntax errors).
//!
//! All type errors are fatal for the declaration being resolved; the parser
//! rolls back any registry mutations the failing declaration made.

use std::fmt;

/// Errors reported by the type registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A name used in type position matches no registered typedef
    UnknownTypeName { name: String },

    /// A tag or typedef was redefined with a differing shape
    ConflictingDefinition { tag: String },

    /// A value (non-pointer) use of a type whose shape is not yet known
    IncompleteType { tag: String },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnknownTypeName { name } => {
                write!(f, "unknown type name '{}'", name)
            }
            TypeError::ConflictingDefinition { tag } => {
                write!(f, "conflicting definition of '{}'", tag)
            }
            TypeError::IncompleteType { tag } => {
                write!(f, "invalid use of incomplete type '{}'", tag)
            }
        }
    }
}

impl std::error::Error for TypeError {}

//! Type registry and layout
//!
//! - [`registry`]: canonical struct/enum shapes, typedef bindings, and the
//!   per-declaration mutation journal
//! - [`layout`]: pluggable bitfield packing policies and width queries
//! - [`errors`]: the [`errors::TypeError`] taxonomy

pub mod errors;
pub mod layout;
pub mod registry;

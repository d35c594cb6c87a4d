//! Canonical type registry
//!
//! Struct and enum shapes live in an arena indexed by [`TypeId`]; descriptors
//! reference them by index rather than embedding them by value, so a field of
//! an in-progress struct can point back at it (`struct node *next`) without a
//! cyclic ownership graph.
//!
//! The first definition of a tag is canonical: later references share it, an
//! identical redefinition is a no-op, and a differing one is rejected. All
//! mutations are journaled so a failing declaration can be rolled back
//! without leaving partial types behind.

use crate::parser::ast::{Field, TypeDescriptor};
use crate::types::errors::TypeError;
use rustc_hash::FxHashMap;

/// Stable index of a struct/enum entry in the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(usize);

/// Which keyword introduced a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Struct,
    Enum,
}

/// Definition state of a registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// Referenced but not yet defined
    Incomplete,
    Struct { fields: Vec<Field> },
    Enum { enumerators: Vec<(String, i64)> },
}

#[derive(Debug)]
struct TagEntry {
    tag: Option<String>,
    kind: TagKind,
    shape: TypeShape,
}

/// Undo record for one registry mutation
#[derive(Debug)]
enum JournalEntry {
    EntryAdded,
    TagBound(String),
    TypedefBound(String),
    ShapeDefined(TypeId, TypeShape),
}

/// Journal position captured at the start of a declaration
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint(usize);

/// Registry of canonical struct/enum shapes and typedef bindings for one
/// translation unit
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: Vec<TagEntry>,
    tags: FxHashMap<String, TypeId>,
    typedefs: FxHashMap<String, TypeDescriptor>,
    journal: Vec<JournalEntry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the entry for a tag. First use creates an incomplete
    /// entry; a later use with the other keyword is a conflict.
    pub fn intern_tag(&mut self, kind: TagKind, tag: &str) -> Result<TypeId, TypeError> {
        if let Some(&id) = self.tags.get(tag) {
            if self.entries[id.0].kind != kind {
                return Err(TypeError::ConflictingDefinition {
                    tag: tag.to_string(),
                });
            }
            return Ok(id);
        }

        let id = self.push_entry(TagEntry {
            tag: Some(tag.to_string()),
            kind,
            shape: TypeShape::Incomplete,
        });
        self.tags.insert(tag.to_string(), id);
        self.journal.push(JournalEntry::TagBound(tag.to_string()));
        Ok(id)
    }

    /// Create an entry for an anonymous struct/enum body
    pub fn add_anonymous(&mut self, kind: TagKind) -> TypeId {
        self.push_entry(TagEntry {
            tag: None,
            kind,
            shape: TypeShape::Incomplete,
        })
    }

    fn push_entry(&mut self, entry: TagEntry) -> TypeId {
        self.entries.push(entry);
        self.journal.push(JournalEntry::EntryAdded);
        TypeId(self.entries.len() - 1)
    }

    /// Supply the shape for an entry. The first definition is canonical;
    /// redefinition with an identical shape is a no-op, a differing one
    /// fails.
    pub fn define_tag(&mut self, id: TypeId, shape: TypeShape) -> Result<(), TypeError> {
        if self.entries[id.0].shape == TypeShape::Incomplete {
            self.journal
                .push(JournalEntry::ShapeDefined(id, TypeShape::Incomplete));
            self.entries[id.0].shape = shape;
            return Ok(());
        }
        if self.entries[id.0].shape == shape {
            return Ok(());
        }
        Err(TypeError::ConflictingDefinition {
            tag: self.display_tag(id),
        })
    }

    /// Bind a typedef name to a descriptor, with the same idempotent/conflict
    /// rule as tags.
    pub fn bind_typedef(&mut self, name: &str, ty: TypeDescriptor) -> Result<(), TypeError> {
        match self.typedefs.get(name) {
            Some(existing) if *existing == ty => Ok(()),
            Some(_) => Err(TypeError::ConflictingDefinition {
                tag: name.to_string(),
            }),
            None => {
                self.typedefs.insert(name.to_string(), ty);
                self.journal
                    .push(JournalEntry::TypedefBound(name.to_string()));
                Ok(())
            }
        }
    }

    /// Look up a typedef name
    pub fn lookup(&self, name: &str) -> Result<TypeDescriptor, TypeError> {
        self.typedefs
            .get(name)
            .cloned()
            .ok_or_else(|| TypeError::UnknownTypeName {
                name: name.to_string(),
            })
    }

    pub fn contains_typedef(&self, name: &str) -> bool {
        self.typedefs.contains_key(name)
    }

    /// Id of a defined or referenced tag
    pub fn tag_id(&self, tag: &str) -> Option<TypeId> {
        self.tags.get(tag).copied()
    }

    pub fn tag_name(&self, id: TypeId) -> Option<&str> {
        self.entries[id.0].tag.as_deref()
    }

    pub fn kind(&self, id: TypeId) -> TagKind {
        self.entries[id.0].kind
    }

    pub fn shape(&self, id: TypeId) -> &TypeShape {
        &self.entries[id.0].shape
    }

    /// Validate a descriptor for value use. Pointer and function-pointer
    /// layers hide incomplete types; value and array-of-value use of an
    /// incomplete struct/enum (or `void`) is rejected.
    pub fn resolve(&self, ty: TypeDescriptor) -> Result<TypeDescriptor, TypeError> {
        self.check_value_use(&ty)?;
        Ok(ty)
    }

    fn check_value_use(&self, ty: &TypeDescriptor) -> Result<(), TypeError> {
        match ty {
            TypeDescriptor::Primitive(p) if !p.is_integer() => Err(TypeError::IncompleteType {
                tag: p.name().to_string(),
            }),
            TypeDescriptor::Primitive(_)
            | TypeDescriptor::Pointer { .. }
            | TypeDescriptor::FunctionPointer { .. } => Ok(()),
            TypeDescriptor::Array { of, .. } => self.check_value_use(of),
            TypeDescriptor::Struct { id, .. } | TypeDescriptor::Enum { id, .. } => {
                if *self.shape(*id) == TypeShape::Incomplete {
                    Err(TypeError::IncompleteType {
                        tag: self.display_tag(*id),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    fn display_tag(&self, id: TypeId) -> String {
        self.entries[id.0]
            .tag
            .clone()
            .unwrap_or_else(|| "<anonymous>".to_string())
    }

    // ===== Declaration-level transaction support =====

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.journal.len())
    }

    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    /// Undo every mutation made since `mark`, in reverse order.
    pub(crate) fn rollback(&mut self, mark: Checkpoint) {
        while self.journal.len() > mark.0 {
            if let Some(entry) = self.journal.pop() {
                match entry {
                    JournalEntry::EntryAdded => {
                        self.entries.pop();
                    }
                    JournalEntry::TagBound(name) => {
                        self.tags.remove(&name);
                    }
                    JournalEntry::TypedefBound(name) => {
                        self.typedefs.remove(&name);
                    }
                    JournalEntry::ShapeDefined(id, previous) => {
                        self.entries[id.0].shape = previous;
                    }
                }
            }
        }
    }
}

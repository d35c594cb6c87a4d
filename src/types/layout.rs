//! Storage width queries
//!
//! Whether adjacent bitfields share a storage unit is platform-defined, so
//! packing is a [`LayoutPolicy`] the caller picks rather than a rule baked
//! into parsing or registration. Widths are in bits; `None` means the type
//! has no size (`void`, incomplete structs/enums).

use crate::parser::ast::{Field, Primitive, TypeDescriptor};
use crate::types::registry::{TypeRegistry, TypeShape};

/// Pointers and function pointers on the target
pub const POINTER_BITS: u64 = 64;

/// Enums take one `int` unit
pub const ENUM_BITS: u64 = 32;

/// Bitfield packing policy for struct storage
pub trait LayoutPolicy {
    /// Storage bits for a struct body, fields in declared order
    fn struct_bits(&self, fields: &[Field], registry: &TypeRegistry) -> Option<u64>;

    /// Storage bits for any resolved descriptor
    fn type_bits(&self, ty: &TypeDescriptor, registry: &TypeRegistry) -> Option<u64> {
        match ty {
            TypeDescriptor::Primitive(Primitive::Void) => None,
            TypeDescriptor::Primitive(p) => Some(p.bit_width() as u64),
            TypeDescriptor::Pointer { .. } | TypeDescriptor::FunctionPointer { .. } => {
                Some(POINTER_BITS)
            }
            TypeDescriptor::Array { of, len } => {
                Some(self.type_bits(of, registry)? * *len as u64)
            }
            TypeDescriptor::Enum { id, .. } => match registry.shape(*id) {
                TypeShape::Incomplete => None,
                _ => Some(ENUM_BITS),
            },
            TypeDescriptor::Struct { id, .. } => match registry.shape(*id) {
                TypeShape::Struct { fields } => self.struct_bits(fields, registry),
                _ => None,
            },
        }
    }
}

/// Every bitfield is widened to its full base storage unit
pub struct UnpackedLayout;

impl LayoutPolicy for UnpackedLayout {
    fn struct_bits(&self, fields: &[Field], registry: &TypeRegistry) -> Option<u64> {
        let mut total = 0u64;
        for field in fields {
            total += self.type_bits(&field.ty, registry)?;
        }
        Some(total)
    }
}

/// Adjacent bitfields with the same base width share a storage unit until it
/// overflows; any non-bitfield member closes the open unit
pub struct PackedLayout;

impl LayoutPolicy for PackedLayout {
    fn struct_bits(&self, fields: &[Field], registry: &TypeRegistry) -> Option<u64> {
        let mut total = 0u64;
        // (unit width, bits used) of the currently open bitfield unit
        let mut open: Option<(u64, u64)> = None;

        for field in fields {
            match field.bit_width {
                Some(width) => {
                    let unit = self.type_bits(&field.ty, registry)?;
                    let width = width as u64;
                    open = Some(match open {
                        Some((u, used)) if u == unit && used + width <= u => (u, used + width),
                        Some((u, _)) => {
                            total += u;
                            (unit, width)
                        }
                        None => (unit, width),
                    });
                }
                None => {
                    if let Some((u, _)) = open.take() {
                        total += u;
                    }
                    total += self.type_bits(&field.ty, registry)?;
                }
            }
        }

        if let Some((u, _)) = open {
            total += u;
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: TypeDescriptor, bit_width: Option<u32>) -> Field {
        Field {
            name: name.to_string(),
            ty,
            bit_width,
        }
    }

    fn int() -> TypeDescriptor {
        TypeDescriptor::Primitive(Primitive::Int)
    }

    #[test]
    fn test_adjacent_bitfields_share_a_unit_when_packed() {
        let reg = TypeRegistry::new();
        let fields = vec![
            field("a", int(), Some(10)),
            field("b", int(), Some(10)),
        ];

        assert_eq!(PackedLayout.struct_bits(&fields, &reg), Some(32));
        assert_eq!(UnpackedLayout.struct_bits(&fields, &reg), Some(64));
    }

    #[test]
    fn test_overflowing_bitfield_opens_new_unit() {
        let reg = TypeRegistry::new();
        let fields = vec![
            field("a", int(), Some(30)),
            field("b", int(), Some(10)),
        ];

        assert_eq!(PackedLayout.struct_bits(&fields, &reg), Some(64));
    }

    #[test]
    fn test_plain_member_closes_open_unit() {
        let reg = TypeRegistry::new();
        let fields = vec![
            field("a", int(), Some(10)),
            field("c", int(), None),
            field("b", int(), Some(10)),
        ];

        assert_eq!(PackedLayout.struct_bits(&fields, &reg), Some(96));
    }

    #[test]
    fn test_array_and_pointer_widths() {
        let reg = TypeRegistry::new();
        let policy = PackedLayout;

        assert_eq!(policy.type_bits(&int().array_of(4), &reg), Some(128));
        assert_eq!(policy.type_bits(&int().pointer_to(2), &reg), Some(64));
        assert_eq!(
            policy.type_bits(&int().pointer_to(1).array_of(5), &reg),
            Some(320)
        );
        assert_eq!(
            policy.type_bits(&TypeDescriptor::Primitive(Primitive::Void), &reg),
            None
        );
    }
}

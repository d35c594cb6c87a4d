// Integration test over a full translation unit exercising every supported
// declaration form at once

use cdecl_core::parser::ast::{Primitive, TypeDescriptor};
use cdecl_core::parser::parse::Parser;
use cdecl_core::types::errors::TypeError;
use cdecl_core::types::layout::{LayoutPolicy, PackedLayout, UnpackedLayout};
use cdecl_core::types::registry::TypeShape;

const SOURCE: &str = r#"
    #include <stdio.h>
    enum Dier
    {
        AAP,
        ZEEHOND
    };
    typedef enum Dier DierEnum;
    typedef enum
    {
        ANON1 = 2
    } AnonEnum;
    struct teststruct
    {
        int a:10;
        int b:10;
        int c;
        char d;
        void *e;
        void **f;
        void *g;
        const char *h;
        enum Dier i;
        DierEnum j;
        int (*the_hook)(int bu);
        int array[4];
        int *pointers[5];
        int (*iii[5])(unsigned long long);
        AnonEnum ntest;
    };
    static inline __attribute__((always_inline)) int boe(int x);
    struct teststruct t;
"#;

fn int_ty() -> TypeDescriptor {
    TypeDescriptor::Primitive(Primitive::Int)
}

#[test]
fn test_fixture_unit_parses() {
    let mut parser = Parser::new(SOURCE).expect("lexing failed");
    let unit = parser.parse_unit().expect("parsing failed");

    // type definitions live in the registry; only boe and t are value-level
    assert_eq!(unit.declarations.len(), 2);
    assert_eq!(unit.declarations[0].name, "boe");
    assert_eq!(unit.declarations[1].name, "t");
}

#[test]
fn test_fixture_struct_fields() {
    let mut parser = Parser::new(SOURCE).unwrap();
    let unit = parser.parse_unit().unwrap();

    let id = unit.registry.tag_id("teststruct").unwrap();
    let fields = match unit.registry.shape(id) {
        TypeShape::Struct { fields } => fields,
        other => panic!("Expected struct shape, got {:?}", other),
    };

    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "the_hook", "array", "pointers",
            "iii", "ntest"
        ]
    );

    assert_eq!(fields[0].bit_width, Some(10));
    assert_eq!(fields[1].bit_width, Some(10));
    assert_eq!(fields[2].bit_width, None);
    assert_eq!(fields[2].ty, int_ty());
    assert_eq!(fields[3].ty, TypeDescriptor::Primitive(Primitive::Char));

    // void *e, void **f
    assert_eq!(
        fields[4].ty,
        TypeDescriptor::Primitive(Primitive::Void).pointer_to(1)
    );
    assert_eq!(
        fields[5].ty,
        TypeDescriptor::Primitive(Primitive::Void).pointer_to(2)
    );

    // const char *h (const is not part of the shape)
    assert_eq!(
        fields[7].ty,
        TypeDescriptor::Primitive(Primitive::Char).pointer_to(1)
    );

    // enum Dier i and its typedef alias j share the canonical entry
    let dier = unit.registry.tag_id("Dier").unwrap();
    match (&fields[8].ty, &fields[9].ty) {
        (TypeDescriptor::Enum { id: a, .. }, TypeDescriptor::Enum { id: b, .. }) => {
            assert_eq!(*a, dier);
            assert_eq!(*b, dier);
        }
        other => panic!("Expected enum fields, got {:?}", other),
    }

    assert_eq!(
        fields[10].ty,
        TypeDescriptor::FunctionPointer {
            ret: Box::new(int_ty()),
            params: vec![int_ty()],
        }
    );
    assert_eq!(fields[11].ty, int_ty().array_of(4));
    assert_eq!(fields[12].ty, int_ty().pointer_to(1).array_of(5));
    assert_eq!(
        fields[13].ty,
        TypeDescriptor::FunctionPointer {
            ret: Box::new(int_ty()),
            params: vec![TypeDescriptor::Primitive(Primitive::UnsignedLongLong)],
        }
        .array_of(5)
    );

    // AnonEnum ntest refers to the anonymous enum
    match &fields[14].ty {
        TypeDescriptor::Enum { tag: None, id } => match unit.registry.shape(*id) {
            TypeShape::Enum { enumerators } => {
                assert_eq!(enumerators, &[("ANON1".to_string(), 2)]);
            }
            other => panic!("Expected enum shape, got {:?}", other),
        },
        other => panic!("Expected anonymous enum, got {:?}", other),
    }
}

#[test]
fn test_fixture_enum_values() {
    let mut parser = Parser::new(SOURCE).unwrap();
    let unit = parser.parse_unit().unwrap();

    let id = unit.registry.tag_id("Dier").unwrap();
    match unit.registry.shape(id) {
        TypeShape::Enum { enumerators } => {
            assert_eq!(
                enumerators,
                &[("AAP".to_string(), 0), ("ZEEHOND".to_string(), 1)]
            );
        }
        other => panic!("Expected enum shape, got {:?}", other),
    }
}

#[test]
fn test_fixture_typedef_namespace() {
    let mut parser = Parser::new(SOURCE).unwrap();
    let unit = parser.parse_unit().unwrap();

    assert!(unit.registry.lookup("DierEnum").is_ok());
    assert!(unit.registry.lookup("AnonEnum").is_ok());
    // tags are not typedef names
    assert!(matches!(
        unit.registry.lookup("Dier"),
        Err(TypeError::UnknownTypeName { .. })
    ));
    assert!(matches!(
        unit.registry.lookup("teststruct"),
        Err(TypeError::UnknownTypeName { .. })
    ));
}

#[test]
fn test_fixture_prototype_and_variable() {
    let mut parser = Parser::new(SOURCE).unwrap();
    let unit = parser.parse_unit().unwrap();

    let boe = &unit.declarations[0];
    assert!(boe.qualifiers.is_static);
    assert!(boe.qualifiers.is_inline);
    assert_eq!(boe.attributes, vec!["always_inline".to_string()]);
    assert_eq!(
        boe.ty,
        TypeDescriptor::FunctionPointer {
            ret: Box::new(int_ty()),
            params: vec![int_ty()],
        }
    );

    let t = &unit.declarations[1];
    let id = unit.registry.tag_id("teststruct").unwrap();
    assert_eq!(
        t.ty,
        TypeDescriptor::Struct {
            tag: Some("teststruct".to_string()),
            id,
        }
    );
}

#[test]
fn test_fixture_layout_policies_differ_on_bitfields() {
    let mut parser = Parser::new(SOURCE).unwrap();
    let unit = parser.parse_unit().unwrap();

    let id = unit.registry.tag_id("teststruct").unwrap();
    let fields = match unit.registry.shape(id) {
        TypeShape::Struct { fields } => fields,
        other => panic!("Expected struct shape, got {:?}", other),
    };

    // a and b share one int unit when packed, take one each otherwise
    let packed = PackedLayout.struct_bits(fields, &unit.registry).unwrap();
    let unpacked = UnpackedLayout.struct_bits(fields, &unit.registry).unwrap();
    assert_eq!(unpacked - packed, 32);
    assert_eq!(packed, 1256);
}

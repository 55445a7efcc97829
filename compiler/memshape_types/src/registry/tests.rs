use pretty_assertions::assert_eq;

use super::*;

fn base(registry: &mut TypeRegistry) -> TypeId {
    registry
        .add_struct(
            "Base",
            vec![
                FieldDef::new("ID", TypeId::UINT64),
                FieldDef::new("CreatedAt", TypeId::INT64),
            ],
        )
        .expect("Base should define")
}

#[test]
fn builtins_have_fixed_ids() {
    let registry = TypeRegistry::new();
    assert_eq!(
        registry.kind(TypeId::BOOL),
        Some(&TypeKind::Primitive(PrimitiveKind::Bool))
    );
    assert_eq!(
        registry.kind(TypeId::UINTPTR),
        Some(&TypeKind::Primitive(PrimitiveKind::Uintptr))
    );
    assert_eq!(registry.kind(TypeId::STRING), Some(&TypeKind::String));
    assert_eq!(
        registry.kind(TypeId::BYTES),
        Some(&TypeKind::Slice(TypeId::UINT8))
    );
    assert_eq!(registry.len(), TypeId::FIRST_DYNAMIC as usize);
    assert!(TypeId::BYTES.is_builtin());
}

#[test]
fn anonymous_types_are_interned() {
    let mut registry = TypeRegistry::new();
    let p1 = registry.pointer(TypeId::INT32);
    let p2 = registry.pointer(TypeId::INT32);
    assert_eq!(p1, p2);
    assert_eq!(registry.slice(TypeId::UINT8), TypeId::BYTES);

    let a4 = registry.array(TypeId::FLOAT64, 4);
    let a5 = registry.array(TypeId::FLOAT64, 5);
    assert_ne!(a4, a5);
}

#[test]
fn structs_are_nominal() {
    let mut registry = TypeRegistry::new();
    let fields = vec![FieldDef::new("X", TypeId::INT)];
    let a = registry.add_struct("A", fields.clone()).expect("A");
    let b = registry.add_struct("B", fields).expect("B");
    assert_ne!(a, b);
    assert_eq!(registry.lookup("A"), Some(a));
    assert_eq!(registry.lookup("B"), Some(b));
    assert_eq!(registry.structs().collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn duplicate_type_name_is_rejected() {
    let mut registry = TypeRegistry::new();
    base(&mut registry);
    assert_eq!(
        registry.declare_struct("Base"),
        Err(TypeError::DuplicateType {
            name: "Base".to_owned()
        })
    );
    assert_eq!(
        registry.add_interface("Base", ["Speak"]),
        Err(TypeError::DuplicateType {
            name: "Base".to_owned()
        })
    );
}

#[test]
fn struct_is_defined_once() {
    let mut registry = TypeRegistry::new();
    let id = base(&mut registry);
    assert_eq!(
        registry.define_struct(id, vec![]),
        Err(TypeError::AlreadyDefined {
            name: "Base".to_owned()
        })
    );
    assert_eq!(
        registry.define_struct(TypeId::BOOL, vec![]),
        Err(TypeError::NotAStruct {
            name: "bool".to_owned()
        })
    );
    assert_eq!(
        registry.define_struct(TypeId::from_raw(9999), vec![]),
        Err(TypeError::UnknownTypeId(TypeId::from_raw(9999)))
    );
}

#[test]
fn duplicate_field_is_rejected() {
    let mut registry = TypeRegistry::new();
    let result = registry.add_struct(
        "Dup",
        vec![
            FieldDef::new("X", TypeId::INT),
            FieldDef::new("X", TypeId::BOOL),
        ],
    );
    assert_eq!(
        result,
        Err(TypeError::DuplicateField {
            owner: "Dup".to_owned(),
            field: "X".to_owned()
        })
    );
}

#[test]
fn self_reference_through_declaration() {
    let mut registry = TypeRegistry::new();
    let node = registry.declare_struct("Node").expect("declare");
    let ptr = registry.pointer(node);
    registry
        .define_struct(
            node,
            vec![
                FieldDef::new("Value", TypeId::INT64),
                FieldDef::new("Left", ptr),
                FieldDef::new("Right", ptr),
            ],
        )
        .expect("define");

    let def = registry.struct_def(node).expect("struct");
    assert_eq!(def.fields[1].ty, ptr);
    assert_eq!(registry.display(ptr), "*Node");
}

#[test]
fn embedded_fields_take_type_name() {
    let mut registry = TypeRegistry::new();
    let base = base(&mut registry);
    let base_ptr = registry.pointer(base);
    let speaker = registry.add_interface("Speaker", ["Speak"]).expect("iface");

    let by_value = registry.embed(base).expect("embed Base");
    assert_eq!(by_value.name, "Base");
    assert!(by_value.embedded);

    assert_eq!(registry.embed(base_ptr).expect("embed *Base").name, "Base");
    assert_eq!(registry.embed(speaker).expect("embed Speaker").name, "Speaker");
    assert_eq!(registry.embed(TypeId::INT32).expect("embed int32").name, "int32");
    assert_eq!(registry.embed(TypeId::STRING).expect("embed string").name, "string");
}

#[test]
fn unnamed_types_cannot_be_embedded() {
    let mut registry = TypeRegistry::new();
    let speaker = registry.add_interface("Speaker", ["Speak"]).expect("iface");
    let speaker_ptr = registry.pointer(speaker);
    let int_ptr = registry.pointer(TypeId::INT);
    let int_ptr_ptr = registry.pointer(int_ptr);
    let points = registry.array(TypeId::FLOAT64, 2);

    for ty in [TypeId::BYTES, speaker_ptr, int_ptr_ptr, points] {
        assert!(
            matches!(registry.embed(ty), Err(TypeError::InvalidEmbed { .. })),
            "{} should not embed",
            registry.display(ty)
        );
    }
}

#[test]
fn hand_built_embedded_field_must_match_type_name() {
    let mut registry = TypeRegistry::new();
    let base = base(&mut registry);
    let bogus = FieldDef {
        name: "NotBase".to_owned(),
        ty: base,
        embedded: true,
    };
    assert_eq!(
        registry.add_struct("Outer", vec![bogus]),
        Err(TypeError::InvalidEmbed {
            ty: "Base".to_owned()
        })
    );
}

#[test]
fn interface_rejects_duplicate_members() {
    let mut registry = TypeRegistry::new();
    assert_eq!(
        registry.add_interface("Walker", ["Walk", "Walk"]),
        Err(TypeError::DuplicateMethod {
            owner: "Walker".to_owned(),
            method: "Walk".to_owned()
        })
    );
}

#[test]
fn primitive_lookup_by_name() {
    let registry = TypeRegistry::new();
    assert_eq!(registry.primitive_named("byte"), Ok(TypeId::UINT8));
    assert_eq!(registry.primitive_named("uint64"), Ok(TypeId::UINT64));
    assert_eq!(
        registry.primitive_named("quad"),
        Err(TypeError::UnknownPrimitiveKind(UnknownPrimitiveKind::new(
            "quad"
        )))
    );
}

#[test]
fn display_type_expressions() {
    let mut registry = TypeRegistry::new();
    let point = registry
        .add_struct("Point", vec![FieldDef::new("X", TypeId::FLOAT64)])
        .expect("Point");
    let cells = registry.array(point, 4);
    let ids = registry.slice(TypeId::INT);
    let lookup = registry.map(TypeId::STRING, ids);
    let events = registry.chan(TypeId::BOOL);

    assert_eq!(registry.display(cells), "[4]Point");
    assert_eq!(registry.display(TypeId::BYTES), "[]byte");
    assert_eq!(registry.display(lookup), "map[string][]int");
    assert_eq!(registry.display(events), "chan bool");
    assert_eq!(registry.display(TypeId::from_raw(4242)), "<invalid 4242>");
}

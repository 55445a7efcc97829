use pretty_assertions::assert_eq;

use memshape_types::FieldDef;

use super::*;

#[test]
fn zero_struct_mirrors_fields() {
    let mut registry = TypeRegistry::new();
    let metadata = registry
        .add_struct("Metadata", vec![FieldDef::new("Version", TypeId::INT32)])
        .expect("Metadata should define");
    let ptr = registry.pointer(metadata);
    let pair = registry.array(TypeId::FLOAT64, 2);
    let handler = registry.func();
    let fields = vec![
        registry.embed(ptr).expect("*Metadata embeds"),
        FieldDef::new("Title", TypeId::STRING),
        FieldDef::new("Content", TypeId::BYTES),
        FieldDef::new("Published", TypeId::BOOL),
        FieldDef::new("Weights", pair),
        FieldDef::new("OnSave", handler),
        FieldDef::new("Revision", TypeId::UINT16),
    ];
    let document = registry.add_struct("Document", fields).expect("Document should define");

    let zero = Value::zero(&registry, document).expect("zero value builds");

    assert_eq!(
        zero,
        Value::Struct(vec![
            Value::Pointer(None),
            Value::Str(String::new()),
            Value::Slice(Vec::new()),
            Value::Bool(false),
            Value::Array(vec![Value::Float(0.0), Value::Float(0.0)]),
            Value::Nil,
            Value::Uint(0),
        ])
    );
    assert!(zero.field(0).is_some_and(Value::is_nil));
    assert_eq!(zero.field(7), None);
}

#[test]
fn field_mut_replaces_a_field() {
    let mut registry = TypeRegistry::new();
    let point = registry
        .add_struct(
            "Point",
            vec![FieldDef::new("X", TypeId::INT), FieldDef::new("Y", TypeId::INT)],
        )
        .expect("Point should define");
    let mut value = Value::zero(&registry, point).expect("zero value builds");

    *value.field_mut(1).expect("Y exists") = Value::Int(7);

    assert_eq!(value, Value::Struct(vec![Value::Int(0), Value::Int(7)]));
    assert_eq!(Value::Int(1).field_mut(0), None);
}

#[test]
fn self_referential_pointer_zeroes_to_nil() {
    let mut registry = TypeRegistry::new();
    let node = registry.declare_struct("Node").expect("Node declares");
    let ptr = registry.pointer(node);
    registry
        .define_struct(node, vec![FieldDef::new("Next", ptr)])
        .expect("Node should define");

    assert_eq!(
        Value::zero(&registry, node),
        Ok(Value::Struct(vec![Value::Pointer(None)]))
    );
}

#[test]
fn by_value_cycle_is_an_error() {
    let mut registry = TypeRegistry::new();
    let looped = registry.declare_struct("Loop").expect("Loop declares");
    registry
        .define_struct(looped, vec![FieldDef::new("Inner", looped)])
        .expect("Loop should define");

    assert_eq!(
        Value::zero(&registry, looped),
        Err(ValueError::Cyclic {
            name: "Loop".to_owned()
        })
    );
}

#[test]
fn incomplete_and_oversized_types_are_errors() {
    let mut registry = TypeRegistry::new();
    let pending = registry.declare_struct("Pending").expect("Pending declares");
    let huge = registry.array(TypeId::UINT8, MAX_ZERO_ELEMENTS + 1);

    assert_eq!(
        Value::zero(&registry, pending),
        Err(ValueError::Incomplete {
            name: "Pending".to_owned()
        })
    );
    assert_eq!(
        Value::zero(&registry, huge),
        Err(ValueError::TooLarge {
            name: format!("[{}]uint8", MAX_ZERO_ELEMENTS + 1)
        })
    );
    let missing = TypeId::from_raw(4_242);
    assert_eq!(Value::zero(&registry, missing), Err(ValueError::UnknownTypeId(missing)));
}

#[test]
fn element_limit_counts_across_nested_arrays() {
    let mut registry = TypeRegistry::new();
    let row = registry.array(TypeId::UINT8, 512);
    let grid = registry.array(row, 256);
    let wide_row = registry.array(TypeId::UINT8, MAX_ZERO_ELEMENTS);
    let square = registry.array(wide_row, MAX_ZERO_ELEMENTS);

    assert_eq!(
        Value::zero(&registry, grid),
        Err(ValueError::TooLarge {
            name: "[256][512]uint8".to_owned()
        })
    );
    assert!(matches!(Value::zero(&registry, square), Err(ValueError::TooLarge { .. })));

    let small_row = registry.array(TypeId::UINT8, 16);
    let small_grid = registry.array(small_row, 16);
    let Ok(Value::Array(rows)) = Value::zero(&registry, small_grid) else {
        panic!("16x16 grid should build");
    };
    assert_eq!(rows.len(), 16);
    assert!(rows.iter().all(|row| matches!(row, Value::Array(cells) if cells.len() == 16)));
}

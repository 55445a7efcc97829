use pretty_assertions::assert_eq;

use memshape_types::{FieldDef, TypeRegistry};

use super::*;
use crate::resolve::{resolve_path, resolve_selectors};

struct Fixture {
    registry: TypeRegistry,
    document: TypeId,
}

/// `Document { *Metadata; Title string }` with `Metadata { Version int32 }`.
fn document() -> Fixture {
    let mut registry = TypeRegistry::new();
    let metadata = registry
        .add_struct("Metadata", vec![FieldDef::new("Version", TypeId::INT32)])
        .expect("Metadata should define");
    let ptr = registry.pointer(metadata);
    let fields = vec![
        registry.embed(ptr).expect("*Metadata embeds"),
        FieldDef::new("Title", TypeId::STRING),
    ];
    let document = registry.add_struct("Document", fields).expect("Document should define");
    Fixture { registry, document }
}

#[test]
fn nil_embedded_pointer_fails_promoted_access() {
    let fixture = document();
    let table = resolve_selectors(&fixture.registry, fixture.document).expect("Document resolves");
    let value = Value::zero(&fixture.registry, fixture.document).expect("zero value builds");

    assert_eq!(
        access_promoted(&table, &value, "Version"),
        Err(AccessError::NilReference { at: vec![0] })
    );
    // The pointer itself and direct fields stay readable.
    assert_eq!(
        access_promoted(&table, &value, "Metadata"),
        Ok(Accessed::Field(&Value::Pointer(None)))
    );
    assert_eq!(
        access_promoted(&table, &value, "Title").expect("Title reads").field(),
        Some(&Value::Str(String::new()))
    );
}

#[test]
fn present_embedded_pointer_is_followed() {
    let fixture = document();
    let table = resolve_selectors(&fixture.registry, fixture.document).expect("Document resolves");
    let value = Value::Struct(vec![
        Value::pointer_to(Value::Struct(vec![Value::Int(3)])),
        Value::Str("notes".to_owned()),
    ]);

    assert_eq!(
        access_promoted(&table, &value, "Version"),
        Ok(Accessed::Field(&Value::Int(3)))
    );
}

#[test]
fn ambiguous_and_unknown_names_fail() {
    let mut registry = TypeRegistry::new();
    let left = registry
        .add_struct("Left", vec![FieldDef::new("X", TypeId::INT)])
        .expect("Left should define");
    let right = registry
        .add_struct("Right", vec![FieldDef::new("X", TypeId::INT)])
        .expect("Right should define");
    let fields = vec![
        registry.embed(left).expect("Left embeds"),
        registry.embed(right).expect("Right embeds"),
    ];
    let outer = registry.add_struct("Outer", fields).expect("Outer should define");
    let table = resolve_selectors(&registry, outer).expect("Outer resolves");
    let value = Value::Struct(vec![
        Value::Struct(vec![Value::Int(1)]),
        Value::Struct(vec![Value::Int(2)]),
    ]);

    assert!(matches!(
        access_promoted(&table, &value, "X"),
        Err(AccessError::Selector(SelectorError::Ambiguous { .. }))
    ));
    assert!(matches!(
        access_promoted(&table, &value, "Y"),
        Err(AccessError::Selector(SelectorError::Unknown { .. }))
    ));

    let right_x = resolve_path(&registry, outer, "Right.X").expect("Right.X resolves");
    assert_eq!(access(&value, &right_x), Ok(Accessed::Field(&Value::Int(2))));
}

#[test]
fn interface_methods_bind_the_dynamic_value() {
    let mut registry = TypeRegistry::new();
    let speaker = registry
        .add_interface("Speaker", ["Speak"])
        .expect("Speaker should register");
    let fields = vec![
        registry.embed(speaker).expect("Speaker embeds"),
        FieldDef::new("Model", TypeId::STRING),
    ];
    let robot = registry.add_struct("Robot", fields).expect("Robot should define");
    let table = resolve_selectors(&registry, robot).expect("Robot resolves");

    let silent = Value::zero(&registry, robot).expect("zero value builds");
    assert_eq!(
        access_promoted(&table, &silent, "Speak"),
        Err(AccessError::NilReference { at: vec![0] })
    );

    let dog = Value::Str("woof".to_owned());
    let loud = Value::Struct(vec![Value::interface_of(dog.clone()), Value::Str("R2".to_owned())]);
    assert_eq!(
        access_promoted(&table, &loud, "Speak"),
        Ok(Accessed::Method {
            receiver: &dog,
            interface: speaker,
            index: 0,
        })
    );
}

#[test]
fn mismatched_value_shape_is_reported() {
    let fixture = document();
    let entry = resolve_path(&fixture.registry, fixture.document, "Metadata.Version")
        .expect("path resolves");

    assert_eq!(
        access(&Value::Int(0), &entry),
        Err(AccessError::ShapeMismatch { at: Vec::new() })
    );
    assert_eq!(
        access(&Value::Struct(Vec::new()), &entry),
        Err(AccessError::ShapeMismatch { at: vec![0] })
    );
}

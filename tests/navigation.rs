//! Navigating definitions across assemblies of one load context.

use std::sync::Arc;

use dotmeta::{metadata, prelude::*};

mod common;

use common::{context_with, init_logging, type_def, MetadataBuilder, PUBLIC_CLASS};

/// `TypeDefOrRefOrSpecEncoded` byte of a `TypeRef` token with a small row.
fn encoded(type_ref: Token) -> u8 {
    ((type_ref.row() << 2) | 1) as u8
}

/// `Shapes`: an abstract `Shape`, a generic `Box<T>` and an enum `Kind`.
fn shapes() -> Vec<u8> {
    let mut builder = MetadataBuilder::new("Shapes");
    let corlib = builder.assembly_ref("mscorlib", [4, 0, 0, 0]);
    let object = builder.type_ref_in_assembly(corlib, "System", "Object");
    let enum_base = builder.type_ref_in_assembly(corlib, "System", "Enum");
    builder.type_def(0, "", "<Module>", None);

    builder.type_def(0x0010_0081, "Shapes", "Shape", Some(object));
    let get_area = builder.method(0x0DC6, "get_Area", &[0x20, 0x00, 0x0D]);
    let area = builder.property(0, "Area", &[0x28, 0x00, 0x0D]);
    builder.method_semantics(0x0002, get_area, Token::new(0x1700_0000 | area));

    let container = builder.type_def(PUBLIC_CLASS, "Shapes", "Box`1", Some(object));
    builder.field(0x0001, "value", &[0x06, 0x13, 0x00]);
    builder.method(0x0086, "Get", &[0x20, 0x00, 0x13, 0x00]);
    let identity = builder.method(0x0096, "Identity", &[0x10, 0x01, 0x01, 0x1E, 0x00, 0x1E, 0x00]);
    builder.generic_param(0, 0, type_def(container), "T");
    builder.generic_param(0, 0, Token::new(0x0600_0000 | identity), "M");

    builder.type_def(0x0101, "Shapes", "Kind", Some(enum_base));
    builder.field(0x0606, "value__", &[0x06, 0x08]);

    builder.build()
}

/// `App`: a `Circle` deriving from `Shapes.Shape` with fields of library types.
fn app() -> (Vec<u8>, u32) {
    let mut builder = MetadataBuilder::new("App");
    let shapes = builder.assembly_ref("Shapes", [1, 0, 0, 0]);
    builder.assembly_ref("mscorlib", [4, 0, 0, 0]);
    let shape = builder.type_ref_in_assembly(shapes, "Shapes", "Shape");
    let container = builder.type_ref_in_assembly(shapes, "Shapes", "Box`1");
    let kind = builder.type_ref_in_assembly(shapes, "Shapes", "Kind");
    builder.type_def(0, "", "<Module>", None);

    let circle = builder.type_def(PUBLIC_CLASS, "App", "Circle", Some(shape));
    // Box<string>
    builder.field(0x0001, "boxed", &[0x06, 0x15, 0x12, encoded(container), 0x01, 0x0E]);
    builder.field(0x0001, "kind", &[0x06, 0x11, encoded(kind)]);
    (builder.build(), circle)
}

#[test]
fn base_types_cross_assemblies() {
    init_logging();
    let context = context_with(vec![("Shapes", shapes())]);
    let (app, circle) = app();
    let app = context.load_mem(app).unwrap();

    let circle = app.type_definition(circle).unwrap();
    let shape = circle.base().unwrap().unwrap().definition().unwrap();
    assert_eq!(shape.full_name(), "Shapes.Shape");
    assert!(shape.is_abstract());
    assert_eq!(shape.assembly().unwrap().name(), "Shapes");

    let object = shape.base().unwrap().unwrap().definition().unwrap();
    assert_eq!(object.full_name(), "System.Object");
    assert!(object.assembly().unwrap().is_core_library());

    let inherited = MemberFilter {
        inherited: true,
        ..MemberFilter::default()
    };
    assert!(circle.find_property("Area", &MemberFilter::default()).unwrap().is_none());
    let area = circle.find_property("Area", &inherited).unwrap().unwrap();
    assert_eq!(area.declaring_type().unwrap(), shape);
    assert_eq!(area.property_type().unwrap().to_string(), "System.Double");

    let shapes = context
        .find(&AssemblyIdentity::new("Shapes", AssemblyVersion::new(1, 0, 0, 0)))
        .unwrap();
    assert!(Arc::ptr_eq(&shape.assembly().unwrap(), &shapes));
    assert_eq!(context.assemblies().len(), 3);
}

#[test]
fn generic_members_bind_through_instantiations() {
    let context = context_with(vec![("Shapes", shapes())]);
    let (app, circle) = app();
    let app = context.load_mem(app).unwrap();
    let circle = app.type_definition(circle).unwrap();

    let boxed = circle.find_field("boxed", &MemberFilter::default()).unwrap().unwrap();
    let instantiation = boxed.field_type().unwrap().as_bound().unwrap().clone();
    assert_eq!(instantiation.to_string(), "Shapes.Box<System.String>");

    let container = instantiation.definition().unwrap();
    let get = container.find_method("Get", &MethodFilter::default()).unwrap().unwrap();
    assert!(get.return_type().unwrap().is_parameterized());
    assert_eq!(
        instantiation.bind_member_type(get.return_type().unwrap()).unwrap().to_string(),
        "System.String"
    );

    let identity = container
        .find_method(
            "Identity",
            &MethodFilter {
                generic_arity: Some(1),
                is_static: Some(true),
                ..MethodFilter::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(identity.generic_params().unwrap()[0].name, "M");
    let int32 = app.primitive_type(PrimitiveKind::I4).unwrap();
    let bound = identity
        .return_type()
        .unwrap()
        .bind_generic_params(None, Some(&[int32.clone()]))
        .unwrap();
    assert_eq!(bound, int32);
}

#[test]
fn value_types_from_other_assemblies() {
    let context = context_with(vec![("Shapes", shapes())]);
    let (app, circle) = app();
    let app = context.load_mem(app).unwrap();
    let circle = app.type_definition(circle).unwrap();

    let kind = circle.find_field("kind", &MemberFilter::default()).unwrap().unwrap();
    let node = kind.field_type().unwrap();
    assert_eq!(node.is_value_type(), Some(true));

    let definition = node.as_definition().unwrap().unwrap();
    assert_eq!(definition.kind(), TypeDefinitionKind::Enum);
    let underlying = definition.as_enum().unwrap().underlying_type().unwrap();
    assert_eq!(underlying.full_name(), "System.Int32");
    assert!(!definition.as_enum().unwrap().is_flags().unwrap());
}

#[test]
fn reflection_names_and_references() {
    let context = context_with(vec![("Shapes", shapes())]);
    let (app, _) = app();
    let app = context.load_mem(app).unwrap();

    let names = app
        .references()
        .unwrap()
        .into_iter()
        .map(|identity| identity.name)
        .collect::<Vec<_>>();
    assert_eq!(names, ["Shapes", "mscorlib"]);

    let container = app.resolve_reflection_name("Shapes.Box`1, Shapes").unwrap().unwrap();
    assert_eq!(container.name_without_generic_suffix(), "Box");
    assert_eq!(container.generic_arity().unwrap(), 1);
    assert_eq!(app.resolve_reflection_name("App.Missing").unwrap(), None);
}

#[test]
fn unresolvable_reference_names_the_assembly() {
    let context = context_with(Vec::new());
    let (app, circle) = app();
    let app = context.load_mem(app).unwrap();
    let circle = app.type_definition(circle).unwrap();

    match circle.base() {
        Err(Error::AssemblyNotFound { identity, .. }) => assert!(identity.starts_with("Shapes")),
        other => panic!("unexpected {:?}", other.map(|base| base.map(ToString::to_string))),
    }
    // Decoding that does not need the reference still works
    assert_eq!(circle.fields().unwrap().len(), 2);
}

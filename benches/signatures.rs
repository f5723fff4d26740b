//! Benchmarks for signature decoding and encoding, and for binding a whole module.

extern crate dotmeta;

use criterion::{criterion_group, criterion_main, Criterion};
use dotmeta::{
    metadata::{
        self,
        signatures::{
            encoder::encode_method_signature, read_field, read_method_def, read_method_spec,
            read_property, read_type_spec,
        },
    },
    prelude::*,
};
use std::hint::black_box;

#[allow(dead_code)]
#[path = "../src/test/builder.rs"]
mod builder;

fn bench_method_signatures(c: &mut Criterion) {
    let cases: [(&str, &[u8]); 5] = [
        // DEFAULT, 0 params, VOID return
        ("sig_method_void_no_params", &[0x00, 0x00, 0x01]),
        // DEFAULT, 3 params, I4 return, I4, STRING, BOOLEAN params
        ("sig_method_primitives", &[0x00, 0x03, 0x08, 0x08, 0x0E, 0x02]),
        // HASTHIS | GENERIC, 2 generic params, 1 param, MVAR(1) return, MVAR(0) param
        ("sig_method_generic", &[0x30, 0x02, 0x01, 0x1E, 0x01, 0x1E, 0x00]),
        // DEFAULT, 2 params, VOID return, BYREF I4, BYREF STRING
        ("sig_method_byref", &[0x00, 0x02, 0x01, 0x10, 0x08, 0x10, 0x0E]),
        // DEFAULT, 8 params, VOID return, 8x I4
        (
            "sig_method_many_params",
            &[0x00, 0x08, 0x01, 0x08, 0x08, 0x08, 0x08, 0x08, 0x08, 0x08, 0x08],
        ),
    ];

    for (name, signature) in cases {
        c.bench_function(name, |b| {
            b.iter(|| black_box(read_method_def(black_box(signature)).unwrap()));
        });
    }
}

fn bench_other_signatures(c: &mut Criterion) {
    // FIELD, GENERICINST CLASS TypeRef(0x12) 2 args: STRING, SZARRAY I4
    let field = [0x06, 0x15, 0x12, 0x49, 0x02, 0x0E, 0x1D, 0x08];
    c.bench_function("sig_field_generic_inst", |b| {
        b.iter(|| black_box(read_field(black_box(&field)).unwrap()));
    });

    // PROPERTY | HASTHIS, 1 param, STRING return, I4 index
    let property = [0x28, 0x01, 0x0E, 0x08];
    c.bench_function("sig_property_indexer", |b| {
        b.iter(|| black_box(read_property(black_box(&property)).unwrap()));
    });

    // ARRAY I4 rank 2, sizes [4, 4], lower bounds [0, 0]
    let type_spec = [0x14, 0x08, 0x02, 0x02, 0x04, 0x04, 0x02, 0x00, 0x00];
    c.bench_function("sig_type_spec_md_array", |b| {
        b.iter(|| black_box(read_type_spec(black_box(&type_spec)).unwrap()));
    });

    // GENERICINST, 2 args: I4, CLASS TypeDef(0x02)
    let method_spec = [0x0A, 0x02, 0x08, 0x12, 0x08];
    c.bench_function("sig_method_spec", |b| {
        b.iter(|| black_box(read_method_spec(black_box(&method_spec)).unwrap()));
    });
}

fn bench_encode(c: &mut Criterion) {
    let signature = read_method_def(&[0x30, 0x02, 0x02, 0x1E, 0x01, 0x1E, 0x00, 0x1D, 0x0E]).unwrap();
    c.bench_function("encode_method_generic", |b| {
        b.iter(|| black_box(encode_method_signature(black_box(&signature)).unwrap()));
    });
}

/// A module with `count` classes of four fields and four methods each.
fn wide_module(count: u32) -> Vec<u8> {
    let mut builder = builder::MetadataBuilder::new("Wide");
    builder.type_def(0, "", "<Module>", None);
    for index in 0..count {
        builder.type_def(0x0010_0001, "Wide", &format!("Type{index}"), None);
        for field in 0..4 {
            builder.field(0x0001, &format!("f{field}"), &[0x06, 0x08]);
        }
        for method in 0..4 {
            builder.method(0x0086, &format!("M{method}"), &[0x20, 0x01, 0x01, 0x0E]);
        }
    }
    builder.build()
}

fn bench_bind_module(c: &mut Criterion) {
    let data = wide_module(500);

    c.bench_function("module_parse", |b| {
        b.iter(|| black_box(ModuleFile::from_mem(black_box(data.clone())).unwrap()));
    });

    c.bench_function("module_bind_members", |b| {
        b.iter(|| {
            let context = AssemblyLoadContext::default();
            let assembly = context.load_mem(data.clone()).unwrap();
            let mut members = 0;
            for definition in assembly.types().unwrap() {
                members += definition.fields().unwrap().len();
                members += definition.methods().unwrap().len();
            }
            black_box(members)
        });
    });

    let context = AssemblyLoadContext::default();
    let assembly = context.load_mem(data).unwrap();
    c.bench_function("module_find_type", |b| {
        b.iter(|| black_box(assembly.resolve_type_definition(black_box("Wide.Type250")).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_method_signatures,
    bench_other_signatures,
    bench_encode,
    bench_bind_module
);
criterion_main!(benches);

#![no_main]

use dotmeta::prelude::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(module) = ModuleFile::from_mem(data.to_vec()) else {
        return;
    };

    let context = AssemblyLoadContext::default();
    let Ok(assembly) = context.load_module(module) else {
        return;
    };

    if let Ok(types) = assembly.types() {
        for definition in types {
            let _ = definition.base();
            let _ = definition.nested_types();
            if let Ok(methods) = definition.methods() {
                for method in methods {
                    let _ = method.params();
                    let _ = method.attributes();
                }
            }
            let _ = definition.fields().map(|fields| {
                fields.iter().map(|field| field.field_type().is_ok()).count()
            });
            let _ = definition.properties();
            let _ = definition.events();
        }
    }
});

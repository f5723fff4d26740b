//! Reading images through the public API: PE and bare metadata, heaps and raw rows.

use dotmeta::{metadata, prelude::*};

mod common;

use common::{init_logging, type_def, wrap_in_pe, MetadataBuilder, PUBLIC_CLASS};

fn library() -> MetadataBuilder {
    let mut builder = MetadataBuilder::new("Library");
    builder.version([2, 1, 0, 7]);
    builder.type_def(0, "", "<Module>", None);
    builder.type_def(PUBLIC_CLASS, "Library", "Widget", None);
    builder.field(0x0001, "size", &[0x06, 0x08]);
    builder.method(0x0086, "Resize", &[0x20, 0x01, 0x01, 0x08]);
    builder
}

#[test]
fn pe_and_bare_metadata_agree() {
    init_logging();
    let metadata = library().build();

    let bare = ModuleFile::from_mem(metadata.clone()).unwrap();
    assert!(!bare.file().is_pe());
    assert!(bare.file().cor20header().is_none());

    let pe = ModuleFile::from_mem(wrap_in_pe(&metadata)).unwrap();
    assert!(pe.file().is_pe());
    let header = pe.file().cor20header().unwrap();
    assert_eq!(header.cb, 72);
    assert_eq!(header.meta_data_size as usize, metadata.len());
    assert_eq!(pe.file().metadata(), metadata.as_slice());

    for module in [&bare, &pe] {
        assert_eq!(module.root().signature, CIL_HEADER_MAGIC);
        assert_eq!(module.root().version, "v4.0.30319");
        assert_eq!(module.module_name().unwrap(), "Library.dll");
        assert_eq!(module.tables().table_row_count(TableId::TypeDef), 2);
    }
}

#[test]
fn raw_rows_and_heaps() {
    let mut builder = library();
    let greeting = builder.user_string("hello");
    let module = ModuleFile::from_mem(builder.build()).unwrap();

    let widget = module.row::<TypeDefRaw>(2).unwrap();
    assert_eq!(module.string(widget.type_namespace).unwrap(), "Library");
    assert_eq!(module.string(widget.type_name).unwrap(), "Widget");
    assert_eq!(widget.flags, PUBLIC_CLASS);

    let methods = module.table::<MethodDefRaw>().unwrap();
    let resize = methods.iter().next().unwrap().unwrap();
    assert_eq!(module.string(resize.name).unwrap(), "Resize");
    let signature = metadata::signatures::read_method_def(module.blob(resize.signature).unwrap()).unwrap();
    assert!(signature.has_this);
    assert_eq!(signature.params.len(), 1);
    assert_eq!(signature.params[0].base, TypeSignature::I4);

    assert_eq!(module.user_string(greeting).unwrap(), "hello");
    assert!(module.row::<TypeDefRaw>(3).is_err());
}

#[test]
fn assembly_identity() {
    let context = AssemblyLoadContext::default();
    let assembly = context.load_mem(wrap_in_pe(&library().build())).unwrap();

    assert_eq!(assembly.name(), "Library");
    assert_eq!(assembly.version(), AssemblyVersion::new(2, 1, 0, 7));
    assert!(!assembly.is_core_library());
    assert_eq!(
        assembly.identity(),
        &AssemblyIdentity::new("library", AssemblyVersion::new(2, 1, 0, 7))
    );

    let widget = assembly.type_definition(2).unwrap();
    assert_eq!(widget.token(), type_def(2));
    assert_eq!(widget.full_name(), "Library.Widget");
    assert_eq!(assembly.types().unwrap().len(), 2);
}

#[test]
fn malformed_input_is_an_error() {
    assert!(ModuleFile::from_mem(Vec::new()).is_err());
    assert!(ModuleFile::from_mem(vec![0xFF; 512]).is_err());

    let mut truncated = library().build();
    truncated.truncate(truncated.len() / 2);
    assert!(ModuleFile::from_mem(truncated).is_err());

    let mut pe = wrap_in_pe(&library().build());
    // Point the CLI header past the end of the image
    pe[0x200 + 8..0x200 + 12].copy_from_slice(&0x00FF_0000u32.to_le_bytes());
    assert!(ModuleFile::from_mem(pe).is_err());
}

#[test]
fn file_backends() {
    use dotmeta::file::{memory::Memory, physical::Physical, Backend};

    let metadata = library().build();
    let memory = Memory::new(metadata.clone());
    assert_eq!(memory.data(), metadata.as_slice());

    let path = std::env::temp_dir().join(format!("dotmeta-backend-{}.dll", std::process::id()));
    std::fs::write(&path, &metadata).unwrap();
    let physical = Physical::new(&path).unwrap();
    assert_eq!(physical.len(), metadata.len());
    assert_eq!(physical.data(), memory.data());

    let module = ModuleFile::from_file(&path).unwrap();
    assert_eq!(module.row::<TypeDefRaw>(2).unwrap().flags, PUBLIC_CLASS);

    drop(physical);
    drop(module);
    std::fs::remove_file(&path).unwrap();
}

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// `TypeAttributes` bit mask values (II.23.1.15)
pub mod TypeAttributes {
    /// Mask for the visibility bits
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Top-level type, not visible outside its assembly
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Top-level public type
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Nested public type
    pub const NESTED_PUBLIC: u32 = 0x0000_0002;
    /// Nested private type
    pub const NESTED_PRIVATE: u32 = 0x0000_0003;
    /// Nested type visible to the enclosing type and its subtypes
    pub const NESTED_FAMILY: u32 = 0x0000_0004;
    /// Nested type visible within the assembly
    pub const NESTED_ASSEMBLY: u32 = 0x0000_0005;
    /// Nested type visible to subtypes within the assembly
    pub const NESTED_FAM_AND_ASSEM: u32 = 0x0000_0006;
    /// Nested type visible to subtypes and within the assembly
    pub const NESTED_FAM_OR_ASSEM: u32 = 0x0000_0007;
    /// Mask for the layout bits
    pub const LAYOUT_MASK: u32 = 0x0000_0018;
    /// Fields are laid out by the runtime
    pub const AUTO_LAYOUT: u32 = 0x0000_0000;
    /// Fields are laid out in declaration order
    pub const SEQUENTIAL_LAYOUT: u32 = 0x0000_0008;
    /// Field offsets are given explicitly
    pub const EXPLICIT_LAYOUT: u32 = 0x0000_0010;
    /// The type is an interface
    pub const INTERFACE: u32 = 0x0000_0020;
    /// The type cannot be instantiated
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// The type cannot be derived from
    pub const SEALED: u32 = 0x0000_0100;
    /// The name is special
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
    /// The runtime treats the name specially
    pub const RT_SPECIAL_NAME: u32 = 0x0000_0800;
    /// The type is imported
    pub const IMPORT: u32 = 0x0000_1000;
    /// The type is serializable
    pub const SERIALIZABLE: u32 = 0x0000_2000;
    /// A Windows Runtime type
    pub const WINDOWS_RUNTIME: u32 = 0x0000_4000;
    /// Static initialization may run before the first static field access
    pub const BEFORE_FIELD_INIT: u32 = 0x0010_0000;
}

/// A row of the `TypeDef` table (ECMA-335 II.22.37).
///
/// `field_list` and `method_list` start the type's run of fields and methods; the run ends where
/// the next row's list starts.
#[derive(Clone, Debug)]
pub struct TypeDefRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `TypeAttributes` bit mask
    pub flags: u32,
    /// `#Strings` index of the type name
    pub type_name: u32,
    /// `#Strings` index of the namespace
    pub type_namespace: u32,
    /// Base type, null for interfaces and `System.Object`
    pub extends: CodedIndex,
    /// First row of this type's fields
    pub field_list: u32,
    /// First row of this type's methods
    pub method_list: u32,
}

impl RowReadable for TypeDefRaw {
    const TABLE: TableId = TableId::TypeDef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */         4 +
            /* type_name */     sizes.str_bytes() +
            /* type_namespace */sizes.str_bytes() +
            /* extends */       sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef) +
            /* field_list */    sizes.table_index_bytes(TableId::Field) +
            /* method_list */   sizes.table_index_bytes(TableId::MethodDef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(TypeDefRaw {
            rid,
            token: Token::new(0x0200_0000 + rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            extends: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
            field_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
            method_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
        })
    }
}

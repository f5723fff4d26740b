use std::{ops::Range, sync::Arc};

use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{
        create_table_match, impl_table_access, AssemblyOsRaw, AssemblyProcessorRaw, AssemblyRaw,
        AssemblyRefOsRaw, AssemblyRefProcessorRaw, AssemblyRefRaw, ClassLayoutRaw, ConstantRaw,
        CustomAttributeRaw, DeclSecurityRaw, EncLogRaw, EncMapRaw, EventMapRaw, EventPtrRaw,
        EventRaw, ExportedTypeRaw, FieldLayoutRaw, FieldMarshalRaw, FieldPtrRaw, FieldRaw,
        FieldRvaRaw, FileRaw, GenericParamConstraintRaw, GenericParamRaw, ImplMapRaw,
        InterfaceImplRaw, ManifestResourceRaw, MemberRefRaw, MetadataTable, MethodDefRaw,
        MethodImplRaw, MethodPtrRaw, MethodSemanticsRaw, MethodSpecRaw, ModuleRaw, ModuleRefRaw,
        NestedClassRaw, ParamPtrRaw, ParamRaw, PropertyMapRaw, PropertyPtrRaw, PropertyRaw,
        RowReadable, StandAloneSigRaw, TableAccess, TableData, TableId, TableInfo, TableInfoRef,
        TypeDefRaw, TypeRefRaw, TypeSpecRaw, TABLE_COUNT,
    },
    Result,
};

/// A parent to child list column: the parent row stores the first child, the run ends where
/// the next parent's run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildList {
    /// `TypeDef.field_list` into `Field`
    Fields,
    /// `TypeDef.method_list` into `MethodDef`
    Methods,
    /// `MethodDef.param_list` into `Param`
    Params,
    /// `PropertyMap.property_list` into `Property`
    Properties,
    /// `EventMap.event_list` into `Event`
    Events,
}

impl ChildList {
    /// The table holding the parent rows.
    #[must_use]
    pub fn parent_table(&self) -> TableId {
        match self {
            ChildList::Fields | ChildList::Methods => TableId::TypeDef,
            ChildList::Params => TableId::MethodDef,
            ChildList::Properties => TableId::PropertyMap,
            ChildList::Events => TableId::EventMap,
        }
    }

    /// The table the list column points into.
    #[must_use]
    pub fn child_table(&self) -> TableId {
        match self {
            ChildList::Fields => TableId::Field,
            ChildList::Methods => TableId::MethodDef,
            ChildList::Params => TableId::Param,
            ChildList::Properties => TableId::Property,
            ChildList::Events => TableId::Event,
        }
    }

    /// The indirection table used by uncompressed (`#-`) streams.
    #[must_use]
    pub fn ptr_table(&self) -> TableId {
        match self {
            ChildList::Fields => TableId::FieldPtr,
            ChildList::Methods => TableId::MethodPtr,
            ChildList::Params => TableId::ParamPtr,
            ChildList::Properties => TableId::PropertyPtr,
            ChildList::Events => TableId::EventPtr,
        }
    }
}

/// The header of the `#~` (or `#-`) stream and views over every table it contains.
///
/// Parsing lays out all tables up front, since the position of each table depends on the
/// sizes of all tables before it, but no row is decoded until it is requested.
///
/// # Examples
///
/// ```rust,no_run
/// use dotmeta::metadata::{streams::TablesHeader, tables::TypeDefRaw};
///
/// # fn example(tables: &TablesHeader) -> dotmeta::Result<()> {
/// if let Some(types) = tables.table::<TypeDefRaw>() {
///     for row in types.iter() {
///         let row = row?;
///         println!("type name index: {}", row.type_name);
///     }
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.6 && II.22
pub struct TablesHeader<'a> {
    /// Major version of table schemata, shall be 2
    pub major_version: u8,
    /// Minor version of table schemata, shall be 0
    pub minor_version: u8,
    /// `HeapSizes` flags: 0x01 wide `#Strings`, 0x02 wide `#GUID`, 0x04 wide `#Blob`
    pub heap_sizes: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and column widths of all tables
    pub info: TableInfoRef,
    tables: Vec<Option<TableData<'a>>>,
}

impl<'a> TablesHeader<'a> {
    /// Parse the tables header and lay out all present tables.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header is truncated, or
    /// [`crate::Error::Malformed`] if the tables do not fit into `data`.
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(out_of_bounds_error!());
        }

        let valid = read_le::<u64>(&data[8..])?;
        let info = Arc::new(TableInfo::new(data, valid)?);

        let mut tables_header = TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            heap_sizes: read_le::<u8>(&data[6..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            tables: Vec::with_capacity(TABLE_COUNT),
        };
        tables_header.tables.resize_with(TABLE_COUNT, || None);

        let mut current_offset = 24 + valid.count_ones() as usize * 4;
        for table_id in TableId::iter() {
            let rows = tables_header.info.rows(table_id);
            if rows == 0 {
                continue;
            }

            let Some(table_data) = data.get(current_offset..) else {
                return Err(malformed_error!(
                    "Table {:?} starts at 0x{:X}, past the end of the stream",
                    table_id,
                    current_offset
                ));
            };

            let sorted = tables_header.sorted & table_id.mask() != 0;
            let table = create_table_match!(
                table_id,
                table_data,
                rows,
                sorted,
                tables_header.info,
                &mut current_offset,
            (TableId::Module, ModuleRaw, Module),
            (TableId::TypeRef, TypeRefRaw, TypeRef),
            (TableId::TypeDef, TypeDefRaw, TypeDef),
            (TableId::FieldPtr, FieldPtrRaw, FieldPtr),
            (TableId::Field, FieldRaw, Field),
            (TableId::MethodPtr, MethodPtrRaw, MethodPtr),
            (TableId::MethodDef, MethodDefRaw, MethodDef),
            (TableId::ParamPtr, ParamPtrRaw, ParamPtr),
            (TableId::Param, ParamRaw, Param),
            (TableId::InterfaceImpl, InterfaceImplRaw, InterfaceImpl),
            (TableId::MemberRef, MemberRefRaw, MemberRef),
            (TableId::Constant, ConstantRaw, Constant),
            (TableId::CustomAttribute, CustomAttributeRaw, CustomAttribute),
            (TableId::FieldMarshal, FieldMarshalRaw, FieldMarshal),
            (TableId::DeclSecurity, DeclSecurityRaw, DeclSecurity),
            (TableId::ClassLayout, ClassLayoutRaw, ClassLayout),
            (TableId::FieldLayout, FieldLayoutRaw, FieldLayout),
            (TableId::StandAloneSig, StandAloneSigRaw, StandAloneSig),
            (TableId::EventMap, EventMapRaw, EventMap),
            (TableId::EventPtr, EventPtrRaw, EventPtr),
            (TableId::Event, EventRaw, Event),
            (TableId::PropertyMap, PropertyMapRaw, PropertyMap),
            (TableId::PropertyPtr, PropertyPtrRaw, PropertyPtr),
            (TableId::Property, PropertyRaw, Property),
            (TableId::MethodSemantics, MethodSemanticsRaw, MethodSemantics),
            (TableId::MethodImpl, MethodImplRaw, MethodImpl),
            (TableId::ModuleRef, ModuleRefRaw, ModuleRef),
            (TableId::TypeSpec, TypeSpecRaw, TypeSpec),
            (TableId::ImplMap, ImplMapRaw, ImplMap),
            (TableId::FieldRVA, FieldRvaRaw, FieldRVA),
            (TableId::EncLog, EncLogRaw, EncLog),
            (TableId::EncMap, EncMapRaw, EncMap),
            (TableId::Assembly, AssemblyRaw, Assembly),
            (TableId::AssemblyProcessor, AssemblyProcessorRaw, AssemblyProcessor),
            (TableId::AssemblyOS, AssemblyOsRaw, AssemblyOS),
            (TableId::AssemblyRef, AssemblyRefRaw, AssemblyRef),
            (TableId::AssemblyRefProcessor, AssemblyRefProcessorRaw, AssemblyRefProcessor),
            (TableId::AssemblyRefOS, AssemblyRefOsRaw, AssemblyRefOS),
            (TableId::File, FileRaw, File),
            (TableId::ExportedType, ExportedTypeRaw, ExportedType),
            (TableId::ManifestResource, ManifestResourceRaw, ManifestResource),
            (TableId::NestedClass, NestedClassRaw, NestedClass),
            (TableId::GenericParam, GenericParamRaw, GenericParam),
            (TableId::MethodSpec, MethodSpecRaw, MethodSpec),
            (TableId::GenericParamConstraint, GenericParamConstraintRaw, GenericParamConstraint),
            );

            tables_header.tables[table_id as usize] = Some(table);
        }

        Ok(tables_header)
    }

    /// Number of tables in the `Valid` mask.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Whether `table_id` is present with at least one row.
    #[must_use]
    pub fn has_table(&self, table_id: TableId) -> bool {
        matches!(self.tables.get(table_id as usize), Some(Some(_)))
    }

    /// Number of rows of `table_id`, 0 if absent.
    #[must_use]
    pub fn table_row_count(&self, table_id: TableId) -> u32 {
        self.info.rows(table_id)
    }

    /// The table of row type `T`, if present.
    #[must_use]
    pub fn table<T: RowReadable>(&self) -> Option<&MetadataTable<'a, T>>
    where
        Self: TableAccess<'a, T>,
    {
        <Self as TableAccess<'a, T>>::table(self)
    }

    /// Tables present in this stream, in table-id order.
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        TableId::iter().filter(|table_id| self.has_table(*table_id))
    }

    /// Number of rows decoded so far across all tables.
    #[must_use]
    pub fn rows_read(&self) -> u64 {
        self.info.rows_read()
    }

    /// The run of child positions owned by `parent_rid`.
    ///
    /// The range is in list positions: without the matching `*Ptr` table these are row ids of
    /// the child table, with it they index the `*Ptr` table. Use
    /// [`TablesHeader::children`] for resolved child row ids.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `parent_rid` does not exist or the list columns
    /// are not ascending within the child table.
    pub fn child_range(&self, list: ChildList, parent_rid: u32) -> Result<Range<u32>> {
        let parent_rows = self.info.rows(list.parent_table());
        if parent_rid == 0 || parent_rid > parent_rows {
            return Err(malformed_error!(
                "Parent row {} out of range for {:?} with {} rows",
                parent_rid,
                list.parent_table(),
                parent_rows
            ));
        }

        let child_count = if self.has_table(list.ptr_table()) {
            self.info.rows(list.ptr_table())
        } else {
            self.info.rows(list.child_table())
        };

        let start = self.list_start(list, parent_rid)?;
        let end = if parent_rid < parent_rows {
            self.list_start(list, parent_rid + 1)?
        } else {
            child_count + 1
        };

        if start == 0 || start > end || end > child_count + 1 {
            return Err(malformed_error!(
                "{:?} list of {:?} row {} spans {}..{} but the table has {} rows",
                list,
                list.parent_table(),
                parent_rid,
                start,
                end,
                child_count
            ));
        }

        Ok(start..end)
    }

    /// Child row ids owned by `parent_rid`, mapped through the `*Ptr` table when present.
    ///
    /// # Errors
    /// Same as [`TablesHeader::child_range`], plus decode errors of the `*Ptr` rows.
    pub fn children(&self, list: ChildList, parent_rid: u32) -> Result<Vec<u32>> {
        let range = self.child_range(list, parent_rid)?;
        if !self.has_table(list.ptr_table()) {
            return Ok(range.collect());
        }

        range
            .map(|position| match list {
                ChildList::Fields => self.ptr_row::<FieldPtrRaw>(position).map(|row| row.field),
                ChildList::Methods => self.ptr_row::<MethodPtrRaw>(position).map(|row| row.method),
                ChildList::Params => self.ptr_row::<ParamPtrRaw>(position).map(|row| row.param),
                ChildList::Properties => self
                    .ptr_row::<PropertyPtrRaw>(position)
                    .map(|row| row.property),
                ChildList::Events => self.ptr_row::<EventPtrRaw>(position).map(|row| row.event),
            })
            .collect()
    }

    fn ptr_row<T: RowReadable>(&self, position: u32) -> Result<T>
    where
        Self: TableAccess<'a, T>,
    {
        match self.table::<T>() {
            Some(table) => table.get(position),
            None => Err(malformed_error!("Missing {:?} table", T::TABLE)),
        }
    }

    fn list_start(&self, list: ChildList, parent_rid: u32) -> Result<u32> {
        let missing = || malformed_error!("Missing {:?} table", list.parent_table());

        match list {
            ChildList::Fields => Ok(self
                .table::<TypeDefRaw>()
                .ok_or_else(missing)?
                .get(parent_rid)?
                .field_list),
            ChildList::Methods => Ok(self
                .table::<TypeDefRaw>()
                .ok_or_else(missing)?
                .get(parent_rid)?
                .method_list),
            ChildList::Params => Ok(self
                .table::<MethodDefRaw>()
                .ok_or_else(missing)?
                .get(parent_rid)?
                .param_list),
            ChildList::Properties => Ok(self
                .table::<PropertyMapRaw>()
                .ok_or_else(missing)?
                .get(parent_rid)?
                .property_list),
            ChildList::Events => Ok(self
                .table::<EventMapRaw>()
                .ok_or_else(missing)?
                .get(parent_rid)?
                .event_list),
        }
    }
}

impl_table_access!(
    (TableId::Module, ModuleRaw, Module),
    (TableId::TypeRef, TypeRefRaw, TypeRef),
    (TableId::TypeDef, TypeDefRaw, TypeDef),
    (TableId::FieldPtr, FieldPtrRaw, FieldPtr),
    (TableId::Field, FieldRaw, Field),
    (TableId::MethodPtr, MethodPtrRaw, MethodPtr),
    (TableId::MethodDef, MethodDefRaw, MethodDef),
    (TableId::ParamPtr, ParamPtrRaw, ParamPtr),
    (TableId::Param, ParamRaw, Param),
    (TableId::InterfaceImpl, InterfaceImplRaw, InterfaceImpl),
    (TableId::MemberRef, MemberRefRaw, MemberRef),
    (TableId::Constant, ConstantRaw, Constant),
    (TableId::CustomAttribute, CustomAttributeRaw, CustomAttribute),
    (TableId::FieldMarshal, FieldMarshalRaw, FieldMarshal),
    (TableId::DeclSecurity, DeclSecurityRaw, DeclSecurity),
    (TableId::ClassLayout, ClassLayoutRaw, ClassLayout),
    (TableId::FieldLayout, FieldLayoutRaw, FieldLayout),
    (TableId::StandAloneSig, StandAloneSigRaw, StandAloneSig),
    (TableId::EventMap, EventMapRaw, EventMap),
    (TableId::EventPtr, EventPtrRaw, EventPtr),
    (TableId::Event, EventRaw, Event),
    (TableId::PropertyMap, PropertyMapRaw, PropertyMap),
    (TableId::PropertyPtr, PropertyPtrRaw, PropertyPtr),
    (TableId::Property, PropertyRaw, Property),
    (TableId::MethodSemantics, MethodSemanticsRaw, MethodSemantics),
    (TableId::MethodImpl, MethodImplRaw, MethodImpl),
    (TableId::ModuleRef, ModuleRefRaw, ModuleRef),
    (TableId::TypeSpec, TypeSpecRaw, TypeSpec),
    (TableId::ImplMap, ImplMapRaw, ImplMap),
    (TableId::FieldRVA, FieldRvaRaw, FieldRVA),
    (TableId::EncLog, EncLogRaw, EncLog),
    (TableId::EncMap, EncMapRaw, EncMap),
    (TableId::Assembly, AssemblyRaw, Assembly),
    (TableId::AssemblyProcessor, AssemblyProcessorRaw, AssemblyProcessor),
    (TableId::AssemblyOS, AssemblyOsRaw, AssemblyOS),
    (TableId::AssemblyRef, AssemblyRefRaw, AssemblyRef),
    (TableId::AssemblyRefProcessor, AssemblyRefProcessorRaw, AssemblyRefProcessor),
    (TableId::AssemblyRefOS, AssemblyRefOsRaw, AssemblyRefOS),
    (TableId::File, FileRaw, File),
    (TableId::ExportedType, ExportedTypeRaw, ExportedType),
    (TableId::ManifestResource, ManifestResourceRaw, ManifestResource),
    (TableId::NestedClass, NestedClassRaw, NestedClass),
    (TableId::GenericParam, GenericParamRaw, GenericParam),
    (TableId::MethodSpec, MethodSpecRaw, MethodSpec),
    (TableId::GenericParamConstraint, GenericParamConstraintRaw, GenericParamConstraint),
);

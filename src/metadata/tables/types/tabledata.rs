use crate::metadata::tables::{
    AssemblyOsRaw, AssemblyProcessorRaw, AssemblyRaw, AssemblyRefOsRaw, AssemblyRefProcessorRaw,
    AssemblyRefRaw, ClassLayoutRaw, ConstantRaw, CustomAttributeRaw, DeclSecurityRaw, EncLogRaw,
    EncMapRaw, EventMapRaw, EventPtrRaw, EventRaw, ExportedTypeRaw, FieldLayoutRaw,
    FieldMarshalRaw, FieldPtrRaw, FieldRaw, FieldRvaRaw, FileRaw, GenericParamConstraintRaw,
    GenericParamRaw, ImplMapRaw, InterfaceImplRaw, ManifestResourceRaw, MemberRefRaw,
    MetadataTable, MethodDefRaw, MethodImplRaw, MethodPtrRaw, MethodSemanticsRaw, MethodSpecRaw,
    ModuleRaw, ModuleRefRaw, NestedClassRaw, ParamPtrRaw, ParamRaw, PropertyMapRaw,
    PropertyPtrRaw, PropertyRaw, StandAloneSigRaw, TypeDefRaw, TypeRefRaw, TypeSpecRaw,
};

/// One present table of the stream, whatever its row type.
#[allow(missing_docs)]
pub enum TableData<'a> {
    Module(MetadataTable<'a, ModuleRaw>),
    TypeRef(MetadataTable<'a, TypeRefRaw>),
    TypeDef(MetadataTable<'a, TypeDefRaw>),
    FieldPtr(MetadataTable<'a, FieldPtrRaw>),
    Field(MetadataTable<'a, FieldRaw>),
    MethodPtr(MetadataTable<'a, MethodPtrRaw>),
    MethodDef(MetadataTable<'a, MethodDefRaw>),
    ParamPtr(MetadataTable<'a, ParamPtrRaw>),
    Param(MetadataTable<'a, ParamRaw>),
    InterfaceImpl(MetadataTable<'a, InterfaceImplRaw>),
    MemberRef(MetadataTable<'a, MemberRefRaw>),
    Constant(MetadataTable<'a, ConstantRaw>),
    CustomAttribute(MetadataTable<'a, CustomAttributeRaw>),
    FieldMarshal(MetadataTable<'a, FieldMarshalRaw>),
    DeclSecurity(MetadataTable<'a, DeclSecurityRaw>),
    ClassLayout(MetadataTable<'a, ClassLayoutRaw>),
    FieldLayout(MetadataTable<'a, FieldLayoutRaw>),
    StandAloneSig(MetadataTable<'a, StandAloneSigRaw>),
    EventMap(MetadataTable<'a, EventMapRaw>),
    EventPtr(MetadataTable<'a, EventPtrRaw>),
    Event(MetadataTable<'a, EventRaw>),
    PropertyMap(MetadataTable<'a, PropertyMapRaw>),
    PropertyPtr(MetadataTable<'a, PropertyPtrRaw>),
    Property(MetadataTable<'a, PropertyRaw>),
    MethodSemantics(MetadataTable<'a, MethodSemanticsRaw>),
    MethodImpl(MetadataTable<'a, MethodImplRaw>),
    ModuleRef(MetadataTable<'a, ModuleRefRaw>),
    TypeSpec(MetadataTable<'a, TypeSpecRaw>),
    ImplMap(MetadataTable<'a, ImplMapRaw>),
    FieldRVA(MetadataTable<'a, FieldRvaRaw>),
    EncLog(MetadataTable<'a, EncLogRaw>),
    EncMap(MetadataTable<'a, EncMapRaw>),
    Assembly(MetadataTable<'a, AssemblyRaw>),
    AssemblyProcessor(MetadataTable<'a, AssemblyProcessorRaw>),
    AssemblyOS(MetadataTable<'a, AssemblyOsRaw>),
    AssemblyRef(MetadataTable<'a, AssemblyRefRaw>),
    AssemblyRefProcessor(MetadataTable<'a, AssemblyRefProcessorRaw>),
    AssemblyRefOS(MetadataTable<'a, AssemblyRefOsRaw>),
    File(MetadataTable<'a, FileRaw>),
    ExportedType(MetadataTable<'a, ExportedTypeRaw>),
    ManifestResource(MetadataTable<'a, ManifestResourceRaw>),
    NestedClass(MetadataTable<'a, NestedClassRaw>),
    GenericParam(MetadataTable<'a, GenericParamRaw>),
    MethodSpec(MetadataTable<'a, MethodSpecRaw>),
    GenericParamConstraint(MetadataTable<'a, GenericParamConstraintRaw>),
}

impl TableData<'_> {
    /// Number of rows of the wrapped table.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        macro_rules! rows {
            ($($variant:ident),*) => {
                match self {
                    $(TableData::$variant(table) => table.row_count(),)*
                }
            };
        }

        rows!(
            Module, TypeRef, TypeDef, FieldPtr, Field, MethodPtr, MethodDef, ParamPtr, Param,
            InterfaceImpl, MemberRef, Constant, CustomAttribute, FieldMarshal, DeclSecurity,
            ClassLayout, FieldLayout, StandAloneSig, EventMap, EventPtr, Event, PropertyMap,
            PropertyPtr, Property, MethodSemantics, MethodImpl, ModuleRef, TypeSpec, ImplMap,
            FieldRVA, EncLog, EncMap, Assembly, AssemblyProcessor, AssemblyOS, AssemblyRef,
            AssemblyRefProcessor, AssemblyRefOS, File, ExportedType, ManifestResource,
            NestedClass, GenericParam, MethodSpec, GenericParamConstraint
        )
    }
}

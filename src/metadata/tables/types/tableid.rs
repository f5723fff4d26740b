use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identifier of every table the `#~` / `#-` stream can contain (ECMA-335 II.22).
///
/// The discriminant is the table number, which is also the high byte of a metadata token
/// and the bit position in the `Valid` and `Sorted` masks of the tables header. Row counts
/// and row data appear in the stream in ascending order of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TableId {
    /// `Module` (0x00) - the single row describing this module
    Module = 0x00,
    /// `TypeRef` (0x01) - references to types in other modules or assemblies
    TypeRef = 0x01,
    /// `TypeDef` (0x02) - types defined in this module
    TypeDef = 0x02,
    /// `FieldPtr` (0x03) - indirection for `TypeDef.FieldList` in uncompressed streams
    FieldPtr = 0x03,
    /// `Field` (0x04) - field definitions
    Field = 0x04,
    /// `MethodPtr` (0x05) - indirection for `TypeDef.MethodList` in uncompressed streams
    MethodPtr = 0x05,
    /// `MethodDef` (0x06) - method definitions
    MethodDef = 0x06,
    /// `ParamPtr` (0x07) - indirection for `MethodDef.ParamList` in uncompressed streams
    ParamPtr = 0x07,
    /// `Param` (0x08) - parameter definitions
    Param = 0x08,
    /// `InterfaceImpl` (0x09) - interfaces implemented by a type
    InterfaceImpl = 0x09,
    /// `MemberRef` (0x0A) - references to fields and methods of other types
    MemberRef = 0x0A,
    /// `Constant` (0x0B) - default values of fields, parameters and properties
    Constant = 0x0B,
    /// `CustomAttribute` (0x0C) - custom attribute applications
    CustomAttribute = 0x0C,
    /// `FieldMarshal` (0x0D) - marshalling descriptors
    FieldMarshal = 0x0D,
    /// `DeclSecurity` (0x0E) - declarative security
    DeclSecurity = 0x0E,
    /// `ClassLayout` (0x0F) - explicit packing and size of types
    ClassLayout = 0x0F,
    /// `FieldLayout` (0x10) - explicit field offsets
    FieldLayout = 0x10,
    /// `StandAloneSig` (0x11) - signatures not attached to a member
    StandAloneSig = 0x11,
    /// `EventMap` (0x12) - maps a type to its range of events
    EventMap = 0x12,
    /// `EventPtr` (0x13) - indirection for `EventMap.EventList`
    EventPtr = 0x13,
    /// `Event` (0x14) - event definitions
    Event = 0x14,
    /// `PropertyMap` (0x15) - maps a type to its range of properties
    PropertyMap = 0x15,
    /// `PropertyPtr` (0x16) - indirection for `PropertyMap.PropertyList`
    PropertyPtr = 0x16,
    /// `Property` (0x17) - property definitions
    Property = 0x17,
    /// `MethodSemantics` (0x18) - links properties and events to their accessors
    MethodSemantics = 0x18,
    /// `MethodImpl` (0x19) - explicit method overrides
    MethodImpl = 0x19,
    /// `ModuleRef` (0x1A) - references to other modules
    ModuleRef = 0x1A,
    /// `TypeSpec` (0x1B) - constructed types described by a signature blob
    TypeSpec = 0x1B,
    /// `ImplMap` (0x1C) - P/Invoke information
    ImplMap = 0x1C,
    /// `FieldRVA` (0x1D) - initial data of fields
    FieldRVA = 0x1D,
    /// `EncLog` (0x1E) - edit-and-continue log
    EncLog = 0x1E,
    /// `EncMap` (0x1F) - edit-and-continue token map
    EncMap = 0x1F,
    /// `Assembly` (0x20) - the assembly manifest
    Assembly = 0x20,
    /// `AssemblyProcessor` (0x21) - unused
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` (0x22) - unused
    AssemblyOS = 0x22,
    /// `AssemblyRef` (0x23) - references to other assemblies
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` (0x24) - unused
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` (0x25) - unused
    AssemblyRefOS = 0x25,
    /// `File` (0x26) - other files of a multi-file assembly
    File = 0x26,
    /// `ExportedType` (0x27) - types exported or forwarded by this assembly
    ExportedType = 0x27,
    /// `ManifestResource` (0x28) - managed resources
    ManifestResource = 0x28,
    /// `NestedClass` (0x29) - nesting relationship between types
    NestedClass = 0x29,
    /// `GenericParam` (0x2A) - generic parameters of types and methods
    GenericParam = 0x2A,
    /// `MethodSpec` (0x2B) - generic method instantiations
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` (0x2C) - constraints of generic parameters
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// The table with the given number, if it is one this crate knows.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TableId> {
        TableId::iter().find(|id| *id as u8 == value)
    }

    /// The token carrying `row` in this table.
    #[must_use]
    pub fn token_base(self) -> u32 {
        u32::from(self as u8) << 24
    }

    /// Mask bit of this table in the `Valid` / `Sorted` vectors.
    #[must_use]
    pub fn mask(self) -> u64 {
        1_u64 << (self as u8)
    }
}

/// Number of distinct table ids.
pub const TABLE_COUNT: usize = TableId::COUNT;

//! One physical module: its bytes and the decoded views over them.
//!
//! [`ModuleFile`] owns a [`File`] and keeps the metadata root, the table stream and the four
//! heaps as views borrowing from it. The views are created once while loading; rows, names and
//! blobs are decoded from them on demand.
//!
//! Heap accessors follow the null conventions of the format: string index 0 is the empty
//! string, blob index 0 the empty blob and GUID index 0 no GUID, whether or not the heap is
//! present.

use std::path::Path;

use ouroboros::self_referencing;

use crate::{
    file::File,
    metadata::{
        identity::is_core_library_name,
        root::Root,
        streams::{Blob, Guid, Strings, TablesHeader, UserStrings},
        tables::{
            AssemblyRaw, AssemblyRefRaw, CodedIndexType, MetadataTable, ModuleRaw, RowReadable,
            TableAccess, TableId, TypeAttributes, TypeDefRaw, TypeRefRaw,
        },
        token::Token,
        typesystem::TypeDefinitionKind,
    },
    Result,
};

/// The decoded views of a [`ModuleFile`], borrowing from its bytes.
pub struct ModuleFileData<'a> {
    /// Metadata root and stream directory
    pub root: Root,
    /// The `#~` (or uncompressed `#-`) table stream
    pub tables: TablesHeader<'a>,
    /// `#Strings` heap
    pub strings: Option<Strings<'a>>,
    /// `#Blob` heap
    pub blobs: Option<Blob<'a>>,
    /// `#GUID` heap
    pub guids: Option<Guid<'a>>,
    /// `#US` heap
    pub userstrings: Option<UserStrings<'a>>,
}

impl<'a> ModuleFileData<'a> {
    fn new(file: &'a File) -> Result<ModuleFileData<'a>> {
        let metadata = file.metadata();
        let root = Root::read(metadata)?;

        let stream = |name: &str| {
            root.stream(name).map(|header| {
                let start = header.offset as usize;
                // Stream ranges were validated against the metadata size by Root::read
                &metadata[start..start + header.size as usize]
            })
        };

        let Some(table_stream) = stream("#~").or_else(|| stream("#-")) else {
            return Err(malformed_error!("No table stream (#~ or #-) present"));
        };

        let tables = TablesHeader::from(table_stream)?;
        let strings = stream("#Strings").map(Strings::from).transpose()?;
        let blobs = stream("#Blob").map(Blob::from).transpose()?;
        let guids = stream("#GUID").map(Guid::from).transpose()?;
        let userstrings = stream("#US").map(UserStrings::from).transpose()?;

        Ok(ModuleFileData {
            root,
            tables,
            strings,
            blobs,
            guids,
            userstrings,
        })
    }
}

#[self_referencing]
/// A loaded module: the input bytes plus the metadata views over them.
///
/// `ModuleFile` is what an [`crate::AssemblyResolver`] hands back to the load context. It is
/// `Send + Sync` and immutable once created.
///
/// # Examples
///
/// ```rust,no_run
/// use dotmeta::ModuleFile;
/// use std::path::Path;
///
/// let module = ModuleFile::from_file(Path::new("tests/samples/Library.dll"))?;
/// println!("{} types", module.tables().table_row_count(dotmeta::metadata::tables::TableId::TypeDef));
/// # Ok::<(), dotmeta::Error>(())
/// ```
pub struct ModuleFile {
    file: File,

    #[borrows(file)]
    #[covariant]
    data: ModuleFileData<'this>,
}

impl ModuleFile {
    /// Load a module from disk (PE image or bare metadata).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its metadata is malformed.
    pub fn from_file(path: &Path) -> Result<ModuleFile> {
        Self::from(File::from_file(path)?)
    }

    /// Load a module from a buffer (PE image or bare metadata).
    ///
    /// # Errors
    /// Returns an error if the metadata is malformed.
    pub fn from_mem(data: Vec<u8>) -> Result<ModuleFile> {
        Self::from(File::from_mem(data)?)
    }

    /// Decode the metadata views of an already loaded [`File`].
    ///
    /// # Errors
    /// Returns an error if the metadata root, the table stream or a heap is malformed.
    pub fn from(file: File) -> Result<ModuleFile> {
        ModuleFile::try_new(file, |file| ModuleFileData::new(file))
    }

    /// The underlying input.
    #[must_use]
    pub fn file(&self) -> &File {
        self.borrow_file()
    }

    /// The metadata root.
    #[must_use]
    pub fn root(&self) -> &Root {
        &self.borrow_data().root
    }

    /// The table stream.
    #[must_use]
    pub fn tables(&self) -> &TablesHeader<'_> {
        &self.borrow_data().tables
    }

    /// The `#Strings` heap, if present.
    #[must_use]
    pub fn strings(&self) -> Option<&Strings<'_>> {
        self.borrow_data().strings.as_ref()
    }

    /// The `#Blob` heap, if present.
    #[must_use]
    pub fn blobs(&self) -> Option<&Blob<'_>> {
        self.borrow_data().blobs.as_ref()
    }

    /// The `#GUID` heap, if present.
    #[must_use]
    pub fn guids(&self) -> Option<&Guid<'_>> {
        self.borrow_data().guids.as_ref()
    }

    /// The `#US` heap, if present.
    #[must_use]
    pub fn userstrings(&self) -> Option<&UserStrings<'_>> {
        self.borrow_data().userstrings.as_ref()
    }

    /// The table of row type `T`, if present.
    #[must_use]
    pub fn table<'s, T: RowReadable + 's>(&'s self) -> Option<&'s MetadataTable<'s, T>>
    where
        TablesHeader<'s>: TableAccess<'s, T>,
    {
        self.tables().table::<T>()
    }

    /// Row `rid` of table `T`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the table is absent or the row does not exist.
    pub fn row<'s, T: RowReadable + 's>(&'s self, rid: u32) -> Result<T>
    where
        TablesHeader<'s>: TableAccess<'s, T>,
    {
        match self.table::<T>() {
            Some(table) => table.get(rid),
            None => Err(malformed_error!(
                "Row {} requested from absent table {:?}",
                rid,
                T::TABLE
            )),
        }
    }

    /// Resolve a `#Strings` index; 0 is the empty string.
    ///
    /// # Errors
    /// Returns an error for an index past the heap or invalid string data.
    pub fn string(&self, index: u32) -> Result<&str> {
        match (self.strings(), index) {
            (_, 0) => Ok(""),
            (Some(strings), index) => strings.get(index as usize),
            (None, index) => Err(malformed_error!(
                "String index {} without a #Strings heap",
                index
            )),
        }
    }

    /// Resolve a `#Blob` index; 0 is the empty blob.
    ///
    /// # Errors
    /// Returns an error for an index or length past the heap.
    pub fn blob(&self, index: u32) -> Result<&[u8]> {
        match (self.blobs(), index) {
            (_, 0) => Ok(&[]),
            (Some(blobs), index) => blobs.get(index as usize),
            (None, index) => Err(malformed_error!("Blob index {} without a #Blob heap", index)),
        }
    }

    /// Resolve a 1-based `#GUID` index; 0 is no GUID.
    ///
    /// # Errors
    /// Returns an error for an index past the heap.
    pub fn guid(&self, index: u32) -> Result<Option<uguid::Guid>> {
        match (self.guids(), index) {
            (_, 0) => Ok(None),
            (Some(guids), index) => guids.get(index as usize).map(Some),
            (None, index) => Err(malformed_error!("GUID index {} without a #GUID heap", index)),
        }
    }

    /// Resolve a `#US` index into a Rust string (lossy for unpaired surrogates).
    ///
    /// # Errors
    /// Returns an error for an index past the heap.
    pub fn user_string(&self, index: u32) -> Result<String> {
        match self.userstrings() {
            Some(userstrings) => Ok(userstrings.get(index as usize)?.to_string_lossy()),
            None if index == 0 => Ok(String::new()),
            None => Err(malformed_error!("User string index {} without a #US heap", index)),
        }
    }

    /// Name of the module, from its `Module` row.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the `Module` table is empty.
    pub fn module_name(&self) -> Result<&str> {
        let row = self.row::<ModuleRaw>(1)?;
        self.string(row.name)
    }

    /// The `Assembly` row, absent for modules that are not an assembly manifest.
    ///
    /// # Errors
    /// Returns an error if the row fails to decode.
    pub fn assembly_row(&self) -> Result<Option<AssemblyRaw>> {
        match self.table::<AssemblyRaw>() {
            Some(table) if table.row_count() > 0 => table.get(1).map(Some),
            _ => Ok(None),
        }
    }

    /// Namespace and name of a `TypeDef`, `TypeRef` or `TypeSpec` token, without building any
    /// type entity. `TypeSpec` tokens and nested `TypeRef`s have no namespace of their own and
    /// yield `None`. The flag says whether the name lives in the core library, given whether
    /// this module is it.
    fn physical_type_name(
        &self,
        token: Token,
        is_core_library: bool,
    ) -> Result<Option<(&str, &str, bool)>> {
        match token.table_id() {
            Some(TableId::TypeDef) => {
                let row = self.row::<TypeDefRaw>(token.row())?;
                Ok(Some((
                    self.string(row.type_namespace)?,
                    self.string(row.type_name)?,
                    is_core_library,
                )))
            }
            Some(TableId::TypeRef) => {
                let row = self.row::<TypeRefRaw>(token.row())?;
                let in_core = match row.resolution_scope.tag {
                    _ if row.resolution_scope.is_null() => is_core_library,
                    TableId::Module | TableId::ModuleRef => is_core_library,
                    TableId::AssemblyRef => {
                        let scope = self.row::<AssemblyRefRaw>(row.resolution_scope.row)?;
                        is_core_library_name(self.string(scope.name)?)
                    }
                    // Nested in another TypeRef
                    _ => return Ok(None),
                };
                Ok(Some((
                    self.string(row.type_namespace)?,
                    self.string(row.type_name)?,
                    in_core,
                )))
            }
            Some(TableId::TypeSpec) => Ok(None),
            _ => Err(malformed_error!(
                "Token {} is not a {:?}",
                token,
                CodedIndexType::TypeDefOrRef
            )),
        }
    }

    /// Classify a `TypeDef` row from physical facts only: its flags, its own name and the
    /// name of its base type.
    ///
    /// Interfaces carry a flag. Enums, structs and delegates derive from `System.Enum`,
    /// `System.ValueType` and `System.MulticastDelegate` of the core library; `System.Enum`
    /// itself derives from `System.ValueType` but is a class.
    ///
    /// # Errors
    /// Returns an error if the row or a name it references fails to decode.
    pub fn type_definition_kind(
        &self,
        row: &TypeDefRaw,
        is_core_library: bool,
    ) -> Result<TypeDefinitionKind> {
        if row.flags & TypeAttributes::INTERFACE != 0 {
            return Ok(TypeDefinitionKind::Interface);
        }

        if row.extends.is_null() {
            return Ok(TypeDefinitionKind::Class);
        }

        let Some((namespace, name, in_core)) =
            self.physical_type_name(row.extends.token, is_core_library)?
        else {
            return Ok(TypeDefinitionKind::Class);
        };

        if !in_core || namespace != "System" {
            return Ok(TypeDefinitionKind::Class);
        }

        let is_system_enum = is_core_library
            && self.string(row.type_namespace)? == "System"
            && self.string(row.type_name)? == "Enum";

        Ok(match name {
            "Enum" => TypeDefinitionKind::Enum,
            "ValueType" if !is_system_enum => TypeDefinitionKind::Struct,
            "MulticastDelegate" => TypeDefinitionKind::Delegate,
            _ => TypeDefinitionKind::Class,
        })
    }
}

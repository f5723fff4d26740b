//! A loaded assembly and the resolution of everything its tokens name.
//!
//! [`Assembly`] is the owner of all logical entities decoded from one [`ModuleFile`]. Type
//! definitions live in an arena indexed by `TypeDef` row and are created on first access;
//! members, generic parameters and attributes are owned by the type that declares them.
//! Everything else is referenced through [`EntityRef`], so dropping the
//! [`crate::AssemblyLoadContext`] frees the whole graph.
//!
//! The assembly also implements the resolution steps shared by all entities:
//!
//! - `TypeDef`, `TypeRef` and `TypeSpec` tokens to [`TypeNode`]s, following `AssemblyRef`
//!   scopes into other assemblies of the load context
//! - full type names to [`TypeDefinition`]s, following `ExportedType` forwarders
//! - `MethodDef` and `MemberRef` tokens to [`crate::metadata::members::Method`]s
//! - owner tokens to their attributes and constants
//!
//! # Example
//!
//! ```rust,no_run
//! use dotmeta::prelude::*;
//!
//! let context = AssemblyLoadContext::new(|identity: &AssemblyIdentity, _: AssemblyFlags| {
//!     ModuleFile::from_file(format!("refs/{}.dll", identity.name).as_ref())
//! });
//! let assembly = context.load_file("tests/samples/Library.dll".as_ref())?;
//!
//! println!("{}", assembly.identity());
//! for reference in assembly.references()? {
//!     println!("  -> {reference}");
//! }
//! for definition in assembly.types()? {
//!     println!("  {:?} {}", definition.kind(), definition.full_name());
//! }
//! # Ok::<(), dotmeta::Error>(())
//! ```

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Weak},
};

use strum::EnumCount;

use crate::{
    metadata::{
        identity::{is_core_library_name, AssemblyFlags, AssemblyIdentity, AssemblyVersion},
        loader::ContextInner,
        members::{Attribute, Constant, Member, MethodRc},
        modulefile::ModuleFile,
        signatures::{read_method_def, read_type_spec, TypeSignature},
        streams::ChildList,
        tables::{
            AssemblyRefRaw, CodedIndex, ConstantRaw, CustomAttributeRaw, ExportedTypeRaw,
            MemberRefRaw, NestedClassRaw, TableId, TypeDefRaw, TypeRefRaw, TypeSpecRaw,
        },
        token::Token,
        typesystem::{
            BoundType, Definition, EntityRef, GenericContext, GenericParamKind, PrimitiveKind,
            TypeDefinition, TypeNode,
        },
    },
    utils::Memo,
    Error, Result,
};

/// Forwarders followed before a type name lookup gives up.
const MAX_FORWARDING_HOPS: usize = 16;
/// Nesting depth of signatures resolved into type nodes.
const MAX_TYPE_DEPTH: usize = 64;

/// Nesting relations from the `NestedClass` table, by `TypeDef` row.
#[derive(Default)]
struct NestingIndex {
    enclosing: HashMap<u32, u32>,
    nested: HashMap<u32, Vec<u32>>,
}

/// A loaded assembly: one manifest module and the entities decoded from it.
pub struct Assembly {
    self_ref: Weak<Assembly>,
    context: Weak<ContextInner>,
    module: ModuleFile,
    identity: AssemblyIdentity,
    flags: AssemblyFlags,
    is_core_library: bool,
    types: Vec<Memo<TypeDefinition>>,
    type_refs: Vec<Memo<TypeDefinition>>,
    member_refs: Vec<Memo<MethodRc>>,
    references: Vec<Memo<EntityRef<Assembly>>>,
    primitives: Vec<Memo<TypeNode>>,
    nesting: Memo<NestingIndex>,
    names: Memo<HashMap<String, u32>>,
    method_owners: Memo<Vec<u32>>,
    core_library: Memo<EntityRef<Assembly>>,
    attributes: Memo<Vec<Attribute>>,
}

fn memos<T>(count: u32) -> Vec<Memo<T>> {
    (0..count).map(|_| Memo::new()).collect()
}

impl Assembly {
    /// Take ownership of `module` as a member of the load context `context`.
    ///
    /// Only the identity is decoded here; every entity is materialized on demand.
    ///
    /// # Errors
    /// Returns an error if the `Assembly` or `Module` row is malformed.
    pub(crate) fn load(module: ModuleFile, context: Weak<ContextInner>) -> Result<Arc<Assembly>> {
        let (identity, flags) = match module.assembly_row()? {
            Some(row) => (
                AssemblyIdentity::from_assembly(
                    &row,
                    module.string(row.name)?,
                    module.string(row.culture)?,
                    module.blob(row.public_key)?,
                )?,
                AssemblyFlags::from_bits_truncate(row.flags),
            ),
            None => {
                // A module without manifest is named after its file
                let name = module.module_name()?;
                let name = name
                    .strip_suffix(".netmodule")
                    .or_else(|| name.strip_suffix(".dll"))
                    .unwrap_or(name);
                (
                    AssemblyIdentity::new(name, AssemblyVersion::default()),
                    AssemblyFlags::empty(),
                )
            }
        };

        let tables = module.tables();
        let types = memos(tables.table_row_count(TableId::TypeDef));
        let type_refs = memos(tables.table_row_count(TableId::TypeRef));
        let member_refs = memos(tables.table_row_count(TableId::MemberRef));
        let references = memos(tables.table_row_count(TableId::AssemblyRef));
        let is_core_library = identity.is_core_library();

        log::debug!(
            "Loaded {} ({} types, {} references)",
            identity,
            types.len(),
            references.len()
        );

        Ok(Arc::new_cyclic(|self_ref| Assembly {
            self_ref: self_ref.clone(),
            context,
            module,
            identity,
            flags,
            is_core_library,
            types,
            type_refs,
            member_refs,
            references,
            primitives: memos(PrimitiveKind::COUNT as u32),
            nesting: Memo::new(),
            names: Memo::new(),
            method_owners: Memo::new(),
            core_library: Memo::new(),
            attributes: Memo::new(),
        }))
    }

    /// The module the assembly was loaded from.
    #[must_use]
    pub fn module(&self) -> &ModuleFile {
        &self.module
    }

    /// A non-owning handle to this assembly.
    #[must_use]
    pub fn entity_ref(&self) -> EntityRef<Assembly> {
        EntityRef::from_weak(self.self_ref.clone())
    }

    /// Name, version, culture and public key token.
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        &self.identity
    }

    /// Simple name of the assembly.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Version of the assembly.
    #[must_use]
    pub fn version(&self) -> AssemblyVersion {
        self.identity.version
    }

    /// `AssemblyFlags` of the manifest.
    #[must_use]
    pub fn flags(&self) -> AssemblyFlags {
        self.flags
    }

    /// Name of the manifest module, e.g. `System.Runtime.dll`.
    ///
    /// # Errors
    /// Returns an error if the `Module` row is missing or malformed.
    pub fn module_name(&self) -> Result<&str> {
        self.module.module_name()
    }

    /// Whether this is the core library, decided by name alone.
    #[must_use]
    pub fn is_core_library(&self) -> bool {
        self.is_core_library
    }

    /// The definition of `TypeDef` row `rid`.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for a row that does not exist or fails to decode.
    pub fn type_definition(&self, rid: u32) -> Result<TypeDefinition> {
        let Some(slot) = rid.checked_sub(1).and_then(|index| self.types.get(index as usize)) else {
            return Err(malformed_error!(
                "TypeDef row {} out of range - {} rows",
                rid,
                self.types.len()
            ));
        };

        slot.get_or_try_init(|| TypeDefinition::load(self, rid))
            .cloned()
    }

    /// All type definitions in table order, including `<Module>` and nested types.
    ///
    /// # Errors
    /// Returns an error if a row fails to decode.
    pub fn types(&self) -> Result<Vec<TypeDefinition>> {
        (1..=self.types.len() as u32)
            .map(|rid| self.type_definition(rid))
            .collect()
    }

    /// Find a type by full name: `Namespace.Name`, with nested types as `Outer/Inner`.
    ///
    /// Names not defined here are looked up through `ExportedType` forwarders in the assembly
    /// they point to.
    ///
    /// # Errors
    /// Returns an error if the name index cannot be built, a forwarded assembly cannot be
    /// loaded, or forwarders form a cycle ([`Error::ReferenceCycle`]).
    pub fn resolve_type_definition(&self, full_name: &str) -> Result<Option<TypeDefinition>> {
        self.resolve_type_definition_hops(full_name, 0)
    }

    fn resolve_type_definition_hops(
        &self,
        full_name: &str,
        hops: usize,
    ) -> Result<Option<TypeDefinition>> {
        if hops > MAX_FORWARDING_HOPS {
            return Err(Error::ReferenceCycle(format!(
                "{} forwarded more than {} times, last by {}",
                full_name, MAX_FORWARDING_HOPS, self.identity
            )));
        }

        if let Some(&rid) = self.names()?.get(full_name) {
            return self.type_definition(rid).map(Some);
        }

        let Some(table) = self.module.table::<ExportedTypeRaw>() else {
            return Ok(None);
        };

        for row in table.iter() {
            let row = row?;
            let (name, implementation) = self.exported_type_name(&row)?;
            if name != full_name {
                continue;
            }

            return match implementation.tag {
                TableId::AssemblyRef => {
                    log::debug!(
                        "{} forwards {} to AssemblyRef row {}",
                        self.identity.name,
                        full_name,
                        implementation.row
                    );
                    self.reference(implementation.row)?
                        .resolve_type_definition_hops(full_name, hops + 1)
                }
                _ => {
                    log::warn!(
                        "{} exports {} from another module of the assembly, which is not loaded",
                        self.identity.name,
                        full_name
                    );
                    Ok(None)
                }
            };
        }

        Ok(None)
    }

    /// Full name of an exported type, and the implementation of its outermost enclosing row.
    fn exported_type_name(&self, row: &ExportedTypeRaw) -> Result<(String, CodedIndex)> {
        let mut names = Vec::new();
        let mut current = row.clone();
        loop {
            let name = self.module.string(current.type_name)?;
            if current.implementation.tag != TableId::ExportedType {
                let namespace = self.module.string(current.type_namespace)?;
                names.push(qualify(namespace, name));
                names.reverse();
                return Ok((names.join("/"), current.implementation));
            }

            names.push(name.to_string());
            if names.len() > self.module.tables().table_row_count(TableId::ExportedType) as usize {
                return Err(malformed_error!(
                    "ExportedType row {} is nested in itself",
                    row.rid
                ));
            }
            current = self.module.row::<ExportedTypeRaw>(current.implementation.row)?;
        }
    }

    fn nesting(&self) -> Result<&NestingIndex> {
        self.nesting.get_or_try_init(|| {
            let mut index = NestingIndex::default();
            let Some(table) = self.module.table::<NestedClassRaw>() else {
                return Ok(index);
            };

            for row in table.iter() {
                let row = row?;
                if index
                    .enclosing
                    .insert(row.nested_class, row.enclosing_class)
                    .is_some()
                {
                    return Err(malformed_error!(
                        "TypeDef row {} is nested in more than one type",
                        row.nested_class
                    ));
                }
                index
                    .nested
                    .entry(row.enclosing_class)
                    .or_default()
                    .push(row.nested_class);
            }

            for children in index.nested.values_mut() {
                children.sort_unstable();
            }
            Ok(index)
        })
    }

    /// `TypeDef` row enclosing row `rid`, if it is nested.
    pub(crate) fn enclosing_type_rid(&self, rid: u32) -> Result<Option<u32>> {
        Ok(self.nesting()?.enclosing.get(&rid).copied())
    }

    /// `TypeDef` rows nested directly in row `rid`.
    pub(crate) fn nested_type_rids(&self, rid: u32) -> Result<Vec<u32>> {
        Ok(self.nesting()?.nested.get(&rid).cloned().unwrap_or_default())
    }

    /// Full name of `TypeDef` row `rid`, computed from rows alone.
    pub(crate) fn type_full_name(&self, rid: u32) -> Result<String> {
        let nesting = self.nesting()?;
        let mut names = Vec::new();
        let mut current = rid;
        loop {
            let row = self.module.row::<TypeDefRaw>(current)?;
            let name = self.module.string(row.type_name)?;
            match nesting.enclosing.get(&current) {
                Some(&outer) => {
                    names.push(name.to_string());
                    if names.len() > self.types.len() {
                        return Err(malformed_error!(
                            "NestedClass rows of TypeDef row {} form a cycle",
                            rid
                        ));
                    }
                    current = outer;
                }
                None => {
                    names.push(qualify(self.module.string(row.type_namespace)?, name));
                    names.reverse();
                    return Ok(names.join("/"));
                }
            }
        }
    }

    fn names(&self) -> Result<&HashMap<String, u32>> {
        self.names.get_or_try_init(|| {
            let mut names = HashMap::with_capacity(self.types.len());
            for rid in 1..=self.types.len() as u32 {
                names.entry(self.type_full_name(rid)?).or_insert(rid);
            }
            Ok(names)
        })
    }

    /// Resolve a `TypeDefOrRef` token to a type node; the null token resolves to `None`.
    ///
    /// A `TypeDef` or `TypeRef` naming a generic definition yields the open instantiation,
    /// bound to the definition's own parameters.
    ///
    /// # Errors
    /// Returns an error if the token is not a `TypeDefOrRef`, names a missing row, or refers
    /// to a type its scope does not define ([`Error::TypeNotFound`]).
    pub fn resolve_type_def_or_ref(
        &self,
        token: Token,
        context: &GenericContext,
    ) -> Result<Option<TypeNode>> {
        if token.is_null() || token.row() == 0 {
            return Ok(None);
        }

        match token.table_id() {
            Some(TableId::TypeDef) => {
                open_instantiation(&self.type_definition(token.row())?).map(Some)
            }
            Some(TableId::TypeRef) => {
                open_instantiation(&self.type_ref_definition(token.row())?).map(Some)
            }
            Some(TableId::TypeSpec) => {
                let row = self.module.row::<TypeSpecRaw>(token.row())?;
                let signature = read_type_spec(self.module.blob(row.signature)?)?;
                self.resolve_type(&signature.base, context).map(Some)
            }
            _ => Err(malformed_error!("Token {} is not a TypeDefOrRef", token)),
        }
    }

    /// The definition `TypeRef` row `rid` points to, in this or another assembly.
    fn type_ref_definition(&self, rid: u32) -> Result<TypeDefinition> {
        let Some(slot) = rid.checked_sub(1).and_then(|index| self.type_refs.get(index as usize))
        else {
            return Err(malformed_error!("TypeRef row {} out of range", rid));
        };

        slot.get_or_try_init(|| {
            let row = self.module.row::<TypeRefRaw>(rid)?;
            let name = self.module.string(row.type_name)?;
            let namespace = self.module.string(row.type_namespace)?;
            let scope = row.resolution_scope;

            if !scope.is_null() && scope.tag == TableId::TypeRef {
                let outer = self.type_ref_definition(scope.row)?;
                return outer
                    .nested_types()?
                    .iter()
                    .find(|nested| nested.name() == name)
                    .cloned()
                    .ok_or_else(|| Error::TypeNotFound(format!("{}/{}", outer.full_name(), name)));
            }

            let full_name = qualify(namespace, name);
            let found = if !scope.is_null() && scope.tag == TableId::AssemblyRef {
                let target = self.reference(scope.row)?;
                log::trace!("Resolving {} in {}", full_name, target.identity.name);
                target.resolve_type_definition(&full_name)?
            } else {
                // Module and ModuleRef scopes, and the null scope of exported types
                self.resolve_type_definition(&full_name)?
            };

            found.ok_or(Error::TypeNotFound(full_name))
        })
        .cloned()
    }

    /// Resolve a signature type to a type node, with `VAR` and `MVAR` taken from `context`.
    ///
    /// Primitive types resolve to their definitions in the core library. Custom modifiers
    /// and `BYREF` are transparent; function pointers resolve to `void*`.
    ///
    /// # Errors
    /// Returns an error if a token cannot be resolved, a generic parameter is not in scope,
    /// an instantiation has the wrong arity, or no core library can be found.
    pub fn resolve_type(&self, signature: &TypeSignature, context: &GenericContext) -> Result<TypeNode> {
        self.resolve_type_at(signature, context, 0)
    }

    fn resolve_type_at(
        &self,
        signature: &TypeSignature,
        context: &GenericContext,
        depth: usize,
    ) -> Result<TypeNode> {
        if depth > MAX_TYPE_DEPTH {
            return Err(Error::RecursionLimit(MAX_TYPE_DEPTH));
        }

        if let Some(kind) = PrimitiveKind::from_signature(signature) {
            return self.primitive_type(kind);
        }

        let nested = |inner: &TypeSignature| self.resolve_type_at(inner, context, depth + 1);
        Ok(match signature {
            TypeSignature::Ptr(pointer) => match pointer.base.as_ref() {
                TypeSignature::Void => TypeNode::Pointer(None),
                base => TypeNode::Pointer(Some(Box::new(nested(base)?))),
            },
            TypeSignature::ByRef(inner) | TypeSignature::Modified(_, inner) => nested(&**inner)?,
            TypeSignature::Class(token) | TypeSignature::ValueType(token) => {
                match self.resolve_type_def_or_ref(*token, context)? {
                    Some(node) => node,
                    None => return Err(malformed_error!("Null type token in signature")),
                }
            }
            TypeSignature::GenericParamType(number) => {
                context.param(GenericParamKind::Type, *number)?
            }
            TypeSignature::GenericParamMethod(number) => {
                context.param(GenericParamKind::Method, *number)?
            }
            TypeSignature::SzArray(array) => TypeNode::Array(Box::new(nested(&*array.base)?)),
            TypeSignature::Array(array) => TypeNode::MdArray {
                element: Box::new(nested(&*array.base)?),
                rank: array.rank,
            },
            TypeSignature::GenericInst(base, args) => {
                let Some(definition) = nested(&**base)?.as_definition()? else {
                    return Err(malformed_error!(
                        "Generic instantiation of a type that is not a definition"
                    ));
                };
                let args = args.iter().map(nested).collect::<Result<Vec<_>>>()?;
                TypeNode::Bound(BoundType::new(&definition, args)?)
            }
            TypeSignature::FnPtr(_) => TypeNode::Pointer(None),
            other => {
                return Err(malformed_error!(
                    "Signature type {:?} cannot be resolved",
                    other
                ))
            }
        })
    }

    /// The node of a primitive type, defined by the core library.
    ///
    /// # Errors
    /// Returns [`Error::AssemblyNotFound`] if there is no core library, or
    /// [`Error::TypeNotFound`] if it does not define the type.
    pub fn primitive_type(&self, kind: PrimitiveKind) -> Result<TypeNode> {
        let Some(slot) = self.primitives.get(kind as usize) else {
            return Err(malformed_error!("No slot for primitive {:?}", kind));
        };

        slot.get_or_try_init(|| {
            let core = self.core_library()?;
            let full_name = kind.full_name();
            match core.resolve_type_definition(&full_name)? {
                Some(definition) => Ok(TypeNode::Bound(BoundType::new(&definition, Vec::new())?)),
                None => Err(Error::TypeNotFound(format!(
                    "{}, {}",
                    full_name, core.identity.name
                ))),
            }
        })
        .cloned()
    }

    /// The generic parameters in scope inside `owner`, a `TypeDef` or `MethodDef` token.
    /// Any other owner has none.
    ///
    /// # Errors
    /// Returns an error if the owner or its parameters cannot be loaded.
    pub fn generic_context(&self, owner: Token) -> Result<GenericContext> {
        match owner.table_id() {
            Some(TableId::TypeDef) => self.type_definition(owner.row())?.generic_context(),
            Some(TableId::MethodDef) => self.method(owner.row())?.generic_context(),
            _ => Ok(GenericContext::default()),
        }
    }

    fn method_owners(&self) -> Result<&[u32]> {
        self.method_owners
            .get_or_try_init(|| {
                let tables = self.module.tables();
                let mut owners = vec![0; tables.table_row_count(TableId::MethodDef) as usize];
                for type_rid in 1..=self.types.len() as u32 {
                    for method_rid in tables.children(ChildList::Methods, type_rid)? {
                        if let Some(owner) = method_rid
                            .checked_sub(1)
                            .and_then(|index| owners.get_mut(index as usize))
                        {
                            *owner = type_rid;
                        }
                    }
                }
                Ok(owners)
            })
            .map(Vec::as_slice)
    }

    /// The method of `MethodDef` row `rid`, as owned by its declaring type.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for a row outside every type's method list.
    pub fn method(&self, rid: u32) -> Result<MethodRc> {
        let owners = self.method_owners()?;
        let owner = rid
            .checked_sub(1)
            .and_then(|index| owners.get(index as usize))
            .copied()
            .filter(|owner| *owner != 0);

        let Some(owner) = owner else {
            return Err(malformed_error!("MethodDef row {} belongs to no type", rid));
        };

        self.type_definition(owner)?
            .methods()?
            .iter()
            .find(|method| method.rid() == rid)
            .cloned()
            .ok_or_else(|| malformed_error!("MethodDef row {} missing from its type", rid))
    }

    /// The method a `MethodDef` or `MemberRef` token names.
    ///
    /// # Errors
    /// Returns an error if the token names no unique method.
    pub fn method_by_token(&self, token: Token) -> Result<MethodRc> {
        match token.table_id() {
            Some(TableId::MethodDef) => self.method(token.row()),
            Some(TableId::MemberRef) => {
                let rid = token.row();
                let Some(slot) = rid
                    .checked_sub(1)
                    .and_then(|index| self.member_refs.get(index as usize))
                else {
                    return Err(malformed_error!("MemberRef row {} out of range", rid));
                };
                slot.get_or_try_init(|| self.member_ref_method(rid)).cloned()
            }
            _ => Err(malformed_error!("Token {} does not name a method", token)),
        }
    }

    fn member_ref_parent(&self, parent: CodedIndex) -> Result<TypeDefinition> {
        let token = match parent.tag {
            TableId::TypeDef | TableId::TypeRef => parent.token,
            TableId::TypeSpec => {
                let row = self.module.row::<TypeSpecRaw>(parent.row)?;
                let signature = read_type_spec(self.module.blob(row.signature)?)?;
                let base = match signature.base {
                    TypeSignature::GenericInst(base, _) => *base,
                    other => other,
                };
                match base {
                    TypeSignature::Class(token) | TypeSignature::ValueType(token) => token,
                    // Methods of array types are provided by the runtime
                    _ => return Err(Error::NotSupported),
                }
            }
            _ => return Err(Error::NotSupported),
        };

        match token.table_id() {
            Some(TableId::TypeDef) => self.type_definition(token.row()),
            Some(TableId::TypeRef) => self.type_ref_definition(token.row()),
            _ => Err(malformed_error!("MemberRef parent {} is not a named type", token)),
        }
    }

    fn member_ref_method(&self, rid: u32) -> Result<MethodRc> {
        let row = self.module.row::<MemberRefRaw>(rid)?;
        if row.class.tag == TableId::MethodDef {
            return self.method(row.class.row);
        }

        let name = self.module.string(row.name)?;
        let signature = read_method_def(self.module.blob(row.signature)?)?;
        let parent = self.member_ref_parent(row.class)?;

        let mut candidates = Vec::new();
        for method in parent.methods()? {
            if method.name() == name
                && method.generic_arity()? == signature.generic_param_count as usize
                && method.arity()? == signature.params.len()
                && method.signature()?.has_this == signature.has_this
            {
                candidates.push(method);
            }
        }

        if candidates.len() > 1 {
            let mut matching = Vec::new();
            for method in candidates {
                let context = method.generic_context()?;
                let mut same = *method.return_type()?
                    == self.resolve_type(&signature.return_type.base, &context)?;
                for (param, expected) in method.params()?.iter().zip(&signature.params) {
                    same = same
                        && param.is_by_ref() == expected.by_ref
                        && *param.param_type() == self.resolve_type(&expected.base, &context)?;
                }
                if same {
                    matching.push(method);
                }
            }
            candidates = matching;
        }

        match candidates.as_slice() {
            [method] => Ok(Arc::clone(*method)),
            [] => Err(malformed_error!(
                "MemberRef row {} names {}::{} which does not exist",
                rid,
                parent.full_name(),
                name
            )),
            _ => Err(malformed_error!(
                "MemberRef row {} matches several overloads of {}::{}",
                rid,
                parent.full_name(),
                name
            )),
        }
    }

    /// Custom attributes applied to the entity `owner`.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes_of(&self, owner: Token) -> Result<Vec<Attribute>> {
        let Some(table) = self.module.table::<CustomAttributeRaw>() else {
            return Ok(Vec::new());
        };

        table
            .find_all(owner)?
            .iter()
            .map(|row| Attribute::load(self, row))
            .collect()
    }

    /// The `Constant` row of `owner`, decoded.
    ///
    /// # Errors
    /// Returns an error if the row or its value blob is malformed.
    pub fn constant_of(&self, owner: Token) -> Result<Option<Constant>> {
        let Some(table) = self.module.table::<ConstantRaw>() else {
            return Ok(None);
        };

        match table.find_any(owner)? {
            Some(row) => Constant::decode(row.base, self.module.blob(row.value)?).map(Some),
            None => Ok(None),
        }
    }

    /// Custom attributes applied to the assembly itself.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes(&self) -> Result<&[Attribute]> {
        self.attributes
            .get_or_try_init(|| match self.module.assembly_row()? {
                Some(row) => self.attributes_of(row.token),
                None => Ok(Vec::new()),
            })
            .map(Vec::as_slice)
    }

    /// Identity named by `AssemblyRef` row `rid`.
    ///
    /// # Errors
    /// Returns an error if the row or its public key blob is malformed.
    pub fn reference_identity(&self, rid: u32) -> Result<(AssemblyIdentity, AssemblyFlags)> {
        let row = self.module.row::<AssemblyRefRaw>(rid)?;
        let identity = AssemblyIdentity::from_assembly_ref(
            &row,
            self.module.string(row.name)?,
            self.module.string(row.culture)?,
            self.module.blob(row.public_key_or_token)?,
        )?;
        Ok((identity, AssemblyFlags::from_bits_truncate(row.flags)))
    }

    /// Identities of all referenced assemblies, in `AssemblyRef` order.
    ///
    /// # Errors
    /// Returns an error if a row is malformed.
    pub fn references(&self) -> Result<Vec<AssemblyIdentity>> {
        (1..=self.references.len() as u32)
            .map(|rid| self.reference_identity(rid).map(|(identity, _)| identity))
            .collect()
    }

    /// The assembly `AssemblyRef` row `rid` resolves to, loaded through the load context on
    /// first use.
    ///
    /// # Errors
    /// Returns [`Error::AssemblyNotFound`] if the resolver cannot provide it,
    /// [`Error::ReferenceCycle`] if it is still being resolved, or [`Error::EntityDropped`] if
    /// the load context is gone.
    pub fn reference(&self, rid: u32) -> Result<Arc<Assembly>> {
        let Some(slot) = rid
            .checked_sub(1)
            .and_then(|index| self.references.get(index as usize))
        else {
            return Err(malformed_error!("AssemblyRef row {} out of range", rid));
        };

        slot.get_or_try_init(|| {
            let (identity, flags) = self.reference_identity(rid)?;
            if identity == self.identity {
                return Ok(self.entity_ref());
            }

            let context = self.context.upgrade().ok_or(Error::EntityDropped)?;
            log::debug!("{} references {}", self.identity.name, identity);
            context.resolve(&identity, flags).map(|assembly| EntityRef::new(&assembly))
        })?
        .get()
    }

    /// The core library this assembly builds on: itself if it is one, else the first core
    /// library it references, else any core library loaded in the context.
    ///
    /// # Errors
    /// Returns [`Error::AssemblyNotFound`] if there is none.
    pub fn core_library(&self) -> Result<Arc<Assembly>> {
        self.core_library
            .get_or_try_init(|| {
                if self.is_core_library {
                    return Ok(self.entity_ref());
                }

                for rid in 1..=self.references.len() as u32 {
                    let row = self.module.row::<AssemblyRefRaw>(rid)?;
                    if is_core_library_name(self.module.string(row.name)?) {
                        return self.reference(rid).map(|core| EntityRef::new(&core));
                    }
                }

                let context = self.context.upgrade().ok_or(Error::EntityDropped)?;
                match context.core_library() {
                    Some(core) => Ok(EntityRef::new(&core)),
                    None => Err(Error::AssemblyNotFound {
                        identity: "mscorlib".to_string(),
                        reason: format!("{} references no core library", self.identity.name),
                    }),
                }
            })?
            .get()
    }

    /// Find a type by the name reflection uses in attribute blobs: `Namespace.Outer+Inner`,
    /// optionally followed by `, AssemblyName, Version=...`.
    ///
    /// Without an assembly part the name is looked up here and then in the core library.
    ///
    /// # Errors
    /// Returns [`Error::AssemblyNotFound`] if the named assembly is not referenced.
    pub fn resolve_reflection_name(&self, name: &str) -> Result<Option<TypeDefinition>> {
        let (type_name, assembly_name) = match name.split_once(',') {
            Some((type_name, rest)) => {
                let assembly_name = rest.split(',').next().unwrap_or("").trim();
                (type_name.trim(), Some(assembly_name))
            }
            None => (name.trim(), None),
        };
        let full_name = type_name.replace('+', "/");

        let Some(assembly_name) = assembly_name else {
            if let Some(found) = self.resolve_type_definition(&full_name)? {
                return Ok(Some(found));
            }
            return self.core_library()?.resolve_type_definition(&full_name);
        };

        if assembly_name.eq_ignore_ascii_case(&self.identity.name) {
            return self.resolve_type_definition(&full_name);
        }

        for rid in 1..=self.references.len() as u32 {
            let row = self.module.row::<AssemblyRefRaw>(rid)?;
            if self.module.string(row.name)?.eq_ignore_ascii_case(assembly_name) {
                return self.reference(rid)?.resolve_type_definition(&full_name);
            }
        }

        Err(Error::AssemblyNotFound {
            identity: assembly_name.to_string(),
            reason: format!("not referenced by {}", self.identity.name),
        })
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

fn open_instantiation(definition: &TypeDefinition) -> Result<TypeNode> {
    let args = definition
        .generic_params()?
        .iter()
        .map(TypeNode::generic_param)
        .collect();
    Ok(TypeNode::Bound(BoundType::new(definition, args)?))
}

impl fmt::Debug for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assembly")
            .field("identity", &self.identity)
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            loader::{no_resolver, AssemblyLoadContext, CoreLibraryFallback},
            members::{AttributeValue, MethodKind, NamedArgument, NamedArgumentKind, PropertyKind},
            typesystem::{MemberFilter, MethodFilter, TypeDefinitionKind, TypeLayout, Visibility},
        },
        test::{load, stub_core_library, MetadataBuilder},
    };

    const PUBLIC_CLASS: u32 = 0x0010_0001;

    fn type_def_token(rid: u32) -> Token {
        Token::new(0x0200_0000 | rid)
    }

    /// A builder with `<Module>` and a reference to `System.Object`, returned as second value.
    fn builder_with_object(name: &str) -> (MetadataBuilder, Token) {
        let mut builder = MetadataBuilder::new(name);
        let corlib = builder.assembly_ref("mscorlib", [4, 0, 0, 0]);
        let object = builder.type_ref_in_assembly(corlib, "System", "Object");
        builder.type_def(0, "", "<Module>", None);
        (builder, object)
    }

    #[test]
    fn generic_instantiation() {
        let (mut builder, object) = builder_with_object("Generics");
        let list = builder.type_def(PUBLIC_CLASS, "N", "List`1", Some(object));
        builder.generic_param(0, 0, type_def_token(list), "T");
        builder.field(0x0001, "items", &[0x06, 0x1D, 0x13, 0x00]);
        builder.method(0x0086, "Get", &[0x20, 0x01, 0x13, 0x00, 0x08]);
        let user = builder.type_def(PUBLIC_CLASS, "N", "User", Some(object));
        // List<int32>
        builder.field(0x0006, "ints", &[0x06, 0x15, 0x12, 0x08, 0x01, 0x08]);
        let (_context, assembly) = load(&builder);

        let int32 = assembly.primitive_type(PrimitiveKind::I4).unwrap();
        let user = assembly.type_definition(user).unwrap();
        let ints = user.find_field("ints", &MemberFilter::default()).unwrap().unwrap();
        let bound = ints.field_type().unwrap().as_bound().unwrap();
        assert_eq!(bound.to_string(), "N.List<System.Int32>");
        assert_eq!(bound.generic_args(), &[int32.clone()]);

        let list = bound.definition().unwrap();
        assert_eq!(list.generic_arity().unwrap(), 1);
        let items = list.find_field("items", &MemberFilter::default()).unwrap().unwrap();
        assert_eq!(items.field_type().unwrap().to_string(), "T[]");
        assert!(items.field_type().unwrap().is_parameterized());
        assert_eq!(
            bound.bind_member_type(items.field_type().unwrap()).unwrap(),
            TypeNode::Array(Box::new(int32.clone()))
        );

        let get = list.find_method("Get", &MethodFilter::default()).unwrap().unwrap();
        assert_eq!(bound.bind_member_type(get.return_type().unwrap()).unwrap(), int32);
        assert_eq!(get.params().unwrap()[0].param_type(), &int32);

        let open = assembly
            .resolve_type_def_or_ref(list.token(), &GenericContext::default())
            .unwrap()
            .unwrap();
        assert_eq!(open.to_string(), "N.List<T>");

        assert!(matches!(
            list.bind_node(Vec::new()),
            Err(Error::GenericArityMismatch { expected: 1, actual: 0 })
        ));
        assert!(matches!(
            items
                .field_type()
                .unwrap()
                .bind_generic_params(Some(&[int32.clone(), int32]), None),
            Err(Error::GenericArityMismatch { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn member_lookup() {
        let (mut builder, object) = builder_with_object("Lookup");
        let base = builder.type_def(PUBLIC_CLASS, "N", "Base", Some(object));
        builder.method(0x01C6, "Run", &[0x20, 0x00, 0x01]);
        builder.field(0x0006, "count", &[0x06, 0x08]);
        let derived = builder.type_def(PUBLIC_CLASS, "N", "Derived", Some(type_def_token(base)));
        builder.method(0x0086, "Over", &[0x20, 0x01, 0x01, 0x08]);
        let over_string = builder.method(0x0086, "Over", &[0x20, 0x01, 0x01, 0x0E]);
        builder.method(0x0096, "Create", &[0x00, 0x00, 0x01]);
        let by_ref = builder.member_ref(type_def_token(derived), "Over", &[0x20, 0x01, 0x01, 0x0E]);
        let (_context, assembly) = load(&builder);

        let base = assembly.type_definition(base).unwrap();
        let derived = assembly.type_definition(derived).unwrap();
        assert_eq!(derived.base().unwrap().unwrap().definition().unwrap(), base);

        assert!(derived.find_method("Run", &MethodFilter::default()).unwrap().is_none());
        let inherited = MethodFilter {
            inherited: true,
            ..MethodFilter::default()
        };
        let run = derived.find_method("Run", &inherited).unwrap().unwrap();
        assert_eq!(run.declaring_type().unwrap(), base);
        assert!(run.is_virtual());

        let field_filter = MemberFilter {
            inherited: true,
            ..MemberFilter::default()
        };
        assert!(derived.find_field("count", &field_filter).unwrap().is_some());

        // Two overloads on the same level are ambiguous without a discriminating filter
        assert!(derived.find_method("Over", &MethodFilter::default()).unwrap().is_none());
        let string = [assembly.primitive_type(PrimitiveKind::String).unwrap()];
        let filter = MethodFilter {
            param_types: Some(&string),
            ..MethodFilter::default()
        };
        assert_eq!(derived.find_method("Over", &filter).unwrap().unwrap().rid(), over_string);

        let instance = MethodFilter {
            is_static: Some(false),
            ..MethodFilter::default()
        };
        assert!(derived.find_method("Create", &instance).unwrap().is_none());
        let create = derived.find_method("Create", &MethodFilter::default()).unwrap().unwrap();
        assert_eq!(create.visibility().unwrap(), Visibility::Public);
        assert!(create.is_static().unwrap());

        assert_eq!(assembly.method_by_token(by_ref).unwrap().rid(), over_string);
        assert_eq!(assembly.method(over_string).unwrap().declaring_type().unwrap(), derived);
    }

    #[test]
    fn collections_are_decoded_once() {
        let (mut builder, object) = builder_with_object("Lazy");
        let rid = builder.type_def(PUBLIC_CLASS, "N", "C", Some(object));
        builder.field(0x0006, "a", &[0x06, 0x08]);
        builder.method(0x0086, "M", &[0x20, 0x00, 0x01]);
        let (_context, assembly) = load(&builder);
        let tables = assembly.module().tables();

        let definition = assembly.type_definition(rid).unwrap();
        let before = tables.rows_read();
        assert_eq!(definition.fields().unwrap().len(), 1);
        assert_eq!(definition.methods().unwrap().len(), 1);
        let after = tables.rows_read();
        assert!(after > before);

        assert_eq!(definition.fields().unwrap().len(), 1);
        assert_eq!(definition.methods().unwrap().len(), 1);
        assert_eq!(assembly.type_definition(rid).unwrap(), definition);
        assert_eq!(tables.rows_read(), after);
    }

    #[test]
    fn cyclic_inheritance() {
        let mut builder = MetadataBuilder::new("Cycle");
        builder.type_def(PUBLIC_CLASS, "N", "A", Some(type_def_token(2)));
        builder.type_def(PUBLIC_CLASS, "N", "B", Some(type_def_token(1)));
        let (_context, assembly) = load(&builder);

        let a = assembly.type_definition(1).unwrap();
        let inherited = MethodFilter {
            inherited: true,
            ..MethodFilter::default()
        };
        assert!(matches!(
            a.find_method("Missing", &inherited),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn nested_types_and_names() {
        let (mut builder, object) = builder_with_object("Nesting");
        let outer = builder.type_def(PUBLIC_CLASS, "N", "Outer", Some(object));
        let inner = builder.type_def(0x0010_0002, "", "Inner", Some(object));
        builder.nested(inner, outer);
        let outer_ref = builder.type_ref(Token::new(0x0000_0001), "N", "Outer");
        let inner_ref = builder.type_ref(outer_ref, "", "Inner");
        let gone = builder.type_ref(Token::new(0x0000_0001), "N", "Gone");
        let (_context, assembly) = load(&builder);

        let outer = assembly.type_definition(outer).unwrap();
        let inner = assembly.type_definition(inner).unwrap();
        assert_eq!(inner.full_name(), "N.Outer/Inner");
        assert_eq!(inner.namespace(), None);
        assert!(inner.is_nested());
        assert!(inner.is_public());
        assert_eq!(inner.enclosing_type().unwrap(), Some(outer.clone()));
        assert_eq!(outer.nested_types().unwrap(), &[inner.clone()]);

        assert_eq!(assembly.resolve_type_definition("N.Outer/Inner").unwrap(), Some(inner.clone()));
        assert_eq!(assembly.resolve_type_definition("N.Missing").unwrap(), None);
        assert_eq!(assembly.resolve_reflection_name("N.Outer+Inner").unwrap(), Some(inner.clone()));
        assert_eq!(
            assembly
                .resolve_reflection_name("System.String")
                .unwrap()
                .unwrap()
                .full_name(),
            "System.String"
        );
        assert!(matches!(
            assembly.resolve_reflection_name("N.X, Unknown, Version=1.0.0.0"),
            Err(Error::AssemblyNotFound { .. })
        ));

        let context = GenericContext::default();
        let node = assembly.resolve_type_def_or_ref(inner_ref, &context).unwrap().unwrap();
        assert_eq!(node.as_definition().unwrap(), Some(inner));
        assert!(matches!(
            assembly.resolve_type_def_or_ref(gone, &context),
            Err(Error::TypeNotFound(name)) if name == "N.Gone"
        ));
        assert_eq!(assembly.resolve_type_def_or_ref(Token::new(0x0100_0000), &context).unwrap(), None);
    }

    #[test]
    fn type_forwarding() {
        let mut target = MetadataBuilder::new("Impl");
        target.type_def(0, "", "<Module>", None);
        target.type_def(PUBLIC_CLASS, "N", "Moved", None);
        let target = target.build();

        let mut facade = MetadataBuilder::new("Facade");
        let impl_ref = facade.assembly_ref("Impl", [1, 0, 0, 0]);
        facade.exported_type(0x0020_0000, "N", "Moved", Token::new(0x2300_0000 | impl_ref));
        let facade = facade.build();

        let mut app = MetadataBuilder::new("App");
        let facade_ref = app.assembly_ref("Facade", [1, 0, 0, 0]);
        let moved = app.type_ref_in_assembly(facade_ref, "N", "Moved");

        let resolver = move |identity: &AssemblyIdentity, flags: AssemblyFlags| {
            match identity.name.as_str() {
                "Impl" => ModuleFile::from_mem(target.clone()),
                "Facade" => ModuleFile::from_mem(facade.clone()),
                _ => no_resolver(identity, flags),
            }
        };
        let context =
            AssemblyLoadContext::new(CoreLibraryFallback::from_mem(stub_core_library(), resolver));
        let app = context.load_mem(app.build()).unwrap();

        let node = app
            .resolve_type_def_or_ref(moved, &GenericContext::default())
            .unwrap()
            .unwrap();
        let definition = node.as_definition().unwrap().unwrap();
        assert_eq!(definition.full_name(), "N.Moved");
        assert_eq!(definition.assembly().unwrap().name(), "Impl");
        assert_eq!(context.assemblies().len(), 3);
    }

    #[test]
    fn forwarding_cycle() {
        let forwarder = |name: &str, other: &str| {
            let mut builder = MetadataBuilder::new(name);
            let other = builder.assembly_ref(other, [1, 0, 0, 0]);
            builder.exported_type(0x0020_0000, "N", "Loop", Token::new(0x2300_0000 | other));
            builder.build()
        };
        let first = forwarder("First", "Second");
        let second = forwarder("Second", "First");

        let resolver = move |identity: &AssemblyIdentity, flags: AssemblyFlags| {
            match identity.name.as_str() {
                "Second" => ModuleFile::from_mem(second.clone()),
                _ => no_resolver(identity, flags),
            }
        };
        let context = AssemblyLoadContext::new(resolver);
        let first = context.load_mem(first).unwrap();

        assert!(matches!(
            first.resolve_type_definition("N.Loop"),
            Err(Error::ReferenceCycle(_))
        ));
    }

    #[test]
    fn enum_constants_and_flags() {
        let mut builder = MetadataBuilder::new("Enums");
        let corlib = builder.assembly_ref("mscorlib", [4, 0, 0, 0]);
        let enum_ref = builder.type_ref_in_assembly(corlib, "System", "Enum");
        let flags_ref = builder.type_ref_in_assembly(corlib, "System", "FlagsAttribute");
        let flags_ctor = builder.member_ref(flags_ref, ".ctor", &[0x20, 0x00, 0x01]);
        builder.type_def(0, "", "<Module>", None);
        let color = builder.type_def(0x0101, "N", "Color", Some(enum_ref));
        builder.field(0x0606, "value__", &[0x06, 0x08]);
        let red = builder.field(0x8056, "Red", &[0x06, 0x11, 0x08]);
        builder.constant(0x08, Token::new(0x0400_0000 | red), &[0x01, 0x00, 0x00, 0x00]);
        builder.custom_attribute(type_def_token(color), flags_ctor, &[0x01, 0x00, 0x00, 0x00]);
        let (_context, assembly) = load(&builder);

        let color = assembly.type_definition(color).unwrap();
        assert_eq!(color.kind(), TypeDefinitionKind::Enum);
        let enumeration = color.as_enum().unwrap();
        assert_eq!(enumeration.backing_field().unwrap().name(), "value__");
        assert_eq!(enumeration.underlying_type().unwrap().full_name(), "System.Int32");
        assert!(enumeration.is_flags().unwrap());

        let red = color.find_field("Red", &MemberFilter::default()).unwrap().unwrap();
        assert!(red.is_literal());
        assert!(red.is_static().unwrap());
        assert_eq!(red.constant().unwrap(), Some(&Constant::I4(1)));
        assert_eq!(red.field_type().unwrap().as_definition().unwrap(), Some(color.clone()));

        let attribute = &color.attributes().unwrap()[0];
        assert_eq!(attribute.owner(), color.token());
        assert_eq!(attribute.constructor().unwrap().name(), ".ctor");
        assert_eq!(attribute.attribute_type().unwrap().full_name(), "System.FlagsAttribute");
        assert!(attribute.arguments().unwrap().fixed.is_empty());
    }

    #[test]
    fn attribute_arguments() {
        let (mut builder, object) = builder_with_object("Attributes");
        let attribute_ref = builder.type_ref_in_assembly(1, "System", "Attribute");
        let info = builder.type_def(PUBLIC_CLASS, "N", "InfoAttribute", Some(attribute_ref));
        let ctor = builder.method(0x1886, ".ctor", &[0x20, 0x02, 0x01, 0x0E, 0x08]);
        builder.field(0x0006, "Level", &[0x06, 0x08]);
        let target = builder.type_def(PUBLIC_CLASS, "N", "Target", Some(object));

        #[rustfmt::skip]
        let value = [
            0x01, 0x00,
            0x02, b'h', b'i',                               // "hi"
            0x07, 0x00, 0x00, 0x00,                         // 7
            0x01, 0x00,
            0x53, 0x08, 0x05, b'L', b'e', b'v', b'e', b'l', // field int32 Level
            0x02, 0x00, 0x00, 0x00,
        ];
        let constructor = Token::new(0x0600_0000 | ctor);
        builder.custom_attribute(type_def_token(target), constructor, &value);
        builder.custom_attribute(Token::new(0x2000_0001), constructor, &value);
        let (_context, assembly) = load(&builder);

        let target = assembly.type_definition(target).unwrap();
        let attribute = &target.attributes().unwrap()[0];
        assert_eq!(attribute.attribute_type().unwrap(), assembly.type_definition(info).unwrap());

        let arguments = attribute.arguments().unwrap();
        assert_eq!(
            arguments.fixed,
            vec![AttributeValue::String(Some("hi".to_string())), AttributeValue::I4(7)]
        );
        assert_eq!(
            arguments.named,
            vec![NamedArgument {
                kind: NamedArgumentKind::Field,
                name: "Level".to_string(),
                value: AttributeValue::I4(2),
            }]
        );

        assert_eq!(assembly.attributes().unwrap().len(), 1);
    }

    #[test]
    fn kinds_layout_and_accessors() {
        let (mut builder, object) = builder_with_object("Kinds");
        let value_type = builder.type_ref_in_assembly(1, "System", "ValueType");
        let delegate = builder.type_ref_in_assembly(1, "System", "MulticastDelegate");

        let point = builder.type_def(0x0109, "N", "Point", Some(value_type));
        builder.class_layout(4, 16, point);

        let handler = builder.type_def(0x0101, "N", "Handler", Some(delegate));
        builder.method(0x1886, ".ctor", &[0x20, 0x02, 0x01, 0x1C, 0x18]);
        builder.method(0x01C6, "Invoke", &[0x20, 0x02, 0x01, 0x1C, 0x08]);

        let shape = builder.type_def(0x0010_0081, "N", "Shape", Some(object));
        let get_area = builder.method(0x0DC6, "get_Area", &[0x20, 0x00, 0x0D]);
        let area = builder.property(0, "Area", &[0x28, 0x00, 0x0D]);
        builder.method_semantics(0x0002, get_area, Token::new(0x1700_0000 | area));

        let interface = builder.type_def(0x00A1, "N", "IShape", None);
        builder.interface_impl(shape, type_def_token(interface));
        let (_context, assembly) = load(&builder);

        let point = assembly.type_definition(point).unwrap();
        assert_eq!(point.kind(), TypeDefinitionKind::Struct);
        assert!(point.as_struct().is_some());
        assert_eq!(
            point.layout().unwrap(),
            TypeLayout::Sequential {
                pack: Some(4),
                min_size: 16
            }
        );

        let handler = assembly.type_definition(handler).unwrap();
        let handler = handler.as_delegate().unwrap();
        assert_eq!(handler.arity().unwrap(), 2);
        assert_eq!(
            handler.invoke_method().unwrap().return_type().unwrap().to_string(),
            "System.Void"
        );

        let shape = assembly.type_definition(shape).unwrap();
        assert!(shape.is_abstract());
        let area = shape.find_property("Area", &MemberFilter::default()).unwrap().unwrap();
        assert_eq!(area.getter().unwrap().unwrap().rid(), get_area);
        assert!(area.setter().unwrap().is_none());
        assert!(area.is_virtual().unwrap());
        assert!(area.is_abstract().unwrap());
        assert_eq!(area.visibility().unwrap(), Visibility::Public);
        assert_eq!(area.property_type().unwrap().to_string(), "System.Double");

        let interface = assembly.type_definition(interface).unwrap();
        assert_eq!(interface.kind(), TypeDefinitionKind::Interface);
        assert!(interface.base().unwrap().is_none());
        let implemented = &shape.base_interfaces().unwrap()[0];
        assert_eq!(implemented.interface().definition().unwrap(), interface);
    }

    #[test]
    fn constructor_and_indexer_kinds() {
        let (mut builder, object) = builder_with_object("Members");
        let table = builder.type_def(PUBLIC_CLASS, "N", "Table", Some(object));
        builder.method(0x1886, ".ctor", &[0x20, 0x01, 0x01, 0x08]);
        builder.method(0x1891, ".cctor", &[0x00, 0x00, 0x01]);
        let get_item = builder.method(0x0886, "get_Item", &[0x20, 0x01, 0x0E, 0x08]);
        let get_count = builder.method(0x0886, "get_Count", &[0x20, 0x00, 0x08]);
        let item = builder.property(0, "Item", &[0x28, 0x01, 0x0E, 0x08]);
        let count = builder.property(0, "Count", &[0x28, 0x00, 0x08]);
        builder.method_semantics(0x0002, get_item, Token::new(0x1700_0000 | item));
        builder.method_semantics(0x0002, get_count, Token::new(0x1700_0000 | count));
        let (_context, assembly) = load(&builder);
        let table = assembly.type_definition(table).unwrap();

        let mut constructors = 0;
        for method in table.methods().unwrap() {
            match method.kind() {
                MethodKind::Constructor => {
                    constructors += 1;
                    let constructor = method.as_constructor().unwrap();
                    if constructor.is_type_initializer() {
                        assert_eq!(method.name(), ".cctor");
                        assert!(constructor.params().unwrap().is_empty());
                    } else {
                        assert_eq!(method.name(), ".ctor");
                        let params = constructor.params().unwrap();
                        assert_eq!(params.len(), 1);
                        assert_eq!(params[0].param_type().to_string(), "System.Int32");
                    }
                }
                MethodKind::Method => {
                    assert!(method.name().starts_with("get_"));
                    assert!(method.as_constructor().is_none());
                }
            }
        }
        assert_eq!(constructors, 2);

        let mut indexers = 0;
        for property in table.properties().unwrap() {
            match property.kind().unwrap() {
                PropertyKind::Indexer => {
                    indexers += 1;
                    assert_eq!(property.name(), "Item");
                    let indexer = property.as_indexer().unwrap().unwrap();
                    let params = indexer.params().unwrap();
                    assert_eq!(params.len(), 1);
                    assert_eq!(params[0].to_string(), "System.Int32");
                    assert_eq!(
                        indexer.property().property_type().unwrap().to_string(),
                        "System.String"
                    );
                }
                PropertyKind::Property => {
                    assert_eq!(property.name(), "Count");
                    assert!(property.as_indexer().unwrap().is_none());
                }
            }
        }
        assert_eq!(indexers, 1);

        let constructor = table.find_constructor(&MethodFilter::default()).unwrap().unwrap();
        assert_eq!(constructor.kind(), MethodKind::Constructor);
    }

    #[test]
    fn primitives_need_a_core_library() {
        let mut builder = MetadataBuilder::new("Alone");
        let rid = builder.type_def(PUBLIC_CLASS, "N", "C", None);
        builder.field(0x0006, "value", &[0x06, 0x08]);
        let context = AssemblyLoadContext::default();
        let assembly = context.load_mem(builder.build()).unwrap();

        let field = assembly.type_definition(rid).unwrap().fields().unwrap()[0].clone();
        assert!(matches!(field.field_type(), Err(Error::AssemblyNotFound { .. })));
    }

    #[test]
    fn module_without_manifest() {
        let mut builder = MetadataBuilder::new("Part");
        builder.without_assembly_row();
        let context = AssemblyLoadContext::default();
        let assembly = context.load_mem(builder.build()).unwrap();

        assert_eq!(assembly.name(), "Part");
        assert_eq!(assembly.version(), AssemblyVersion::default());
        assert!(assembly.attributes().unwrap().is_empty());
    }

    #[test]
    fn entities_outlive_context_safely() {
        let (mut builder, object) = builder_with_object("Dropped");
        let rid = builder.type_def(PUBLIC_CLASS, "N", "C", Some(object));
        let (context, assembly) = load(&builder);
        let definition = assembly.type_definition(rid).unwrap();

        drop(assembly);
        drop(context);
        assert!(matches!(definition.assembly(), Err(Error::EntityDropped)));
        assert!(matches!(definition.methods(), Err(Error::EntityDropped)));
        assert_eq!(definition.full_name(), "N.C");
    }
}

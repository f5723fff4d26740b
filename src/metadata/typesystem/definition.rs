//! Type definitions and the lookups shared by all five kinds.

use std::{collections::HashSet, fmt, sync::Arc};

use crate::{
    metadata::{
        assembly::Assembly,
        members::{
            Attribute, BaseInterface, Event, EventRc, Field, FieldRc, Member, Method, MethodRc,
            Property, PropertyRc,
        },
        streams::ChildList,
        tables::{
            ClassLayoutRaw, CodedIndex, EventMapRaw, InterfaceImplRaw, PropertyMapRaw,
            TypeAttributes, TypeDefRaw,
        },
        token::Token,
        typesystem::{
            BoundType, EntityRef, GenericContext, GenericParam, GenericParamRc, TypeDefinitionKind,
            TypeNode, Visibility,
        },
    },
    utils::Memo,
    Result,
};

/// How the fields of a type are laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLayout {
    /// The runtime chooses
    Auto,
    /// Fields in declaration order
    Sequential {
        /// Field alignment, `None` for the platform default
        pack: Option<u16>,
        /// Minimum size of an instance in bytes, 0 if unspecified
        min_size: u32,
    },
    /// Field offsets given by `FieldLayout`
    Explicit {
        /// Minimum size of an instance in bytes, 0 if unspecified
        min_size: u32,
    },
}

/// State shared by all kinds of type definitions, one per `TypeDef` row.
///
/// Names and flags are decoded when the definition is created; everything that needs other
/// rows is computed on first access and cached.
pub struct TypeDefinitionData {
    assembly: EntityRef<Assembly>,
    rid: u32,
    token: Token,
    kind: TypeDefinitionKind,
    flags: u32,
    name: String,
    namespace: String,
    full_name: String,
    extends: CodedIndex,
    enclosing: Option<u32>,
    base: Memo<Option<BoundType>>,
    base_interfaces: Memo<Vec<BaseInterface>>,
    generic_params: Memo<Vec<GenericParamRc>>,
    nested_types: Memo<Vec<TypeDefinition>>,
    methods: Memo<Vec<MethodRc>>,
    fields: Memo<Vec<FieldRc>>,
    properties: Memo<Vec<PropertyRc>>,
    events: Memo<Vec<EventRc>>,
    attributes: Memo<Vec<Attribute>>,
    layout: Memo<TypeLayout>,
}

impl TypeDefinitionData {
    /// Row id in the `TypeDef` table.
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.rid
    }

    /// `Namespace.Name`, with `Enclosing/Nested` for nested types.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

/// Class with an optional finalizer.
#[derive(Clone)]
pub struct ClassDefinition(Arc<TypeDefinitionData>);

/// Interface.
#[derive(Clone)]
pub struct InterfaceDefinition(Arc<TypeDefinitionData>);

/// Delegate, a class deriving from `System.MulticastDelegate`.
#[derive(Clone)]
pub struct DelegateDefinition(Arc<TypeDefinitionData>);

/// Value type deriving from `System.ValueType`.
#[derive(Clone)]
pub struct StructDefinition(Arc<TypeDefinitionData>);

/// Enumeration deriving from `System.Enum`.
#[derive(Clone)]
pub struct EnumDefinition(Arc<TypeDefinitionData>);

/// An unbound type defined in some assembly.
///
/// Equality is identity: two `TypeDefinition`s are equal when they are the same row of the
/// same loaded assembly.
#[derive(Clone)]
pub enum TypeDefinition {
    /// See [`ClassDefinition`]
    Class(ClassDefinition),
    /// See [`InterfaceDefinition`]
    Interface(InterfaceDefinition),
    /// See [`DelegateDefinition`]
    Delegate(DelegateDefinition),
    /// See [`StructDefinition`]
    Struct(StructDefinition),
    /// See [`EnumDefinition`]
    Enum(EnumDefinition),
}

impl TypeDefinition {
    /// Create the definition of `TypeDef` row `rid` of `assembly`.
    ///
    /// # Errors
    /// Returns an error if the row or its names fail to decode.
    pub(crate) fn load(assembly: &Assembly, rid: u32) -> Result<TypeDefinition> {
        let module = assembly.module();
        let row = module.row::<TypeDefRaw>(rid)?;
        let kind = module.type_definition_kind(&row, assembly.is_core_library())?;
        let enclosing = assembly.enclosing_type_rid(rid)?;

        log::trace!("Binding {:?} TypeDef row {} of {}", kind, rid, assembly.name());

        let data = TypeDefinitionData {
            assembly: assembly.entity_ref(),
            rid,
            token: row.token,
            kind,
            flags: row.flags,
            name: module.string(row.type_name)?.to_string(),
            namespace: module.string(row.type_namespace)?.to_string(),
            full_name: assembly.type_full_name(rid)?,
            extends: row.extends,
            enclosing,
            base: Memo::new(),
            base_interfaces: Memo::new(),
            generic_params: Memo::new(),
            nested_types: Memo::new(),
            methods: Memo::new(),
            fields: Memo::new(),
            properties: Memo::new(),
            events: Memo::new(),
            attributes: Memo::new(),
            layout: Memo::new(),
        };

        Ok(TypeDefinition::from_data(kind, Arc::new(data)))
    }

    pub(crate) fn from_data(kind: TypeDefinitionKind, data: Arc<TypeDefinitionData>) -> Self {
        match kind {
            TypeDefinitionKind::Class => TypeDefinition::Class(ClassDefinition(data)),
            TypeDefinitionKind::Interface => TypeDefinition::Interface(InterfaceDefinition(data)),
            TypeDefinitionKind::Delegate => TypeDefinition::Delegate(DelegateDefinition(data)),
            TypeDefinitionKind::Struct => TypeDefinition::Struct(StructDefinition(data)),
            TypeDefinitionKind::Enum => TypeDefinition::Enum(EnumDefinition(data)),
        }
    }

    /// The class, if this is one.
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassDefinition> {
        match self {
            TypeDefinition::Class(class) => Some(class),
            _ => None,
        }
    }

    /// The interface, if this is one.
    #[must_use]
    pub fn as_interface(&self) -> Option<&InterfaceDefinition> {
        match self {
            TypeDefinition::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    /// The delegate, if this is one.
    #[must_use]
    pub fn as_delegate(&self) -> Option<&DelegateDefinition> {
        match self {
            TypeDefinition::Delegate(delegate) => Some(delegate),
            _ => None,
        }
    }

    /// The struct, if this is one.
    #[must_use]
    pub fn as_struct(&self) -> Option<&StructDefinition> {
        match self {
            TypeDefinition::Struct(structure) => Some(structure),
            _ => None,
        }
    }

    /// The enum, if this is one.
    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumDefinition> {
        match self {
            TypeDefinition::Enum(enumeration) => Some(enumeration),
            _ => None,
        }
    }
}

/// Filter for [`Definition::find_field`], [`Definition::find_property`] and
/// [`Definition::find_event`]. `None` matches anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberFilter {
    /// Require public (`Some(true)`) or non-public (`Some(false)`) visibility
    pub public: Option<bool>,
    /// Require static or instance members
    pub is_static: Option<bool>,
    /// Walk the base type chain when the type itself has no match
    pub inherited: bool,
}

impl MemberFilter {
    fn matches<M: Member>(&self, member: &M) -> Result<bool> {
        if let Some(public) = self.public {
            if (member.visibility()? == Visibility::Public) != public {
                return Ok(false);
            }
        }

        if let Some(is_static) = self.is_static {
            if member.is_static()? != is_static {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Filter for [`Definition::find_method`]. `None` matches anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodFilter<'a> {
    /// Require public (`Some(true)`) or non-public (`Some(false)`) visibility
    pub public: Option<bool>,
    /// Require static or instance methods
    pub is_static: Option<bool>,
    /// Number of generic parameters
    pub generic_arity: Option<usize>,
    /// Number of parameters
    pub arity: Option<usize>,
    /// Exact parameter types, which implies the arity
    pub param_types: Option<&'a [TypeNode]>,
    /// Walk the base type chain when the type itself has no match
    pub inherited: bool,
}

impl MethodFilter<'_> {
    fn matches(&self, method: &Method) -> Result<bool> {
        let member = MemberFilter {
            public: self.public,
            is_static: self.is_static,
            inherited: self.inherited,
        };
        if !member.matches(method)? {
            return Ok(false);
        }

        if let Some(generic_arity) = self.generic_arity {
            if method.generic_arity()? != generic_arity {
                return Ok(false);
            }
        }

        if let Some(arity) = self.arity {
            if method.arity()? != arity {
                return Ok(false);
            }
        }

        if let Some(param_types) = self.param_types {
            let params = method.params()?;
            if params.len() != param_types.len()
                || params
                    .iter()
                    .zip(param_types)
                    .any(|(param, expected)| param.param_type() != expected)
            {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Members that a type declares in a list of its own.
trait DeclaredMember: Member + Sized {
    fn declared(definition: &TypeDefinition) -> Result<&[Arc<Self>]>;
}

impl DeclaredMember for Method {
    fn declared(definition: &TypeDefinition) -> Result<&[Arc<Self>]> {
        definition.methods()
    }
}

impl DeclaredMember for Field {
    fn declared(definition: &TypeDefinition) -> Result<&[Arc<Self>]> {
        definition.fields()
    }
}

impl DeclaredMember for Property {
    fn declared(definition: &TypeDefinition) -> Result<&[Arc<Self>]> {
        definition.properties()
    }
}

impl DeclaredMember for Event {
    fn declared(definition: &TypeDefinition) -> Result<&[Arc<Self>]> {
        definition.events()
    }
}

/// Find the unique member named `name` accepted by `predicate`.
///
/// Each level of the base chain is searched completely before moving on: one match is the
/// result, several matches on the same level are ambiguous and yield `None`, and the next
/// level is only searched if `inherited` is set and the current one has no match.
fn find_member<M, P>(
    start: &TypeDefinition,
    name: &str,
    inherited: bool,
    predicate: P,
) -> Result<Option<Arc<M>>>
where
    M: DeclaredMember,
    P: Fn(&M) -> Result<bool>,
{
    let mut visited = HashSet::new();
    let mut current = start.clone();

    loop {
        if !visited.insert(Arc::as_ptr(current.data())) {
            return Err(malformed_error!(
                "Cyclic inheritance involving {}",
                current.full_name()
            ));
        }

        let mut found = None;
        let mut count = 0usize;
        for member in M::declared(&current)? {
            if member.name() == name && predicate(member)? {
                count += 1;
                found = Some(member.clone());
            }
        }

        match count {
            0 => {}
            1 => return Ok(found),
            _ => return Ok(None),
        }

        if !inherited {
            return Ok(None);
        }

        let next = match current.base()? {
            Some(base) => base.definition()?,
            None => return Ok(None),
        };
        current = next;
    }
}

/// The surface shared by all five kinds of type definitions.
///
/// Implementors only provide access to the shared [`TypeDefinitionData`]; every query is a
/// provided method. Collections are computed on first access and returned from the cache
/// afterwards.
pub trait Definition {
    /// The shared state of this definition.
    fn data(&self) -> &Arc<TypeDefinitionData>;

    /// This definition as the kind-erased enum.
    fn as_type_definition(&self) -> TypeDefinition;

    /// The owning assembly.
    ///
    /// # Errors
    /// Returns [`crate::Error::EntityDropped`] if the assembly was dropped.
    fn assembly(&self) -> Result<Arc<Assembly>> {
        self.data().assembly.get()
    }

    /// Token of the `TypeDef` row.
    fn token(&self) -> Token {
        self.data().token
    }

    /// The kind decided when the definition was created.
    fn kind(&self) -> TypeDefinitionKind {
        self.data().kind
    }

    /// `TypeAttributes` of the row.
    fn flags(&self) -> u32 {
        self.data().flags
    }

    /// Name, including a generic arity suffix such as `` List`1 ``.
    fn name(&self) -> &str {
        &self.data().name
    }

    /// Name with the generic arity suffix cut at the backtick.
    fn name_without_generic_suffix(&self) -> &str {
        let name = self.name();
        match name.find('`') {
            Some(position) => &name[..position],
            None => name,
        }
    }

    /// Namespace, `None` for the global namespace and for nested types.
    fn namespace(&self) -> Option<&str> {
        let namespace = &self.data().namespace;
        (!namespace.is_empty()).then_some(namespace.as_str())
    }

    /// `Namespace.Name`, with `Enclosing/Nested` for nested types.
    fn full_name(&self) -> &str {
        &self.data().full_name
    }

    /// Declared accessibility.
    fn visibility(&self) -> Visibility {
        Visibility::from_type_attributes(self.flags())
    }

    /// Whether the type is `public` (or nested public).
    fn is_public(&self) -> bool {
        self.visibility() == Visibility::Public
    }

    /// Whether the type is nested in another type.
    fn is_nested(&self) -> bool {
        self.data().enclosing.is_some()
    }

    /// `abstract`
    fn is_abstract(&self) -> bool {
        self.flags() & TypeAttributes::ABSTRACT != 0
    }

    /// `sealed`
    fn is_sealed(&self) -> bool {
        self.flags() & TypeAttributes::SEALED != 0
    }

    /// Field layout, with packing and size from `ClassLayout` if present.
    ///
    /// # Errors
    /// Returns an error if the `ClassLayout` table fails to decode.
    fn layout(&self) -> Result<TypeLayout> {
        let data = self.data();
        data.layout
            .get_or_try_init(|| {
                let assembly = data.assembly.get()?;
                let class_layout = match assembly.module().table::<ClassLayoutRaw>() {
                    Some(table) => table.find_any(data.token)?,
                    None => None,
                };

                let (pack, min_size) = match class_layout {
                    Some(row) => ((row.packing_size != 0).then_some(row.packing_size), row.class_size),
                    None => (None, 0),
                };

                Ok(match data.flags & TypeAttributes::LAYOUT_MASK {
                    TypeAttributes::SEQUENTIAL_LAYOUT => TypeLayout::Sequential { pack, min_size },
                    TypeAttributes::EXPLICIT_LAYOUT => TypeLayout::Explicit { min_size },
                    _ => TypeLayout::Auto,
                })
            })
            .copied()
    }

    /// The type this one is nested in.
    ///
    /// # Errors
    /// Returns an error if the enclosing type cannot be loaded.
    fn enclosing_type(&self) -> Result<Option<TypeDefinition>> {
        let data = self.data();
        match data.enclosing {
            Some(rid) => data.assembly.get()?.type_definition(rid).map(Some),
            None => Ok(None),
        }
    }

    /// Types nested directly in this one.
    ///
    /// # Errors
    /// Returns an error if a nested type cannot be loaded.
    fn nested_types(&self) -> Result<&[TypeDefinition]> {
        let data = self.data();
        data.nested_types
            .get_or_try_init(|| {
                let assembly = data.assembly.get()?;
                assembly
                    .nested_type_rids(data.rid)?
                    .into_iter()
                    .map(|rid| assembly.type_definition(rid))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    /// Generic parameters, ordered by number.
    ///
    /// # Errors
    /// Returns an error if the `GenericParam` rows are malformed.
    fn generic_params(&self) -> Result<&[GenericParamRc]> {
        let data = self.data();
        data.generic_params
            .get_or_try_init(|| GenericParam::load_all(&*data.assembly.get()?, data.token))
            .map(Vec::as_slice)
    }

    /// Number of generic parameters.
    ///
    /// # Errors
    /// Returns an error if the `GenericParam` rows are malformed.
    fn generic_arity(&self) -> Result<usize> {
        Ok(self.generic_params()?.len())
    }

    /// The generic parameters in scope for signatures of this type's members.
    ///
    /// # Errors
    /// Returns an error if the `GenericParam` rows are malformed.
    fn generic_context(&self) -> Result<GenericContext> {
        Ok(GenericContext::new(self.generic_params()?.to_vec(), Vec::new()))
    }

    /// The base type; `None` for `System.Object`, interfaces and the `<Module>` type.
    ///
    /// # Errors
    /// Returns an error if the base type cannot be resolved, or
    /// [`crate::Error::Malformed`] if it is not a named type.
    fn base(&self) -> Result<Option<&BoundType>> {
        let data = self.data();
        data.base
            .get_or_try_init(|| {
                if data.extends.is_null() {
                    return Ok(None);
                }

                let assembly = data.assembly.get()?;
                match assembly.resolve_type_def_or_ref(data.extends.token, &self.generic_context()?)? {
                    Some(TypeNode::Bound(bound)) => Ok(Some(bound)),
                    Some(other) => Err(malformed_error!(
                        "Base type of {} is not a named type: {}",
                        data.full_name,
                        other
                    )),
                    None => Ok(None),
                }
            })
            .map(Option::as_ref)
    }

    /// Interfaces this type declares to implement (`InterfaceImpl`).
    ///
    /// # Errors
    /// Returns an error if an interface cannot be resolved.
    fn base_interfaces(&self) -> Result<&[BaseInterface]> {
        let data = self.data();
        data.base_interfaces
            .get_or_try_init(|| {
                let assembly = data.assembly.get()?;
                let Some(table) = assembly.module().table::<InterfaceImplRaw>() else {
                    return Ok(Vec::new());
                };

                let context = self.generic_context()?;
                table
                    .find_all(data.token)?
                    .iter()
                    .map(|row| BaseInterface::load(&assembly, row, &context))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    /// Methods, including constructors, in table order.
    ///
    /// # Errors
    /// Returns an error if the method list or a method row is malformed.
    fn methods(&self) -> Result<&[MethodRc]> {
        let data = self.data();
        data.methods
            .get_or_try_init(|| {
                let assembly = data.assembly.get()?;
                assembly
                    .module()
                    .tables()
                    .children(ChildList::Methods, data.rid)?
                    .into_iter()
                    .map(|rid| Method::load(&assembly, data.rid, rid))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    /// Fields in table order.
    ///
    /// # Errors
    /// Returns an error if the field list or a field row is malformed.
    fn fields(&self) -> Result<&[FieldRc]> {
        let data = self.data();
        data.fields
            .get_or_try_init(|| {
                let assembly = data.assembly.get()?;
                assembly
                    .module()
                    .tables()
                    .children(ChildList::Fields, data.rid)?
                    .into_iter()
                    .map(|rid| Field::load(&assembly, data.rid, rid))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    /// Properties, found through `PropertyMap`.
    ///
    /// # Errors
    /// Returns an error if the map or a property row is malformed.
    fn properties(&self) -> Result<&[PropertyRc]> {
        let data = self.data();
        data.properties
            .get_or_try_init(|| {
                let assembly = data.assembly.get()?;
                let module = assembly.module();
                let map = match module.table::<PropertyMapRaw>() {
                    Some(table) => table.find_any(data.token)?,
                    None => None,
                };
                let Some(map) = map else {
                    return Ok(Vec::new());
                };

                module
                    .tables()
                    .children(ChildList::Properties, map.rid)?
                    .into_iter()
                    .map(|rid| Property::load(&assembly, data.rid, rid))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    /// Events, found through `EventMap`.
    ///
    /// # Errors
    /// Returns an error if the map or an event row is malformed.
    fn events(&self) -> Result<&[EventRc]> {
        let data = self.data();
        data.events
            .get_or_try_init(|| {
                let assembly = data.assembly.get()?;
                let module = assembly.module();
                let map = match module.table::<EventMapRaw>() {
                    Some(table) => table.find_any(data.token)?,
                    None => None,
                };
                let Some(map) = map else {
                    return Ok(Vec::new());
                };

                module
                    .tables()
                    .children(ChildList::Events, map.rid)?
                    .into_iter()
                    .map(|rid| Event::load(&assembly, data.rid, rid))
                    .collect()
            })
            .map(Vec::as_slice)
    }

    /// Custom attributes applied to the type.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    fn attributes(&self) -> Result<&[Attribute]> {
        let data = self.data();
        data.attributes
            .get_or_try_init(|| data.assembly.get()?.attributes_of(data.token))
            .map(Vec::as_slice)
    }

    /// The unique method named `name` matching `filter`. See [`MethodFilter`].
    ///
    /// # Errors
    /// Returns an error if a visited member list is malformed or the base chain is cyclic.
    fn find_method(&self, name: &str, filter: &MethodFilter<'_>) -> Result<Option<MethodRc>> {
        find_member(&self.as_type_definition(), name, filter.inherited, |method: &Method| {
            filter.matches(method)
        })
    }

    /// The unique instance constructor matching `filter`.
    ///
    /// # Errors
    /// Returns an error if the method list is malformed.
    fn find_constructor(&self, filter: &MethodFilter<'_>) -> Result<Option<MethodRc>> {
        self.find_method(".ctor", filter)
    }

    /// The unique field named `name` matching `filter`.
    ///
    /// # Errors
    /// Returns an error if a visited member list is malformed or the base chain is cyclic.
    fn find_field(&self, name: &str, filter: &MemberFilter) -> Result<Option<FieldRc>> {
        find_member(&self.as_type_definition(), name, filter.inherited, |field: &Field| {
            filter.matches(field)
        })
    }

    /// The unique property named `name` matching `filter`.
    ///
    /// # Errors
    /// Returns an error if a visited member list is malformed or the base chain is cyclic.
    fn find_property(&self, name: &str, filter: &MemberFilter) -> Result<Option<PropertyRc>> {
        find_member(&self.as_type_definition(), name, filter.inherited, |property: &Property| {
            filter.matches(property)
        })
    }

    /// The unique event named `name` matching `filter`.
    ///
    /// # Errors
    /// Returns an error if a visited member list is malformed or the base chain is cyclic.
    fn find_event(&self, name: &str, filter: &MemberFilter) -> Result<Option<EventRc>> {
        find_member(&self.as_type_definition(), name, filter.inherited, |event: &Event| {
            filter.matches(event)
        })
    }

    /// This definition instantiated with `generic_args`.
    ///
    /// # Errors
    /// Returns [`crate::Error::GenericArityMismatch`] if the number of arguments is wrong.
    fn bind_node(&self, generic_args: Vec<TypeNode>) -> Result<TypeNode> {
        BoundType::new(&self.as_type_definition(), generic_args).map(TypeNode::Bound)
    }
}

macro_rules! impl_definition {
    ($($kind:ident => $variant:ident),+ $(,)?) => {
        $(
            impl Definition for $kind {
                fn data(&self) -> &Arc<TypeDefinitionData> {
                    &self.0
                }

                fn as_type_definition(&self) -> TypeDefinition {
                    TypeDefinition::$variant(self.clone())
                }
            }
        )+
    };
}

impl_definition!(
    ClassDefinition => Class,
    InterfaceDefinition => Interface,
    DelegateDefinition => Delegate,
    StructDefinition => Struct,
    EnumDefinition => Enum,
);

impl Definition for TypeDefinition {
    fn data(&self) -> &Arc<TypeDefinitionData> {
        match self {
            TypeDefinition::Class(class) => class.data(),
            TypeDefinition::Interface(interface) => interface.data(),
            TypeDefinition::Delegate(delegate) => delegate.data(),
            TypeDefinition::Struct(structure) => structure.data(),
            TypeDefinition::Enum(enumeration) => enumeration.data(),
        }
    }

    fn as_type_definition(&self) -> TypeDefinition {
        self.clone()
    }
}

impl ClassDefinition {
    /// The instance `Finalize()` override declared by this class.
    ///
    /// # Errors
    /// Returns an error if the method list is malformed.
    pub fn finalizer(&self) -> Result<Option<MethodRc>> {
        self.find_method(
            "Finalize",
            &MethodFilter {
                is_static: Some(false),
                generic_arity: Some(0),
                arity: Some(0),
                ..MethodFilter::default()
            },
        )
    }
}

impl DelegateDefinition {
    /// The public instance `Invoke` method carrying the delegate's signature.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the delegate has no unique `Invoke` method.
    pub fn invoke_method(&self) -> Result<MethodRc> {
        let filter = MethodFilter {
            public: Some(true),
            is_static: Some(false),
            ..MethodFilter::default()
        };

        match self.find_method("Invoke", &filter)? {
            Some(method) => Ok(method),
            None => Err(malformed_error!(
                "Delegate {} has no unique Invoke method",
                self.full_name()
            )),
        }
    }

    /// Number of parameters of [`DelegateDefinition::invoke_method`].
    ///
    /// # Errors
    /// Same as [`DelegateDefinition::invoke_method`].
    pub fn arity(&self) -> Result<usize> {
        self.invoke_method()?.arity()
    }
}

impl EnumDefinition {
    /// The instance field `value__` holding the value.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the enum has no such field.
    pub fn backing_field(&self) -> Result<FieldRc> {
        let filter = MemberFilter {
            is_static: Some(false),
            ..MemberFilter::default()
        };

        match self.find_field("value__", &filter)? {
            Some(field) => Ok(field),
            None => Err(malformed_error!(
                "Enum {} has no value__ field",
                self.full_name()
            )),
        }
    }

    /// The integral type of [`EnumDefinition::backing_field`], e.g. `System.Int32`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the backing field is missing or not a named type.
    pub fn underlying_type(&self) -> Result<TypeDefinition> {
        match self.backing_field()?.field_type()?.as_definition()? {
            Some(definition) => Ok(definition),
            None => Err(malformed_error!(
                "Backing field of {} is not of a named type",
                self.full_name()
            )),
        }
    }

    /// Whether the enum carries `System.FlagsAttribute` of the core library.
    ///
    /// # Errors
    /// Returns an error if an attribute cannot be resolved.
    pub fn is_flags(&self) -> Result<bool> {
        for attribute in self.attributes()? {
            let attribute_type = attribute.attribute_type()?;
            if attribute_type.full_name() == "System.FlagsAttribute"
                && attribute_type.assembly()?.is_core_library()
            {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl PartialEq for TypeDefinition {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self.data(), other.data())
    }
}

impl Eq for TypeDefinition {}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} ({})", self.kind(), self.full_name(), self.token())
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

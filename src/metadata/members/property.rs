use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        assembly::Assembly,
        members::{primary_accessor, semantic_methods, Attribute, Constant, Member, MethodRc},
        signatures::{read_property, SignatureProperty},
        tables::{MethodSemanticsAttributes, PropertyRaw},
        token::Token,
        typesystem::{Definition, EntityRef, TypeDefinition, TypeNode, Visibility},
    },
    utils::Memo,
    Result,
};

/// Reference to a [`Property`]
pub type PropertyRc = Arc<Property>;

/// `PropertyAttributes::HasDefault`
const HAS_DEFAULT: u16 = 0x1000;

/// Whether a property is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Property without parameters
    Property,
    /// Property whose signature takes index parameters (`this[...]` in C#)
    Indexer,
}

/// An indexer, borrowed from the [`Property`] that declares it.
#[derive(Debug, Clone, Copy)]
pub struct Indexer<'a>(&'a Property);

impl<'a> Indexer<'a> {
    /// The underlying property.
    #[must_use]
    pub fn property(&self) -> &'a Property {
        self.0
    }

    /// Types of the index parameters, in order. Never empty.
    ///
    /// # Errors
    /// Returns an error if a parameter type cannot be resolved.
    pub fn params(&self) -> Result<&'a [TypeNode]> {
        let property = self.0;
        property
            .index_params
            .get_or_try_init(|| {
                let assembly = property.assembly.get()?;
                let context = property.declaring_type()?.generic_context()?;
                property
                    .signature()?
                    .params
                    .iter()
                    .map(|param| assembly.resolve_type(&param.base, &context))
                    .collect()
            })
            .map(Vec::as_slice)
    }
}

#[derive(Default)]
struct PropertyAccessors {
    getter: Option<MethodRc>,
    setter: Option<MethodRc>,
    others: Vec<MethodRc>,
}

/// A property or indexer (`Property` row).
///
/// A property whose signature has parameters is an indexer, see [`Property::as_indexer`].
/// Visibility, static-ness and the virtual flags are those of the
/// accessors, the getter speaking for the property when there is one.
pub struct Property {
    assembly: EntityRef<Assembly>,
    declaring_type: u32,
    token: Token,
    /// `PropertyAttributes`
    pub flags: u16,
    name: String,
    signature_blob: u32,
    signature: Memo<SignatureProperty>,
    property_type: Memo<TypeNode>,
    index_params: Memo<Vec<TypeNode>>,
    accessors: Memo<PropertyAccessors>,
    default_value: Memo<Option<Constant>>,
    attributes: Memo<Vec<Attribute>>,
}

impl Property {
    pub(crate) fn load(assembly: &Assembly, declaring_type: u32, rid: u32) -> Result<PropertyRc> {
        let module = assembly.module();
        let row = module.row::<PropertyRaw>(rid)?;

        Ok(Arc::new(Property {
            assembly: assembly.entity_ref(),
            declaring_type,
            token: row.token,
            flags: row.flags,
            name: module.string(row.name)?.to_string(),
            signature_blob: row.signature,
            signature: Memo::new(),
            property_type: Memo::new(),
            index_params: Memo::new(),
            accessors: Memo::new(),
            default_value: Memo::new(),
            attributes: Memo::new(),
        }))
    }

    /// The decoded `PropertySig`.
    ///
    /// # Errors
    /// Returns an error if the signature blob is malformed.
    pub fn signature(&self) -> Result<&SignatureProperty> {
        self.signature.get_or_try_init(|| {
            let assembly = self.assembly.get()?;
            read_property(assembly.module().blob(self.signature_blob)?)
        })
    }

    /// Type of the property.
    ///
    /// # Errors
    /// Returns an error if the signature is malformed or its type cannot be resolved.
    pub fn property_type(&self) -> Result<&TypeNode> {
        self.property_type.get_or_try_init(|| {
            let assembly = self.assembly.get()?;
            let context = self.declaring_type()?.generic_context()?;
            assembly.resolve_type(&self.signature()?.base, &context)
        })
    }

    /// Whether the property is an indexer.
    ///
    /// # Errors
    /// Returns an error if the signature blob is malformed.
    pub fn kind(&self) -> Result<PropertyKind> {
        Ok(if self.signature()?.params.is_empty() {
            PropertyKind::Property
        } else {
            PropertyKind::Indexer
        })
    }

    /// The indexer, if this property is one.
    ///
    /// # Errors
    /// Returns an error if the signature blob is malformed.
    pub fn as_indexer(&self) -> Result<Option<Indexer<'_>>> {
        Ok(match self.kind()? {
            PropertyKind::Indexer => Some(Indexer(self)),
            PropertyKind::Property => None,
        })
    }

    fn accessors(&self) -> Result<&PropertyAccessors> {
        self.accessors.get_or_try_init(|| {
            let assembly = self.assembly.get()?;
            let mut accessors = PropertyAccessors::default();
            for (semantics, method) in semantic_methods(&assembly, self.token)? {
                match semantics {
                    MethodSemanticsAttributes::GETTER => accessors.getter = Some(method),
                    MethodSemanticsAttributes::SETTER => accessors.setter = Some(method),
                    MethodSemanticsAttributes::OTHER => accessors.others.push(method),
                    _ => {
                        return Err(malformed_error!(
                            "Unexpected semantics {:#06x} for an accessor of property {}",
                            semantics,
                            self.name
                        ))
                    }
                }
            }
            Ok(accessors)
        })
    }

    /// The `get` accessor.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn getter(&self) -> Result<Option<&MethodRc>> {
        Ok(self.accessors()?.getter.as_ref())
    }

    /// The `set` accessor.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn setter(&self) -> Result<Option<&MethodRc>> {
        Ok(self.accessors()?.setter.as_ref())
    }

    /// Accessors that are neither getter nor setter.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn other_accessors(&self) -> Result<&[MethodRc]> {
        Ok(&self.accessors()?.others)
    }

    fn primary(&self) -> Result<Option<&MethodRc>> {
        let accessors = self.accessors()?;
        Ok(primary_accessor([
            accessors.getter.as_ref(),
            accessors.setter.as_ref(),
            accessors.others.first(),
        ]))
    }

    /// Whether the accessor is `virtual`.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn is_virtual(&self) -> Result<bool> {
        Ok(self.primary()?.is_some_and(|accessor| accessor.is_virtual()))
    }

    /// Whether the accessor is `abstract`.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn is_abstract(&self) -> Result<bool> {
        Ok(self.primary()?.is_some_and(|accessor| accessor.is_abstract()))
    }

    /// Whether the accessor is `final`.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn is_final(&self) -> Result<bool> {
        Ok(self.primary()?.is_some_and(|accessor| accessor.is_final()))
    }

    /// Default value from the `Constant` table.
    ///
    /// # Errors
    /// Returns an error if the `Constant` row is malformed.
    pub fn default_value(&self) -> Result<Option<&Constant>> {
        self.default_value
            .get_or_try_init(|| {
                if self.flags & HAS_DEFAULT == 0 {
                    return Ok(None);
                }
                self.assembly.get()?.constant_of(self.token)
            })
            .map(Option::as_ref)
    }

    /// Custom attributes applied to the property.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes(&self) -> Result<&[Attribute]> {
        self.attributes
            .get_or_try_init(|| self.assembly.get()?.attributes_of(self.token))
            .map(Vec::as_slice)
    }
}

impl Member for Property {
    fn name(&self) -> &str {
        &self.name
    }

    fn token(&self) -> Token {
        self.token
    }

    fn visibility(&self) -> Result<Visibility> {
        match self.primary()? {
            Some(accessor) => accessor.visibility(),
            None => Ok(Visibility::Public),
        }
    }

    fn is_static(&self) -> Result<bool> {
        match self.primary()? {
            Some(accessor) => accessor.is_static(),
            None => Ok(false),
        }
    }

    fn declaring_type(&self) -> Result<TypeDefinition> {
        self.assembly.get()?.type_definition(self.declaring_type)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

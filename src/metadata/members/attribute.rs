//! Custom attributes and the decoder for their value blobs (ECMA-335 II.23.3).

use std::fmt;

use crate::{
    file::parser::Parser,
    metadata::{
        assembly::Assembly,
        members::{Member, MethodRc},
        signatures::ELEMENT_TYPE,
        tables::CustomAttributeRaw,
        token::Token,
        typesystem::{
            Definition, EntityRef, PrimitiveKind, TypeDefinition, TypeDefinitionRef, TypeNode,
        },
    },
    utils::Memo,
    Error, Result,
};

/// `FieldOrPropType` tag of `System.Type` arguments
const SERIALIZATION_TYPE_TYPE: u8 = 0x50;
/// `FieldOrPropType` tag of arguments declared as `object`
const SERIALIZATION_TYPE_TAGGED_OBJECT: u8 = 0x51;
/// Named argument that sets a field
const SERIALIZATION_TYPE_FIELD: u8 = 0x53;
/// Named argument that sets a property
const SERIALIZATION_TYPE_PROPERTY: u8 = 0x54;
/// `FieldOrPropType` tag of enum arguments, followed by the enum's type name
const SERIALIZATION_TYPE_ENUM: u8 = 0x55;

const PROLOG: u16 = 0x0001;
const MAX_NESTING: usize = 16;

/// A decoded argument value.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum AttributeValue {
    Boolean(bool),
    Char(u16),
    I1(i8),
    U1(u8),
    I2(i16),
    U2(u16),
    I4(i32),
    U4(u32),
    I8(i64),
    U8(u64),
    R4(f32),
    R8(f64),
    /// A string, `None` for the null reference
    String(Option<String>),
    /// A `System.Type` given by its assembly-qualified name, `None` for null
    Type(Option<String>),
    /// An enum value with the name of the enum type
    Enum {
        type_name: String,
        value: Box<AttributeValue>,
    },
    /// A single-dimensional array, `None` for null
    Array(Option<Vec<AttributeValue>>),
}

/// Whether a named argument sets a field or a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedArgumentKind {
    /// `FIELD`
    Field,
    /// `PROPERTY`
    Property,
}

/// A `Name = value` argument following the constructor arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArgument {
    /// Field or property
    pub kind: NamedArgumentKind,
    /// Name of the field or property
    pub name: String,
    /// The assigned value
    pub value: AttributeValue,
}

/// The decoded value blob of an attribute.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeArguments {
    /// Constructor arguments, in parameter order
    pub fixed: Vec<AttributeValue>,
    /// Field and property assignments
    pub named: Vec<NamedArgument>,
}

/// The type of a value in the blob, from a constructor parameter or a `FieldOrPropType` tag.
#[derive(Debug, Clone, PartialEq)]
enum ElemType {
    Primitive(u8),
    String,
    Type,
    Boxed,
    Enum { type_name: String, underlying: u8 },
    SzArray(Box<ElemType>),
}

struct ArgumentDecoder<'a, 'r> {
    parser: Parser<'a>,
    resolve_enum: &'r dyn Fn(&str) -> Result<u8>,
}

impl ArgumentDecoder<'_, '_> {
    fn field_or_prop_type(&mut self, depth: usize) -> Result<ElemType> {
        if depth > MAX_NESTING {
            return Err(Error::RecursionLimit(MAX_NESTING));
        }

        let tag = self.parser.read_le::<u8>()?;
        Ok(match tag {
            ELEMENT_TYPE::BOOLEAN..=ELEMENT_TYPE::R8 => ElemType::Primitive(tag),
            ELEMENT_TYPE::STRING => ElemType::String,
            SERIALIZATION_TYPE_TYPE => ElemType::Type,
            SERIALIZATION_TYPE_TAGGED_OBJECT => ElemType::Boxed,
            ELEMENT_TYPE::SZARRAY => {
                ElemType::SzArray(Box::new(self.field_or_prop_type(depth + 1)?))
            }
            SERIALIZATION_TYPE_ENUM => {
                let Some(type_name) = self.parser.read_ser_string()? else {
                    return Err(malformed_error!("Enum argument without a type name"));
                };
                let underlying = (self.resolve_enum)(&type_name)?;
                ElemType::Enum {
                    type_name,
                    underlying,
                }
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid attribute argument type {:#04x} at offset {}",
                    tag,
                    self.parser.pos() - 1
                ))
            }
        })
    }

    fn value(&mut self, elem_type: &ElemType, depth: usize) -> Result<AttributeValue> {
        if depth > MAX_NESTING {
            return Err(Error::RecursionLimit(MAX_NESTING));
        }

        Ok(match elem_type {
            ElemType::Primitive(element_type) => self.primitive(*element_type)?,
            ElemType::String => AttributeValue::String(self.parser.read_ser_string()?),
            ElemType::Type => AttributeValue::Type(self.parser.read_ser_string()?),
            ElemType::Boxed => {
                let actual = self.field_or_prop_type(depth + 1)?;
                self.value(&actual, depth + 1)?
            }
            ElemType::Enum {
                type_name,
                underlying,
            } => AttributeValue::Enum {
                type_name: type_name.clone(),
                value: Box::new(self.primitive(*underlying)?),
            },
            ElemType::SzArray(element) => {
                let count = self.parser.read_le::<u32>()?;
                if count == u32::MAX {
                    return Ok(AttributeValue::Array(None));
                }

                let mut values = Vec::with_capacity((count as usize).min(self.parser.remaining()));
                for _ in 0..count {
                    values.push(self.value(element, depth + 1)?);
                }
                AttributeValue::Array(Some(values))
            }
        })
    }

    fn primitive(&mut self, element_type: u8) -> Result<AttributeValue> {
        let parser = &mut self.parser;
        Ok(match element_type {
            ELEMENT_TYPE::BOOLEAN => AttributeValue::Boolean(parser.read_le::<u8>()? != 0),
            ELEMENT_TYPE::CHAR => AttributeValue::Char(parser.read_le()?),
            ELEMENT_TYPE::I1 => AttributeValue::I1(parser.read_le()?),
            ELEMENT_TYPE::U1 => AttributeValue::U1(parser.read_le()?),
            ELEMENT_TYPE::I2 => AttributeValue::I2(parser.read_le()?),
            ELEMENT_TYPE::U2 => AttributeValue::U2(parser.read_le()?),
            ELEMENT_TYPE::I4 => AttributeValue::I4(parser.read_le()?),
            ELEMENT_TYPE::U4 => AttributeValue::U4(parser.read_le()?),
            ELEMENT_TYPE::I8 => AttributeValue::I8(parser.read_le()?),
            ELEMENT_TYPE::U8 => AttributeValue::U8(parser.read_le()?),
            ELEMENT_TYPE::R4 => AttributeValue::R4(parser.read_le()?),
            ELEMENT_TYPE::R8 => AttributeValue::R8(parser.read_le()?),
            _ => {
                return Err(malformed_error!(
                    "Element type {:#04x} cannot be an attribute argument",
                    element_type
                ))
            }
        })
    }
}

/// Decode a value blob whose constructor takes arguments of types `fixed`.
fn decode_arguments(
    blob: &[u8],
    fixed: &[ElemType],
    resolve_enum: &dyn Fn(&str) -> Result<u8>,
) -> Result<AttributeArguments> {
    if blob.is_empty() {
        if fixed.is_empty() {
            return Ok(AttributeArguments::default());
        }
        return Err(malformed_error!(
            "Empty attribute blob for a constructor with {} parameters",
            fixed.len()
        ));
    }

    let mut decoder = ArgumentDecoder {
        parser: Parser::new(blob),
        resolve_enum,
    };

    let prolog = decoder.parser.read_le::<u16>()?;
    if prolog != PROLOG {
        return Err(malformed_error!("Invalid attribute prolog {:#06x}", prolog));
    }

    let mut arguments = AttributeArguments::default();
    for elem_type in fixed {
        arguments.fixed.push(decoder.value(elem_type, 0)?);
    }

    let named_count = if decoder.parser.has_more_data() {
        decoder.parser.read_le::<u16>()?
    } else {
        0
    };

    for _ in 0..named_count {
        let kind = match decoder.parser.read_le::<u8>()? {
            SERIALIZATION_TYPE_FIELD => NamedArgumentKind::Field,
            SERIALIZATION_TYPE_PROPERTY => NamedArgumentKind::Property,
            other => {
                return Err(malformed_error!(
                    "Invalid named argument kind {:#04x}",
                    other
                ))
            }
        };

        let elem_type = decoder.field_or_prop_type(0)?;
        let Some(name) = decoder.parser.read_ser_string()? else {
            return Err(malformed_error!("Named argument without a name"));
        };
        let value = decoder.value(&elem_type, 0)?;

        arguments.named.push(NamedArgument { kind, name, value });
    }

    if decoder.parser.has_more_data() {
        return Err(malformed_error!(
            "Attribute blob has {} trailing bytes",
            decoder.parser.remaining()
        ));
    }

    Ok(arguments)
}

/// The element type of the integral type underlying an enum.
fn enum_underlying(definition: &TypeDefinition) -> Result<u8> {
    let Some(enumeration) = definition.as_enum() else {
        return Err(malformed_error!(
            "{} is used as an enum argument but is not an enum",
            definition.full_name()
        ));
    };

    let underlying = enumeration.underlying_type()?;
    match PrimitiveKind::from_type_name(underlying.namespace().unwrap_or(""), underlying.name()) {
        Some(kind) => Ok(kind.element_type()),
        None => Err(malformed_error!(
            "Enum {} has non-primitive underlying type {}",
            definition.full_name(),
            underlying.full_name()
        )),
    }
}

/// How a constructor parameter of type `node` is stored in the blob.
fn elem_type_of(node: &TypeNode) -> Result<ElemType> {
    match node {
        TypeNode::Bound(bound) => {
            let definition = bound.definition()?;
            if definition.as_enum().is_some() {
                return Ok(ElemType::Enum {
                    type_name: definition.full_name().replace('/', "+"),
                    underlying: enum_underlying(&definition)?,
                });
            }

            if definition.assembly()?.is_core_library() {
                let namespace = definition.namespace().unwrap_or("");
                match PrimitiveKind::from_type_name(namespace, definition.name()) {
                    Some(PrimitiveKind::String) => return Ok(ElemType::String),
                    Some(PrimitiveKind::Object) => return Ok(ElemType::Boxed),
                    Some(kind) => return Ok(ElemType::Primitive(kind.element_type())),
                    None if definition.full_name() == "System.Type" => return Ok(ElemType::Type),
                    None => {}
                }
            }

            Err(malformed_error!(
                "{} cannot be an attribute argument type",
                definition.full_name()
            ))
        }
        TypeNode::Array(element) => Ok(ElemType::SzArray(Box::new(elem_type_of(element)?))),
        other => Err(malformed_error!(
            "{} cannot be an attribute argument type",
            other
        )),
    }
}

/// A custom attribute applied to an entity (`CustomAttribute` row).
pub struct Attribute {
    assembly: EntityRef<Assembly>,
    token: Token,
    owner: Token,
    constructor: EntityRef<crate::metadata::members::Method>,
    attribute_type: TypeDefinitionRef,
    value: Vec<u8>,
    arguments: Memo<AttributeArguments>,
}

impl Attribute {
    pub(crate) fn load(assembly: &Assembly, row: &CustomAttributeRaw) -> Result<Attribute> {
        let constructor: MethodRc = assembly.method_by_token(row.constructor.token)?;
        let attribute_type = constructor.declaring_type()?;

        Ok(Attribute {
            assembly: assembly.entity_ref(),
            token: row.token,
            owner: row.parent.token,
            constructor: EntityRef::new(&constructor),
            attribute_type: TypeDefinitionRef::new(&attribute_type),
            value: assembly.module().blob(row.value)?.to_vec(),
            arguments: Memo::new(),
        })
    }

    /// Token of the `CustomAttribute` row.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Token of the entity the attribute is applied to.
    #[must_use]
    pub fn owner(&self) -> Token {
        self.owner
    }

    /// The attribute constructor, possibly defined in another assembly.
    ///
    /// # Errors
    /// Returns [`Error::EntityDropped`] if the defining assembly was dropped.
    pub fn constructor(&self) -> Result<MethodRc> {
        self.constructor.get()
    }

    /// The attribute class, the type declaring the constructor.
    ///
    /// # Errors
    /// Returns [`Error::EntityDropped`] if the defining assembly was dropped.
    pub fn attribute_type(&self) -> Result<TypeDefinition> {
        self.attribute_type.definition()
    }

    /// The raw value blob.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The decoded constructor and named arguments.
    ///
    /// # Errors
    /// Returns an error if the blob is malformed, a parameter type cannot be stored in an
    /// attribute, or an enum type named in the blob cannot be found.
    pub fn arguments(&self) -> Result<&AttributeArguments> {
        self.arguments.get_or_try_init(|| {
            let assembly = self.assembly.get()?;
            let fixed = self
                .constructor()?
                .params()?
                .iter()
                .map(|param| elem_type_of(param.param_type()))
                .collect::<Result<Vec<_>>>()?;

            let resolve_enum = |type_name: &str| -> Result<u8> {
                match assembly.resolve_reflection_name(type_name)? {
                    Some(definition) => enum_underlying(&definition),
                    None => Err(Error::TypeNotFound(type_name.to_string())),
                }
            };

            decode_arguments(&self.value, &fixed, &resolve_enum)
        })
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("token", &self.token)
            .field("owner", &self.owner)
            .field("attribute_type", &self.attribute_type)
            .finish_non_exhaustive()
    }
}

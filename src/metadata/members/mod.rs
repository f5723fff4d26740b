//! Members of type definitions and the values attached to them.
//!
//! Every member is owned by exactly one [`crate::metadata::typesystem::TypeDefinition`] and
//! refers back to it by row id through its assembly, never by an owning pointer. Like type
//! definitions, members decode their names and flags when they are created and everything
//! else (signatures, parameters, accessors, attributes) on first access.

mod attribute;
mod baseinterface;
mod constant;
mod event;
mod field;
mod method;
mod param;
mod property;

pub use attribute::{
    Attribute, AttributeArguments, AttributeValue, NamedArgument, NamedArgumentKind,
};
pub use baseinterface::BaseInterface;
pub use constant::Constant;
pub use event::{Event, EventRc};
pub use field::{Field, FieldRc};
pub use method::{Constructor, Method, MethodKind, MethodRc};
pub use param::{Param, ReturnParam};
pub use property::{Indexer, Property, PropertyKind, PropertyRc};

use std::sync::Arc;

use crate::{
    metadata::{
        assembly::Assembly,
        tables::MethodSemanticsRaw,
        token::Token,
        typesystem::{TypeDefinition, Visibility},
    },
    Result,
};

/// The surface shared by methods, fields, properties and events.
pub trait Member {
    /// Name of the member.
    fn name(&self) -> &str;

    /// Token of the defining row.
    fn token(&self) -> Token;

    /// Declared accessibility. Properties and events take it from their accessors.
    ///
    /// # Errors
    /// Returns an error if the accessors of a property or event cannot be resolved.
    fn visibility(&self) -> Result<Visibility>;

    /// Whether the member belongs to the type rather than to instances.
    ///
    /// # Errors
    /// Returns an error if the accessors of a property or event cannot be resolved.
    fn is_static(&self) -> Result<bool>;

    /// The type declaring this member.
    ///
    /// # Errors
    /// Returns [`crate::Error::EntityDropped`] if the assembly was dropped.
    fn declaring_type(&self) -> Result<TypeDefinition>;
}

/// Accessor methods of a property or event with their `MethodSemanticsAttributes`, in table
/// order.
fn semantic_methods(assembly: &Assembly, association: Token) -> Result<Vec<(u16, MethodRc)>> {
    let Some(table) = assembly.module().table::<MethodSemanticsRaw>() else {
        return Ok(Vec::new());
    };

    table
        .find_all(association)?
        .into_iter()
        .map(|row| Ok((row.semantics, assembly.method(row.method)?)))
        .collect()
}

/// The first of `candidates` that is present, used to pick the accessor that speaks for a
/// property or event.
fn primary_accessor<'a>(
    candidates: impl IntoIterator<Item = Option<&'a MethodRc>>,
) -> Option<&'a Arc<Method>> {
    candidates.into_iter().flatten().next()
}

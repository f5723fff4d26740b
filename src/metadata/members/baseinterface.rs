use crate::{
    metadata::{
        assembly::Assembly,
        members::Attribute,
        tables::InterfaceImplRaw,
        token::Token,
        typesystem::{BoundType, EntityRef, GenericContext, TypeNode},
    },
    utils::Memo,
    Result,
};

/// An interface a type declares to implement (`InterfaceImpl` row).
///
/// The row can carry attributes of its own, which is why this is more than a [`BoundType`].
pub struct BaseInterface {
    assembly: EntityRef<Assembly>,
    token: Token,
    interface: BoundType,
    attributes: Memo<Vec<Attribute>>,
}

impl BaseInterface {
    pub(crate) fn load(
        assembly: &Assembly,
        row: &InterfaceImplRaw,
        context: &GenericContext,
    ) -> Result<BaseInterface> {
        let interface = match assembly.resolve_type_def_or_ref(row.interface.token, context)? {
            Some(TypeNode::Bound(bound)) => bound,
            _ => {
                return Err(malformed_error!(
                    "InterfaceImpl row {} does not name an interface",
                    row.rid
                ))
            }
        };

        Ok(BaseInterface {
            assembly: assembly.entity_ref(),
            token: row.token,
            interface,
            attributes: Memo::new(),
        })
    }

    /// Token of the `InterfaceImpl` row.
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The implemented interface with its generic arguments.
    #[must_use]
    pub fn interface(&self) -> &BoundType {
        &self.interface
    }

    /// Custom attributes applied to the implementation.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes(&self) -> Result<&[Attribute]> {
        self.attributes
            .get_or_try_init(|| self.assembly.get()?.attributes_of(self.token))
            .map(Vec::as_slice)
    }
}

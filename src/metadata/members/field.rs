use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        assembly::Assembly,
        members::{Attribute, Constant, Member},
        signatures::read_field,
        tables::{FieldAttributes, FieldRaw},
        token::Token,
        typesystem::{Definition, EntityRef, TypeDefinition, TypeNode, Visibility},
    },
    utils::Memo,
    Result,
};

/// Reference to a [`Field`]
pub type FieldRc = Arc<Field>;

/// A field (`Field` row).
pub struct Field {
    assembly: EntityRef<Assembly>,
    declaring_type: u32,
    token: Token,
    /// `FieldAttributes`
    pub flags: u16,
    name: String,
    signature_blob: u32,
    field_type: Memo<TypeNode>,
    constant: Memo<Option<Constant>>,
    attributes: Memo<Vec<Attribute>>,
}

impl Field {
    pub(crate) fn load(assembly: &Assembly, declaring_type: u32, rid: u32) -> Result<FieldRc> {
        let module = assembly.module();
        let row = module.row::<FieldRaw>(rid)?;

        Ok(Arc::new(Field {
            assembly: assembly.entity_ref(),
            declaring_type,
            token: row.token,
            flags: row.flags,
            name: module.string(row.name)?.to_string(),
            signature_blob: row.signature,
            field_type: Memo::new(),
            constant: Memo::new(),
            attributes: Memo::new(),
        }))
    }

    /// `readonly`
    #[must_use]
    pub fn is_init_only(&self) -> bool {
        self.flags & FieldAttributes::INIT_ONLY != 0
    }

    /// `const`, the value is in [`Field::constant`]
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.flags & FieldAttributes::LITERAL != 0
    }

    /// Type of the field, resolved with the generic parameters of the declaring type in scope.
    ///
    /// # Errors
    /// Returns an error if the signature is malformed or its type cannot be resolved.
    pub fn field_type(&self) -> Result<&TypeNode> {
        self.field_type.get_or_try_init(|| {
            let assembly = self.assembly.get()?;
            let signature = read_field(assembly.module().blob(self.signature_blob)?)?;
            let context = self.declaring_type()?.generic_context()?;
            assembly.resolve_type(&signature.base, &context)
        })
    }

    /// Value of a literal field, or the default of a field with `HasDefault`.
    ///
    /// # Errors
    /// Returns an error if the `Constant` row is malformed.
    pub fn constant(&self) -> Result<Option<&Constant>> {
        self.constant
            .get_or_try_init(|| {
                if self.flags & FieldAttributes::HAS_DEFAULT == 0 {
                    return Ok(None);
                }
                self.assembly.get()?.constant_of(self.token)
            })
            .map(Option::as_ref)
    }

    /// Custom attributes applied to the field.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes(&self) -> Result<&[Attribute]> {
        self.attributes
            .get_or_try_init(|| self.assembly.get()?.attributes_of(self.token))
            .map(Vec::as_slice)
    }
}

impl Member for Field {
    fn name(&self) -> &str {
        &self.name
    }

    fn token(&self) -> Token {
        self.token
    }

    fn visibility(&self) -> Result<Visibility> {
        Ok(Visibility::from_member_access(
            self.flags & FieldAttributes::FIELD_ACCESS_MASK,
        ))
    }

    fn is_static(&self) -> Result<bool> {
        Ok(self.flags & FieldAttributes::STATIC != 0)
    }

    fn declaring_type(&self) -> Result<TypeDefinition> {
        self.assembly.get()?.type_definition(self.declaring_type)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("token", &self.token)
            .field("flags", &format_args!("{:#06x}", self.flags))
            .finish_non_exhaustive()
    }
}

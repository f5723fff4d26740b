use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        assembly::Assembly,
        members::Attribute,
        tables::{GenericParamAttributes, GenericParamConstraintRaw, GenericParamRaw, TableId},
        token::Token,
        typesystem::{EntityRef, TypeNode},
    },
    utils::Memo,
    Result,
};

/// Reference to a [`GenericParam`]
pub type GenericParamRc = Arc<GenericParam>;

/// Whether a generic parameter belongs to a type or to a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericParamKind {
    /// Declared by a type, referenced as `VAR` in signatures
    Type,
    /// Declared by a method, referenced as `MVAR` in signatures
    Method,
}

/// A generic parameter declared by a type or a method (`GenericParam` row).
pub struct GenericParam {
    assembly: EntityRef<Assembly>,
    /// Token of the `GenericParam` row
    pub token: Token,
    /// The declaring `TypeDef` or `MethodDef`
    pub owner: Token,
    /// Type or method parameter
    pub kind: GenericParamKind,
    /// 0-based position in the owner's parameter list
    pub number: u32,
    /// Name, e.g. `T`
    pub name: String,
    /// `GenericParamAttributes`
    pub flags: u16,
    owner_arity: usize,
    constraints: Memo<Vec<TypeNode>>,
    attributes: Memo<Vec<Attribute>>,
}

impl GenericParam {
    /// Load the generic parameters of `owner`, ordered by number.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the parameter numbers are not `0..n`.
    pub(crate) fn load_all(assembly: &Assembly, owner: Token) -> Result<Vec<GenericParamRc>> {
        let kind = match owner.table_id() {
            Some(TableId::TypeDef) => GenericParamKind::Type,
            Some(TableId::MethodDef) => GenericParamKind::Method,
            _ => {
                return Err(malformed_error!(
                    "Token {} cannot own generic parameters",
                    owner
                ))
            }
        };

        let module = assembly.module();
        let mut rows = match module.table::<GenericParamRaw>() {
            Some(table) => table.find_all(owner)?,
            None => return Ok(Vec::new()),
        };
        rows.sort_by_key(|row| row.number);

        let owner_arity = rows.len();
        let mut params = Vec::with_capacity(owner_arity);
        for (position, row) in rows.into_iter().enumerate() {
            if usize::from(row.number) != position {
                return Err(malformed_error!(
                    "Generic parameters of {} are not numbered 0..{}",
                    owner,
                    owner_arity
                ));
            }

            params.push(Arc::new(GenericParam {
                assembly: assembly.entity_ref(),
                token: row.token,
                owner,
                kind,
                number: u32::from(row.number),
                name: module.string(row.name)?.to_string(),
                flags: row.flags,
                owner_arity,
                constraints: Memo::new(),
                attributes: Memo::new(),
            }));
        }

        Ok(params)
    }

    /// Number of generic parameters the owner declares.
    #[must_use]
    pub fn owner_arity(&self) -> usize {
        self.owner_arity
    }

    /// Declared as `out T`.
    #[must_use]
    pub fn is_covariant(&self) -> bool {
        self.flags & GenericParamAttributes::VARIANCE_MASK == GenericParamAttributes::COVARIANT
    }

    /// Declared as `in T`.
    #[must_use]
    pub fn is_contravariant(&self) -> bool {
        self.flags & GenericParamAttributes::VARIANCE_MASK
            == GenericParamAttributes::CONTRAVARIANT
    }

    /// `where T : class`
    #[must_use]
    pub fn has_reference_type_constraint(&self) -> bool {
        self.flags & GenericParamAttributes::REFERENCE_TYPE_CONSTRAINT != 0
    }

    /// `where T : struct`
    #[must_use]
    pub fn has_value_type_constraint(&self) -> bool {
        self.flags & GenericParamAttributes::NOT_NULLABLE_VALUE_TYPE_CONSTRAINT != 0
    }

    /// `where T : new()`
    #[must_use]
    pub fn has_default_constructor_constraint(&self) -> bool {
        self.flags & GenericParamAttributes::DEFAULT_CONSTRUCTOR_CONSTRAINT != 0
    }

    /// The owning assembly.
    ///
    /// # Errors
    /// Returns [`crate::Error::EntityDropped`] if the assembly was dropped.
    pub fn assembly(&self) -> Result<Arc<Assembly>> {
        self.assembly.get()
    }

    /// Type constraints (`where T : IComparable<T>`), from `GenericParamConstraint`.
    ///
    /// # Errors
    /// Returns an error if a constraint type cannot be resolved.
    pub fn constraints(&self) -> Result<&[TypeNode]> {
        self.constraints
            .get_or_try_init(|| {
                let assembly = self.assembly.get()?;
                let module = assembly.module();
                let Some(table) = module.table::<GenericParamConstraintRaw>() else {
                    return Ok(Vec::new());
                };

                let context = assembly.generic_context(self.owner)?;
                let mut constraints = Vec::new();
                for row in table.find_all(self.token)? {
                    if let Some(node) =
                        assembly.resolve_type_def_or_ref(row.constraint.token, &context)?
                    {
                        constraints.push(node);
                    }
                }

                Ok(constraints)
            })
            .map(Vec::as_slice)
    }

    /// Custom attributes applied to this parameter.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes(&self) -> Result<&[Attribute]> {
        self.attributes
            .get_or_try_init(|| self.assembly.get()?.attributes_of(self.token))
            .map(Vec::as_slice)
    }
}

impl PartialEq for GenericParam {
    fn eq(&self, other: &Self) -> bool {
        self.assembly == other.assembly && self.token == other.token
    }
}

impl Eq for GenericParam {}

impl fmt::Debug for GenericParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericParam")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("number", &self.number)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for GenericParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

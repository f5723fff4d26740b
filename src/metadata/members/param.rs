use crate::{
    metadata::{
        assembly::Assembly,
        members::{Attribute, Constant},
        signatures::SignatureParameter,
        tables::{ParamAttributes, ParamRaw},
        token::Token,
        typesystem::{EntityRef, GenericContext, TypeNode},
    },
    utils::Memo,
    Result,
};

/// A parameter of a method.
///
/// There is one `Param` per parameter of the method signature. The matching `Param` row,
/// which carries the name, flags and default value, is optional.
pub struct Param {
    assembly: EntityRef<Assembly>,
    token: Option<Token>,
    index: usize,
    name: Option<String>,
    flags: u16,
    param_type: TypeNode,
    by_ref: bool,
    default_value: Memo<Option<Constant>>,
    attributes: Memo<Vec<Attribute>>,
}

impl Param {
    pub(crate) fn load(
        assembly: &Assembly,
        index: usize,
        signature: &SignatureParameter,
        row: Option<&ParamRaw>,
        context: &GenericContext,
    ) -> Result<Param> {
        let name = match row {
            Some(row) if row.name != 0 => Some(assembly.module().string(row.name)?.to_string()),
            _ => None,
        };

        Ok(Param {
            assembly: assembly.entity_ref(),
            token: row.map(|row| row.token),
            index,
            name,
            flags: row.map_or(0, |row| row.flags),
            param_type: assembly.resolve_type(&signature.base, context)?,
            by_ref: signature.by_ref,
            default_value: Memo::new(),
            attributes: Memo::new(),
        })
    }

    /// Name from the `Param` row, if there is one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 0-based position in the signature (`sequence - 1`).
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Token of the `Param` row, if there is one.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.token
    }

    /// `ParamAttributes`, 0 without a `Param` row.
    #[must_use]
    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// `[In]`
    #[must_use]
    pub fn is_in(&self) -> bool {
        self.flags & ParamAttributes::IN != 0
    }

    /// `[Out]`, `out` in C# when combined with by-ref
    #[must_use]
    pub fn is_out(&self) -> bool {
        self.flags & ParamAttributes::OUT != 0
    }

    /// `[Optional]`
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.flags & ParamAttributes::OPTIONAL != 0
    }

    /// Passed by reference (`ref`, `out`, `in` in C#).
    #[must_use]
    pub fn is_by_ref(&self) -> bool {
        self.by_ref
    }

    /// Type of the parameter, without the by-ref marker.
    #[must_use]
    pub fn param_type(&self) -> &TypeNode {
        &self.param_type
    }

    /// Default value from the `Constant` table.
    ///
    /// # Errors
    /// Returns an error if the constant row is malformed.
    pub fn default_value(&self) -> Result<Option<&Constant>> {
        self.default_value
            .get_or_try_init(|| match self.token {
                Some(token) if self.flags & ParamAttributes::HAS_DEFAULT != 0 => {
                    self.assembly.get()?.constant_of(token)
                }
                _ => Ok(None),
            })
            .map(Option::as_ref)
    }

    /// Custom attributes applied to the parameter.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes(&self) -> Result<&[Attribute]> {
        self.attributes
            .get_or_try_init(|| match self.token {
                Some(token) => self.assembly.get()?.attributes_of(token),
                None => Ok(Vec::new()),
            })
            .map(Vec::as_slice)
    }
}

/// The return value of a method, described by the `Param` row with sequence 0 if present.
pub struct ReturnParam {
    assembly: EntityRef<Assembly>,
    token: Option<Token>,
    return_type: TypeNode,
    by_ref: bool,
    attributes: Memo<Vec<Attribute>>,
}

impl ReturnParam {
    pub(crate) fn load(
        assembly: &Assembly,
        signature: &SignatureParameter,
        row: Option<&ParamRaw>,
        context: &GenericContext,
    ) -> Result<ReturnParam> {
        Ok(ReturnParam {
            assembly: assembly.entity_ref(),
            token: row.map(|row| row.token),
            return_type: assembly.resolve_type(&signature.base, context)?,
            by_ref: signature.by_ref,
            attributes: Memo::new(),
        })
    }

    /// The returned type, `System.Void` for methods without a result.
    #[must_use]
    pub fn return_type(&self) -> &TypeNode {
        &self.return_type
    }

    /// Returned by reference (`ref` returns).
    #[must_use]
    pub fn is_by_ref(&self) -> bool {
        self.by_ref
    }

    /// Token of the `Param` row with sequence 0, if there is one.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.token
    }

    /// Custom attributes applied to the return value (`[return: ...]`).
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes(&self) -> Result<&[Attribute]> {
        self.attributes
            .get_or_try_init(|| match self.token {
                Some(token) => self.assembly.get()?.attributes_of(token),
                None => Ok(Vec::new()),
            })
            .map(Vec::as_slice)
    }
}

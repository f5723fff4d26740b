use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        assembly::Assembly,
        members::{Attribute, Member, Param, ReturnParam},
        signatures::{read_method_def, SignatureMethod},
        streams::ChildList,
        tables::{MethodAttributes, MethodDefRaw, ParamRaw},
        token::Token,
        typesystem::{
            Definition, EntityRef, GenericContext, GenericParam, GenericParamRc, TypeDefinition,
            TypeNode, Visibility,
        },
    },
    utils::Memo,
    Result,
};

/// Reference to a [`Method`]
pub type MethodRc = Arc<Method>;

/// What a `MethodDef` row declares, decided by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Any method that is not a constructor
    Method,
    /// Instance (`.ctor`) or type (`.cctor`) constructor
    Constructor,
}

/// A constructor, borrowed from the [`Method`] that declares it.
#[derive(Debug, Clone, Copy)]
pub struct Constructor<'a>(&'a Method);

impl<'a> Constructor<'a> {
    /// The underlying method.
    #[must_use]
    pub fn method(&self) -> &'a Method {
        self.0
    }

    /// Whether this is the type initializer (`.cctor`), which runs once per type and takes
    /// no arguments.
    #[must_use]
    pub fn is_type_initializer(&self) -> bool {
        self.0.name == ".cctor"
    }

    /// Parameters passed to `new`.
    ///
    /// # Errors
    /// Same as [`Method::params`].
    pub fn params(&self) -> Result<&'a [Param]> {
        self.0.params()
    }
}

/// A method or constructor (`MethodDef` row).
pub struct Method {
    assembly: EntityRef<Assembly>,
    declaring_type: u32,
    rid: u32,
    token: Token,
    kind: MethodKind,
    /// RVA of the method body, 0 for abstract and runtime-implemented methods
    pub rva: u32,
    /// `MethodImplAttributes`
    pub impl_flags: u16,
    /// `MethodAttributes`
    pub flags: u16,
    name: String,
    signature_blob: u32,
    signature: Memo<SignatureMethod>,
    generic_params: Memo<Vec<GenericParamRc>>,
    return_param: Memo<ReturnParam>,
    params: Memo<Vec<Param>>,
    attributes: Memo<Vec<Attribute>>,
}

impl Method {
    /// Create the method of `MethodDef` row `rid`, declared by `TypeDef` row `declaring_type`.
    ///
    /// # Errors
    /// Returns an error if the row or its name fails to decode.
    pub(crate) fn load(assembly: &Assembly, declaring_type: u32, rid: u32) -> Result<MethodRc> {
        let module = assembly.module();
        let row = module.row::<MethodDefRaw>(rid)?;
        let name = module.string(row.name)?;
        let kind = match name {
            ".ctor" | ".cctor" => MethodKind::Constructor,
            _ => MethodKind::Method,
        };

        Ok(Arc::new(Method {
            assembly: assembly.entity_ref(),
            declaring_type,
            rid,
            token: row.token,
            kind,
            rva: row.rva,
            impl_flags: row.impl_flags,
            flags: row.flags,
            name: name.to_string(),
            signature_blob: row.signature,
            signature: Memo::new(),
            generic_params: Memo::new(),
            return_param: Memo::new(),
            params: Memo::new(),
            attributes: Memo::new(),
        }))
    }

    /// Row id in the `MethodDef` table.
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.rid
    }

    /// Row id of the declaring type in the `TypeDef` table.
    #[must_use]
    pub fn declaring_type_rid(&self) -> u32 {
        self.declaring_type
    }

    /// The owning assembly.
    ///
    /// # Errors
    /// Returns [`crate::Error::EntityDropped`] if the assembly was dropped.
    pub fn assembly(&self) -> Result<Arc<Assembly>> {
        self.assembly.get()
    }

    /// `virtual`
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.flags & MethodAttributes::VIRTUAL != 0
    }

    /// `abstract`
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags & MethodAttributes::ABSTRACT != 0
    }

    /// `final` (`sealed` in C#)
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.flags & MethodAttributes::FINAL != 0
    }

    /// Whether the name is special to tools (accessors, operators, constructors).
    #[must_use]
    pub fn is_special_name(&self) -> bool {
        self.flags & MethodAttributes::SPECIAL_NAME != 0
    }

    /// Whether this is a constructor or an ordinary method.
    #[must_use]
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    /// The constructor, if this is one.
    #[must_use]
    pub fn as_constructor(&self) -> Option<Constructor<'_>> {
        match self.kind {
            MethodKind::Constructor => Some(Constructor(self)),
            MethodKind::Method => None,
        }
    }

    /// The decoded `MethodDefSig`.
    ///
    /// # Errors
    /// Returns an error if the signature blob is malformed.
    pub fn signature(&self) -> Result<&SignatureMethod> {
        self.signature.get_or_try_init(|| {
            let assembly = self.assembly.get()?;
            read_method_def(assembly.module().blob(self.signature_blob)?)
        })
    }

    /// Generic parameters of the method, ordered by number.
    ///
    /// # Errors
    /// Returns an error if the `GenericParam` rows are malformed.
    pub fn generic_params(&self) -> Result<&[GenericParamRc]> {
        self.generic_params
            .get_or_try_init(|| GenericParam::load_all(&*self.assembly.get()?, self.token))
            .map(Vec::as_slice)
    }

    /// Number of generic parameters.
    ///
    /// # Errors
    /// Returns an error if the `GenericParam` rows are malformed.
    pub fn generic_arity(&self) -> Result<usize> {
        Ok(self.generic_params()?.len())
    }

    /// Number of fixed parameters.
    ///
    /// # Errors
    /// Returns an error if the signature blob is malformed.
    pub fn arity(&self) -> Result<usize> {
        Ok(self.signature()?.params.len())
    }

    /// The generic parameters of the declaring type and of the method.
    ///
    /// # Errors
    /// Returns an error if either parameter list is malformed.
    pub fn generic_context(&self) -> Result<GenericContext> {
        let declaring_type = self.declaring_type()?;
        Ok(GenericContext::new(
            declaring_type.generic_params()?.to_vec(),
            self.generic_params()?.to_vec(),
        ))
    }

    /// The return type and the attributes attached to it.
    ///
    /// # Errors
    /// Returns an error if the signature is malformed or the return type cannot be resolved.
    pub fn return_param(&self) -> Result<&ReturnParam> {
        self.return_param.get_or_try_init(|| {
            let assembly = self.assembly.get()?;
            let context = self.generic_context()?;
            let row = self.param_rows()?.into_iter().find(|row| row.sequence == 0);
            ReturnParam::load(&assembly, &self.signature()?.return_type, row.as_ref(), &context)
        })
    }

    /// Shorthand for the type of [`Method::return_param`].
    ///
    /// # Errors
    /// Same as [`Method::return_param`].
    pub fn return_type(&self) -> Result<&TypeNode> {
        Ok(self.return_param()?.return_type())
    }

    /// One parameter per signature parameter, in order. A parameter without a `Param` row has
    /// no name.
    ///
    /// # Errors
    /// Returns an error if the signature is malformed or a parameter type cannot be resolved.
    pub fn params(&self) -> Result<&[Param]> {
        self.params
            .get_or_try_init(|| {
                let assembly = self.assembly.get()?;
                let context = self.generic_context()?;
                let rows = self.param_rows()?;

                self.signature()?
                    .params
                    .iter()
                    .enumerate()
                    .map(|(index, signature)| {
                        let row = rows
                            .iter()
                            .find(|row| usize::from(row.sequence) == index + 1);
                        Param::load(&assembly, index, signature, row, &context)
                    })
                    .collect()
            })
            .map(Vec::as_slice)
    }

    /// Custom attributes applied to the method.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes(&self) -> Result<&[Attribute]> {
        self.attributes
            .get_or_try_init(|| self.assembly.get()?.attributes_of(self.token))
            .map(Vec::as_slice)
    }

    fn param_rows(&self) -> Result<Vec<ParamRaw>> {
        let assembly = self.assembly.get()?;
        let module = assembly.module();
        module
            .tables()
            .children(ChildList::Params, self.rid)?
            .into_iter()
            .map(|rid| module.row::<ParamRaw>(rid))
            .collect()
    }
}

impl Member for Method {
    fn name(&self) -> &str {
        &self.name
    }

    fn token(&self) -> Token {
        self.token
    }

    fn visibility(&self) -> Result<Visibility> {
        Ok(Visibility::from_member_access(
            self.flags & MethodAttributes::MEMBER_ACCESS_MASK,
        ))
    }

    fn is_static(&self) -> Result<bool> {
        Ok(self.flags & MethodAttributes::STATIC != 0)
    }

    fn declaring_type(&self) -> Result<TypeDefinition> {
        self.assembly.get()?.type_definition(self.declaring_type)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("token", &self.token)
            .field("kind", &self.kind)
            .field("flags", &format_args!("{:#06x}", self.flags))
            .finish_non_exhaustive()
    }
}

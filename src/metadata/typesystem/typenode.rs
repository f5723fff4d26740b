use std::fmt;

use crate::{
    metadata::typesystem::{
        Definition, EntityRef, GenericParam, GenericParamKind, GenericParamRc, TypeDefinition,
        TypeDefinitionData, TypeDefinitionKind,
    },
    Error, Result,
};

/// A non-owning reference to a [`TypeDefinition`] that remembers its kind.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDefinitionRef {
    kind: TypeDefinitionKind,
    data: EntityRef<TypeDefinitionData>,
}

impl TypeDefinitionRef {
    /// Create a reference to `definition`.
    #[must_use]
    pub fn new(definition: &TypeDefinition) -> Self {
        TypeDefinitionRef {
            kind: definition.kind(),
            data: EntityRef::new(definition.data()),
        }
    }

    /// Kind of the referenced definition, available without upgrading.
    #[must_use]
    pub fn kind(&self) -> TypeDefinitionKind {
        self.kind
    }

    /// The referenced definition.
    ///
    /// # Errors
    /// Returns [`Error::EntityDropped`] if its assembly was dropped.
    pub fn definition(&self) -> Result<TypeDefinition> {
        Ok(TypeDefinition::from_data(self.kind, self.data.get()?))
    }

    /// Whether this references `definition`.
    #[must_use]
    pub fn points_to(&self, definition: &TypeDefinition) -> bool {
        self.data.points_to(definition.data())
    }
}

impl fmt::Debug for TypeDefinitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data.get() {
            Ok(data) => write!(f, "{:?} {}", self.kind, data.full_name()),
            Err(_) => write!(f, "{:?} <dropped>", self.kind),
        }
    }
}

/// A type definition together with the generic arguments it is instantiated with.
///
/// The argument list is empty for non-generic definitions and always matches the declared
/// arity otherwise. Two bound types are equal when both the definition and the arguments are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundType {
    definition: TypeDefinitionRef,
    generic_args: Vec<TypeNode>,
}

impl BoundType {
    /// Instantiate `definition` with `generic_args`.
    ///
    /// # Errors
    /// Returns [`Error::GenericArityMismatch`] if the number of arguments differs from the
    /// number of generic parameters of `definition`.
    pub fn new(definition: &TypeDefinition, generic_args: Vec<TypeNode>) -> Result<Self> {
        let expected = definition.generic_arity()?;
        if expected != generic_args.len() {
            return Err(Error::GenericArityMismatch {
                expected,
                actual: generic_args.len(),
            });
        }

        Ok(BoundType {
            definition: TypeDefinitionRef::new(definition),
            generic_args,
        })
    }

    /// The instantiated definition.
    ///
    /// # Errors
    /// Returns [`Error::EntityDropped`] if its assembly was dropped.
    pub fn definition(&self) -> Result<TypeDefinition> {
        self.definition.definition()
    }

    /// The non-owning reference to the definition.
    #[must_use]
    pub fn definition_ref(&self) -> &TypeDefinitionRef {
        &self.definition
    }

    /// The generic arguments, in declaration order.
    #[must_use]
    pub fn generic_args(&self) -> &[TypeNode] {
        &self.generic_args
    }

    /// Specialize the type of a member of the definition (a field type, a parameter type) for
    /// this instantiation.
    ///
    /// # Errors
    /// Returns an error if `node` references type parameters of another arity.
    pub fn bind_member_type(&self, node: &TypeNode) -> Result<TypeNode> {
        if self.generic_args.is_empty() {
            return Ok(node.clone());
        }

        node.bind_generic_params(Some(&self.generic_args), None)
    }

    fn with_args(&self, generic_args: Vec<TypeNode>) -> BoundType {
        BoundType {
            definition: self.definition.clone(),
            generic_args,
        }
    }
}

/// A bound type expression.
///
/// `TypeNode` is what signatures resolve to: every token is replaced by the definition it
/// names, and generic instantiations carry their arguments. Generic parameters stay symbolic
/// until they are bound with [`TypeNode::bind_generic_params`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// A definition with its generic arguments
    Bound(BoundType),
    /// Single-dimensional, zero-based array `T[]`
    Array(Box<TypeNode>),
    /// General array `T[,]` of the given rank
    MdArray {
        /// Element type
        element: Box<TypeNode>,
        /// Number of dimensions
        rank: u32,
    },
    /// Unmanaged pointer; `None` is `void*` (and function pointers)
    Pointer(Option<Box<TypeNode>>),
    /// An unbound generic parameter of a type or method
    GenericParam(EntityRef<GenericParam>),
}

impl TypeNode {
    /// A node for an unbound generic parameter.
    #[must_use]
    pub fn generic_param(param: &GenericParamRc) -> Self {
        TypeNode::GenericParam(EntityRef::new(param))
    }

    /// The bound type, if this is one.
    #[must_use]
    pub fn as_bound(&self) -> Option<&BoundType> {
        match self {
            TypeNode::Bound(bound) => Some(bound),
            _ => None,
        }
    }

    /// The definition of a bound type node.
    ///
    /// # Errors
    /// Returns [`Error::EntityDropped`] if its assembly was dropped.
    pub fn as_definition(&self) -> Result<Option<TypeDefinition>> {
        match self {
            TypeNode::Bound(bound) => bound.definition().map(Some),
            _ => Ok(None),
        }
    }

    /// Whether values of this type are value types; `None` for an unconstrained generic
    /// parameter.
    #[must_use]
    pub fn is_value_type(&self) -> Option<bool> {
        match self {
            TypeNode::Bound(bound) => Some(bound.definition.kind().is_value_type()),
            TypeNode::Array(_) | TypeNode::MdArray { .. } => Some(false),
            TypeNode::Pointer(_) => Some(true),
            TypeNode::GenericParam(param) => {
                let param = param.get().ok()?;
                if param.has_value_type_constraint() {
                    Some(true)
                } else if param.has_reference_type_constraint() {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }

    /// Whether any generic parameter occurs in this tree.
    #[must_use]
    pub fn is_parameterized(&self) -> bool {
        match self {
            TypeNode::Bound(bound) => bound.generic_args.iter().any(TypeNode::is_parameterized),
            TypeNode::Array(element) | TypeNode::MdArray { element, .. } => {
                element.is_parameterized()
            }
            TypeNode::Pointer(pointee) => pointee.as_ref().is_some_and(|p| p.is_parameterized()),
            TypeNode::GenericParam(_) => true,
        }
    }

    /// Rebuild the tree, replacing every generic parameter for which `binder` returns a node.
    ///
    /// # Errors
    /// Returns the first error of `binder`, or [`Error::EntityDropped`] for a parameter whose
    /// owner was dropped.
    pub fn bind_with<F>(&self, binder: &mut F) -> Result<TypeNode>
    where
        F: FnMut(&GenericParam) -> Result<Option<TypeNode>>,
    {
        Ok(match self {
            TypeNode::Bound(bound) => {
                if bound.generic_args.is_empty() {
                    return Ok(self.clone());
                }

                let args = bound
                    .generic_args
                    .iter()
                    .map(|arg| arg.bind_with(binder))
                    .collect::<Result<Vec<_>>>()?;
                TypeNode::Bound(bound.with_args(args))
            }
            TypeNode::Array(element) => TypeNode::Array(Box::new(element.bind_with(binder)?)),
            TypeNode::MdArray { element, rank } => TypeNode::MdArray {
                element: Box::new(element.bind_with(binder)?),
                rank: *rank,
            },
            TypeNode::Pointer(None) => TypeNode::Pointer(None),
            TypeNode::Pointer(Some(pointee)) => {
                TypeNode::Pointer(Some(Box::new(pointee.bind_with(binder)?)))
            }
            TypeNode::GenericParam(param) => {
                let param = param.get()?;
                match binder(&param)? {
                    Some(node) => node,
                    None => self.clone(),
                }
            }
        })
    }

    /// Substitute type-level parameters with `type_args` and method-level parameters with
    /// `method_args`. A `None` list leaves that level unbound.
    ///
    /// # Errors
    /// Returns [`Error::GenericArityMismatch`] if a list does not have exactly as many entries
    /// as the owner of a parameter it is bound against declares.
    pub fn bind_generic_params(
        &self,
        type_args: Option<&[TypeNode]>,
        method_args: Option<&[TypeNode]>,
    ) -> Result<TypeNode> {
        self.bind_with(&mut |param: &GenericParam| {
            let args = match param.kind {
                GenericParamKind::Type => type_args,
                GenericParamKind::Method => method_args,
            };

            let Some(args) = args else {
                return Ok(None);
            };

            if args.len() != param.owner_arity() {
                return Err(Error::GenericArityMismatch {
                    expected: param.owner_arity(),
                    actual: args.len(),
                });
            }

            Ok(args.get(param.number as usize).cloned())
        })
    }
}

/// Strips the `` `N `` arity suffixes from a (possibly nested) type name.
fn without_arity(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '`' && chars.peek().is_some_and(char::is_ascii_digit) {
            while chars.peek().is_some_and(char::is_ascii_digit) {
                chars.next();
            }
        } else {
            result.push(c);
        }
    }
    result
}

impl fmt::Display for BoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(definition) = self.definition() else {
            return f.write_str("<dropped>");
        };

        if self.generic_args.is_empty() {
            return f.write_str(definition.full_name());
        }

        write!(f, "{}<", without_arity(definition.full_name()))?;
        for (index, arg) in self.generic_args.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(">")
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Bound(bound) => write!(f, "{bound}"),
            TypeNode::Array(element) => write!(f, "{element}[]"),
            TypeNode::MdArray { element, rank } => {
                write!(f, "{element}[")?;
                for _ in 1..*rank {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
            TypeNode::Pointer(Some(pointee)) => write!(f, "{pointee}*"),
            TypeNode::Pointer(None) => f.write_str("void*"),
            TypeNode::GenericParam(param) => match param.get() {
                Ok(param) => f.write_str(&param.name),
                Err(_) => f.write_str("<dropped>"),
            },
        }
    }
}

/// The generic parameters in scope while resolving a signature.
///
/// `VAR n` resolves to `type_params[n]` and `MVAR n` to `method_params[n]`.
#[derive(Debug, Clone, Default)]
pub struct GenericContext {
    /// Parameters of the enclosing type
    pub type_params: Vec<GenericParamRc>,
    /// Parameters of the enclosing method
    pub method_params: Vec<GenericParamRc>,
}

impl GenericContext {
    /// A context with the given parameters in scope.
    #[must_use]
    pub fn new(type_params: Vec<GenericParamRc>, method_params: Vec<GenericParamRc>) -> Self {
        GenericContext {
            type_params,
            method_params,
        }
    }

    /// The node for `VAR number` or `MVAR number`.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if no such parameter is in scope.
    pub fn param(&self, kind: GenericParamKind, number: u32) -> Result<TypeNode> {
        let params = match kind {
            GenericParamKind::Type => &self.type_params,
            GenericParamKind::Method => &self.method_params,
        };

        match params.get(number as usize) {
            Some(param) => Ok(TypeNode::generic_param(param)),
            None => Err(malformed_error!(
                "{:?} generic parameter {} referenced but only {} in scope",
                kind,
                number,
                params.len()
            )),
        }
    }
}

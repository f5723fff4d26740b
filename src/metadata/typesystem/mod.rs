//! The logical type model bound from the physical tables.
//!
//! The physical layer only knows rows and tokens. This module turns them into a graph of
//! entities that are materialized on first access:
//!
//! - [`TypeDefinition`]: an unbound type of one of five kinds, with the shared surface on the
//!   [`Definition`] trait
//! - [`BoundType`]: a definition paired with generic arguments
//! - [`TypeNode`]: the tree used wherever a bound type is required (fields, parameters, bases)
//! - [`GenericParam`]: a type or method level generic parameter
//! - [`EntityRef`]: the non-owning handle every entity uses to refer to entities it does not own
//!
//! # Ownership
//!
//! An [`crate::Assembly`] owns its type definitions, a type definition owns its members, a
//! method owns its parameters. Every other edge of the graph (base types, generic arguments,
//! the declaring type of a member, attribute constructors) is an [`EntityRef`] or a row id,
//! so self-referential types and assemblies referencing each other never form ownership cycles.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotmeta::prelude::*;
//!
//! # fn example(assembly: &Assembly) -> dotmeta::Result<()> {
//! if let Some(list) = assembly.resolve_type_definition("System.Collections.Generic.List`1")? {
//!     println!("{} has {} generic parameter(s)", list.full_name(), list.generic_arity()?);
//!     if let Some(add) = list.find_method("Add", &MethodFilter::default())? {
//!         println!("Add takes {}", add.params()?[0].param_type());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod definition;
mod entityref;
mod generic;
mod primitives;
mod typenode;

pub use definition::{
    ClassDefinition, Definition, DelegateDefinition, EnumDefinition, InterfaceDefinition,
    MemberFilter, MethodFilter, StructDefinition, TypeDefinition, TypeDefinitionData, TypeLayout,
};
pub use entityref::EntityRef;
pub use generic::{GenericParam, GenericParamKind, GenericParamRc};
pub use primitives::PrimitiveKind;
pub use typenode::{BoundType, GenericContext, TypeDefinitionRef, TypeNode};

use crate::metadata::tables::TypeAttributes;

/// The five kinds a type definition can have.
///
/// The kind is decided from physical facts only, see
/// [`crate::ModuleFile::type_definition_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDefinitionKind {
    /// Reference type that is none of the others
    Class,
    /// Interface
    Interface,
    /// Derives from `System.MulticastDelegate`
    Delegate,
    /// Derives from `System.ValueType`
    Struct,
    /// Derives from `System.Enum`
    Enum,
}

impl TypeDefinitionKind {
    /// Whether instances of this kind are value types.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(self, TypeDefinitionKind::Struct | TypeDefinitionKind::Enum)
    }
}

/// Accessibility of a type or member, from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    /// Not referenceable (`compilercontrolled`)
    CompilerControlled,
    /// `private`
    Private,
    /// `private protected`
    FamilyAndAssembly,
    /// `internal`
    Assembly,
    /// `protected`
    Family,
    /// `protected internal`
    FamilyOrAssembly,
    /// `public`
    Public,
}

impl Visibility {
    /// Decode the 3-bit member access field shared by fields and methods.
    #[must_use]
    pub fn from_member_access(access: u16) -> Self {
        match access & 0x7 {
            1 => Visibility::Private,
            2 => Visibility::FamilyAndAssembly,
            3 => Visibility::Assembly,
            4 => Visibility::Family,
            5 => Visibility::FamilyOrAssembly,
            6 => Visibility::Public,
            // 7 is reserved, treat like 0
            _ => Visibility::CompilerControlled,
        }
    }

    /// Decode the visibility field of `TypeAttributes`.
    #[must_use]
    pub fn from_type_attributes(flags: u32) -> Self {
        match flags & TypeAttributes::VISIBILITY_MASK {
            TypeAttributes::PUBLIC | TypeAttributes::NESTED_PUBLIC => Visibility::Public,
            TypeAttributes::NESTED_PRIVATE => Visibility::Private,
            TypeAttributes::NESTED_FAMILY => Visibility::Family,
            TypeAttributes::NESTED_FAM_AND_ASSEM => Visibility::FamilyAndAssembly,
            TypeAttributes::NESTED_FAM_OR_ASSEM => Visibility::FamilyOrAssembly,
            // NOT_PUBLIC and NESTED_ASSEMBLY
            _ => Visibility::Assembly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility() {
        assert_eq!(Visibility::from_member_access(0x0006), Visibility::Public);
        assert_eq!(Visibility::from_member_access(0x0091), Visibility::Private);
        assert_eq!(Visibility::from_member_access(0x0007), Visibility::CompilerControlled);
        assert_eq!(
            Visibility::from_type_attributes(TypeAttributes::NOT_PUBLIC),
            Visibility::Assembly
        );
        assert_eq!(
            Visibility::from_type_attributes(TypeAttributes::NESTED_PUBLIC | TypeAttributes::SEALED),
            Visibility::Public
        );
        assert_eq!(
            Visibility::from_type_attributes(TypeAttributes::NESTED_FAM_AND_ASSEM),
            Visibility::FamilyAndAssembly
        );
        assert!(Visibility::Private < Visibility::Public);
    }
}

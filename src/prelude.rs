//! # dotmeta Prelude
//!
//! The types and traits needed by most users of the crate. Import everything with
//! `use dotmeta::prelude::*;` to load assemblies and navigate their definitions.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotmeta operations
pub use crate::Error;

/// The result type used throughout dotmeta
pub use crate::Result;

// ================================================================================================
// Loading
// ================================================================================================

/// Assembly load context and resolvers
pub use crate::{AssemblyLoadContext, AssemblyResolver, CoreLibraryFallback};

/// A loaded assembly and the module it was read from
pub use crate::{Assembly, ModuleFile};

/// Assembly identities
pub use crate::{AssemblyFlags, AssemblyIdentity, AssemblyVersion, PublicKeyToken};

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Metadata System - Core Types
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Metadata root constants
pub use crate::metadata::root::CIL_HEADER_MAGIC;

/// Table identifiers and raw rows of the most used tables
pub use crate::metadata::tables::{
    AssemblyRefRaw, CustomAttributeRaw, FieldRaw, MemberRefRaw, MethodDefRaw, TableId,
    TypeDefRaw, TypeRefRaw, TypeSpecRaw,
};

// ================================================================================================
// Type System
// ================================================================================================

/// Type definitions and the trait they share
pub use crate::metadata::typesystem::{
    ClassDefinition, Definition, DelegateDefinition, EnumDefinition, InterfaceDefinition,
    MemberFilter, MethodFilter, StructDefinition, TypeDefinition, TypeDefinitionKind, TypeLayout,
    Visibility,
};

/// Bound type expressions and generics
pub use crate::metadata::typesystem::{
    BoundType, GenericContext, GenericParam, GenericParamKind, PrimitiveKind, TypeNode,
};

// ================================================================================================
// Members
// ================================================================================================

/// Members of type definitions
pub use crate::metadata::members::{
    Attribute, AttributeArguments, AttributeValue, BaseInterface, Constant, Constructor, Event,
    Field, Indexer, Member, Method, MethodKind, NamedArgument, NamedArgumentKind, Param,
    Property, PropertyKind, ReturnParam,
};

// ================================================================================================
// Signatures
// ================================================================================================

/// Decoded signature blobs
pub use crate::metadata::signatures::{
    SignatureField, SignatureMethod, SignatureParameter, SignatureProperty, SignatureTypeSpec,
    TypeSignature,
};

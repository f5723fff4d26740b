use crate::metadata::token::Token;

#[allow(non_snake_case, dead_code, missing_docs)]
/// Bytes that select a production of the signature grammar (II.23.1.16)
pub mod ELEMENT_TYPE {
    pub const END: u8 = 0x00;
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by type
    pub const PTR: u8 = 0x0f;
    // Followed by type
    pub const BYREF: u8 = 0x10;
    // Followed by TypeDefOrRefOrSpecEncoded
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDefOrRefOrSpecEncoded
    pub const CLASS: u8 = 0x12;
    // Generic parameter of a type, followed by its number
    pub const VAR: u8 = 0x13;
    // type rank boundsCount bound1 … loCount lo1 …
    pub const ARRAY: u8 = 0x14;
    // Followed by type, argument count, arguments
    pub const GENERICINST: u8 = 0x15;
    pub const TYPEDBYREF: u8 = 0x16;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.UIntPtr
    pub const U: u8 = 0x19;
    // Followed by a full method signature
    pub const FNPTR: u8 = 0x1b;
    pub const OBJECT: u8 = 0x1c;
    // Single-dimensional array with 0 lower bound
    pub const SZARRAY: u8 = 0x1d;
    // Generic parameter of a method, followed by its number
    pub const MVAR: u8 = 0x1e;
    pub const CMOD_REQD: u8 = 0x1f;
    pub const CMOD_OPT: u8 = 0x20;
    // Separates fixed from variable arguments in a vararg call site
    pub const SENTINEL: u8 = 0x41;
    pub const PINNED: u8 = 0x45;
}

#[allow(non_snake_case, dead_code, missing_docs)]
/// Leading bytes of method, field and property signatures (II.23.2.1 - II.23.2.5)
pub mod SIGNATURE_HEADER {
    pub const DEFAULT: u8 = 0x00;
    pub const C: u8 = 0x01;
    pub const STDCALL: u8 = 0x02;
    pub const THISCALL: u8 = 0x03;
    pub const FASTCALL: u8 = 0x04;
    pub const VARARG: u8 = 0x05;
    pub const FIELD: u8 = 0x06;
    pub const LOCAL_SIG: u8 = 0x07;
    pub const PROPERTY: u8 = 0x08;
    pub const GENERICINST: u8 = 0x0a;
    // Mask for the calling convention kind
    pub const KIND_MASK: u8 = 0x0f;
    pub const GENERIC: u8 = 0x10;
    pub const HAS_THIS: u8 = 0x20;
    pub const EXPLICIT_THIS: u8 = 0x40;
}

/// A `modreq` or `modopt` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomModifier {
    /// `true` for `CMOD_REQD`, `false` for `CMOD_OPT`
    pub is_required: bool,
    /// The modifier type, a `TypeDef`, `TypeRef` or `TypeSpec` token
    pub modifier_type: Token,
}

/// Size and lower bound of one dimension of a general array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrayDimensions {
    /// Number of elements, if specified
    pub size: Option<u32>,
    /// Lower bound, if specified
    pub lower_bound: Option<i32>,
}

/// A decoded `Type` production (II.23.2.12).
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum TypeSignature {
    Void,
    Boolean,
    Char,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
    I8,
    U8,
    R4,
    R8,
    String,
    Object,
    /// `System.IntPtr`
    I,
    /// `System.UIntPtr`
    U,
    TypedByRef,
    Ptr(SignaturePointer),
    ByRef(Box<TypeSignature>),
    /// Value type, a `TypeDef`, `TypeRef` or `TypeSpec` token
    ValueType(Token),
    /// Reference type, a `TypeDef`, `TypeRef` or `TypeSpec` token
    Class(Token),
    /// Generic parameter of the enclosing type, by number
    GenericParamType(u32),
    /// Generic parameter of the enclosing method, by number
    GenericParamMethod(u32),
    Array(SignatureArray),
    SzArray(SignatureSzArray),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    FnPtr(Box<SignatureMethod>),
    /// A type preceded by custom modifiers in a position that carries no modifier list
    Modified(Vec<CustomModifier>, Box<TypeSignature>),
}

impl TypeSignature {
    /// The type with any leading custom modifiers removed.
    #[must_use]
    pub fn unmodified(&self) -> &TypeSignature {
        let mut current = self;
        while let TypeSignature::Modified(_, inner) = current {
            current = inner;
        }
        current
    }
}

/// A general array: element type, rank and the dimensions that carry sizes or bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureArray {
    /// Element type
    pub base: Box<TypeSignature>,
    /// Number of dimensions
    pub rank: u32,
    /// Leading dimensions with a size or lower bound; may be shorter than `rank`
    pub dimensions: Vec<ArrayDimensions>,
}

/// A single-dimensional, zero-based array.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureSzArray {
    /// Custom modifiers of the element type
    pub modifiers: Vec<CustomModifier>,
    /// Element type
    pub base: Box<TypeSignature>,
}

/// An unmanaged pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct SignaturePointer {
    /// Custom modifiers of the pointee
    pub modifiers: Vec<CustomModifier>,
    /// Pointee type
    pub base: Box<TypeSignature>,
}

/// A parameter or return type (II.23.2.10, II.23.2.11).
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureParameter {
    /// Custom modifiers
    pub modifiers: Vec<CustomModifier>,
    /// Passed by reference
    pub by_ref: bool,
    /// Parameter type
    pub base: TypeSignature,
}

/// `MethodDefSig`, `MethodRefSig` or `StandAloneMethodSig` (II.23.2.1 - II.23.2.3).
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureMethod {
    /// Instance method, `this` is passed implicitly
    pub has_this: bool,
    /// `this` is the first explicit parameter
    pub explicit_this: bool,
    /// Calling convention kind, the low nibble of the header
    pub calling_convention: u8,
    /// Number of generic parameters, 0 for non-generic methods
    pub generic_param_count: u32,
    /// Return type
    pub return_type: SignatureParameter,
    /// Fixed parameters
    pub params: Vec<SignatureParameter>,
    /// Variable arguments following the `SENTINEL` of a vararg call site
    pub varargs: Vec<SignatureParameter>,
}

impl SignatureMethod {
    /// Whether the calling convention is `VARARG`.
    #[must_use]
    pub fn is_vararg(&self) -> bool {
        self.calling_convention == SIGNATURE_HEADER::VARARG
    }

    /// Whether the method declares generic parameters.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.generic_param_count > 0
    }
}

/// `FieldSig` (II.23.2.4).
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureField {
    /// Custom modifiers of the field type
    pub modifiers: Vec<CustomModifier>,
    /// Field type
    pub base: TypeSignature,
}

/// `PropertySig` (II.23.2.5).
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureProperty {
    /// Instance property
    pub has_this: bool,
    /// Custom modifiers of the property type
    pub modifiers: Vec<CustomModifier>,
    /// Property type
    pub base: TypeSignature,
    /// Index parameters; non-empty for indexers
    pub params: Vec<SignatureParameter>,
}

/// `TypeSpec` blob (II.23.2.14).
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureTypeSpec {
    /// The specified type
    pub base: TypeSignature,
}

/// `MethodSpec` blob (II.23.2.15).
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureMethodSpec {
    /// Generic arguments of the instantiation
    pub generic_args: Vec<TypeSignature>,
}

use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::metadata::signatures::{TypeSignature, ELEMENT_TYPE};

/// The built-in types that signatures encode with a single element type byte.
///
/// Each maps to a type definition of the core library (`System.Int32` for `I4`), which is how
/// signatures get bound to [`super::TypeDefinition`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// `System.Void`
    Void,
    /// `System.Boolean`
    Boolean,
    /// `System.Char`
    Char,
    /// `System.SByte`
    I1,
    /// `System.Byte`
    U1,
    /// `System.Int16`
    I2,
    /// `System.UInt16`
    U2,
    /// `System.Int32`
    I4,
    /// `System.UInt32`
    U4,
    /// `System.Int64`
    I8,
    /// `System.UInt64`
    U8,
    /// `System.Single`
    R4,
    /// `System.Double`
    R8,
    /// `System.IntPtr`
    I,
    /// `System.UIntPtr`
    U,
    /// `System.String`
    String,
    /// `System.Object`
    Object,
    /// `System.TypedReference`
    TypedReference,
}

impl PrimitiveKind {
    /// The primitive a signature node stands for, if it is one.
    #[must_use]
    pub fn from_signature(signature: &TypeSignature) -> Option<Self> {
        Some(match signature {
            TypeSignature::Void => PrimitiveKind::Void,
            TypeSignature::Boolean => PrimitiveKind::Boolean,
            TypeSignature::Char => PrimitiveKind::Char,
            TypeSignature::I1 => PrimitiveKind::I1,
            TypeSignature::U1 => PrimitiveKind::U1,
            TypeSignature::I2 => PrimitiveKind::I2,
            TypeSignature::U2 => PrimitiveKind::U2,
            TypeSignature::I4 => PrimitiveKind::I4,
            TypeSignature::U4 => PrimitiveKind::U4,
            TypeSignature::I8 => PrimitiveKind::I8,
            TypeSignature::U8 => PrimitiveKind::U8,
            TypeSignature::R4 => PrimitiveKind::R4,
            TypeSignature::R8 => PrimitiveKind::R8,
            TypeSignature::I => PrimitiveKind::I,
            TypeSignature::U => PrimitiveKind::U,
            TypeSignature::String => PrimitiveKind::String,
            TypeSignature::Object => PrimitiveKind::Object,
            TypeSignature::TypedByRef => PrimitiveKind::TypedReference,
            _ => return None,
        })
    }

    /// The primitive encoded by an element type byte, if it is one.
    #[must_use]
    pub fn from_element_type(element_type: u8) -> Option<Self> {
        Some(match element_type {
            ELEMENT_TYPE::VOID => PrimitiveKind::Void,
            ELEMENT_TYPE::BOOLEAN => PrimitiveKind::Boolean,
            ELEMENT_TYPE::CHAR => PrimitiveKind::Char,
            ELEMENT_TYPE::I1 => PrimitiveKind::I1,
            ELEMENT_TYPE::U1 => PrimitiveKind::U1,
            ELEMENT_TYPE::I2 => PrimitiveKind::I2,
            ELEMENT_TYPE::U2 => PrimitiveKind::U2,
            ELEMENT_TYPE::I4 => PrimitiveKind::I4,
            ELEMENT_TYPE::U4 => PrimitiveKind::U4,
            ELEMENT_TYPE::I8 => PrimitiveKind::I8,
            ELEMENT_TYPE::U8 => PrimitiveKind::U8,
            ELEMENT_TYPE::R4 => PrimitiveKind::R4,
            ELEMENT_TYPE::R8 => PrimitiveKind::R8,
            ELEMENT_TYPE::I => PrimitiveKind::I,
            ELEMENT_TYPE::U => PrimitiveKind::U,
            ELEMENT_TYPE::STRING => PrimitiveKind::String,
            ELEMENT_TYPE::OBJECT => PrimitiveKind::Object,
            ELEMENT_TYPE::TYPEDBYREF => PrimitiveKind::TypedReference,
            _ => return None,
        })
    }

    /// The primitive backed by the type `namespace.name`, if any.
    #[must_use]
    pub fn from_type_name(namespace: &str, name: &str) -> Option<Self> {
        if namespace != "System" {
            return None;
        }
        PrimitiveKind::iter().find(|kind| kind.name() == name)
    }

    /// The element type byte encoding this primitive.
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            PrimitiveKind::Void => ELEMENT_TYPE::VOID,
            PrimitiveKind::Boolean => ELEMENT_TYPE::BOOLEAN,
            PrimitiveKind::Char => ELEMENT_TYPE::CHAR,
            PrimitiveKind::I1 => ELEMENT_TYPE::I1,
            PrimitiveKind::U1 => ELEMENT_TYPE::U1,
            PrimitiveKind::I2 => ELEMENT_TYPE::I2,
            PrimitiveKind::U2 => ELEMENT_TYPE::U2,
            PrimitiveKind::I4 => ELEMENT_TYPE::I4,
            PrimitiveKind::U4 => ELEMENT_TYPE::U4,
            PrimitiveKind::I8 => ELEMENT_TYPE::I8,
            PrimitiveKind::U8 => ELEMENT_TYPE::U8,
            PrimitiveKind::R4 => ELEMENT_TYPE::R4,
            PrimitiveKind::R8 => ELEMENT_TYPE::R8,
            PrimitiveKind::I => ELEMENT_TYPE::I,
            PrimitiveKind::U => ELEMENT_TYPE::U,
            PrimitiveKind::String => ELEMENT_TYPE::STRING,
            PrimitiveKind::Object => ELEMENT_TYPE::OBJECT,
            PrimitiveKind::TypedReference => ELEMENT_TYPE::TYPEDBYREF,
        }
    }

    /// Namespace of the backing type, always `System`.
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        "System"
    }

    /// Name of the backing type within [`PrimitiveKind::namespace`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Void => "Void",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::I1 => "SByte",
            PrimitiveKind::U1 => "Byte",
            PrimitiveKind::I2 => "Int16",
            PrimitiveKind::U2 => "UInt16",
            PrimitiveKind::I4 => "Int32",
            PrimitiveKind::U4 => "UInt32",
            PrimitiveKind::I8 => "Int64",
            PrimitiveKind::U8 => "UInt64",
            PrimitiveKind::R4 => "Single",
            PrimitiveKind::R8 => "Double",
            PrimitiveKind::I => "IntPtr",
            PrimitiveKind::U => "UIntPtr",
            PrimitiveKind::String => "String",
            PrimitiveKind::Object => "Object",
            PrimitiveKind::TypedReference => "TypedReference",
        }
    }

    /// `System.<name>`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_and_element_type_agree() {
        assert_eq!(PrimitiveKind::COUNT, 18);
        for (element_type, kind) in [
            (ELEMENT_TYPE::I4, PrimitiveKind::I4),
            (ELEMENT_TYPE::STRING, PrimitiveKind::String),
            (ELEMENT_TYPE::TYPEDBYREF, PrimitiveKind::TypedReference),
        ] {
            assert_eq!(PrimitiveKind::from_element_type(element_type), Some(kind));
        }

        assert_eq!(PrimitiveKind::from_element_type(ELEMENT_TYPE::CLASS), None);
        assert_eq!(
            PrimitiveKind::from_signature(&TypeSignature::U8),
            Some(PrimitiveKind::U8)
        );
        assert_eq!(PrimitiveKind::from_signature(&TypeSignature::GenericParamType(0)), None);
    }

    #[test]
    fn element_types_round_trip() {
        for kind in PrimitiveKind::iter() {
            assert_eq!(PrimitiveKind::from_element_type(kind.element_type()), Some(kind));
            assert_eq!(PrimitiveKind::from_type_name("System", kind.name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_type_name("Other", "Int32"), None);
        assert_eq!(PrimitiveKind::from_type_name("System", "Type"), None);
    }

    #[test]
    fn names() {
        assert_eq!(PrimitiveKind::I1.full_name(), "System.SByte");
        assert_eq!(PrimitiveKind::U.full_name(), "System.UIntPtr");
        assert!(PrimitiveKind::iter().all(|kind| kind.namespace() == "System"));
    }
}

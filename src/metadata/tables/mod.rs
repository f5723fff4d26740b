//! Raw rows of the metadata tables (ECMA-335 II.22).
//!
//! Every table has a `*Raw` row type mirroring its physical columns: heap indices stay plain
//! integers, simple indices are 1-based row ids and coded indices are decoded into
//! [`CodedIndex`]. Rows are produced on demand by [`MetadataTable`] and hold no references
//! into the stream, so they can be kept after the table view is gone.
//!
//! Resolving heap indices and references into names, signatures and types happens one layer up.

mod types;
pub use types::*;
pub(crate) use types::{create_table_match, impl_table_access};

mod assembly;
pub use assembly::AssemblyRaw;
mod assemblyos;
pub use assemblyos::AssemblyOsRaw;
mod assemblyprocessor;
pub use assemblyprocessor::AssemblyProcessorRaw;
mod assemblyref;
pub use assemblyref::AssemblyRefRaw;
mod assemblyrefos;
pub use assemblyrefos::AssemblyRefOsRaw;
mod assemblyrefprocessor;
pub use assemblyrefprocessor::AssemblyRefProcessorRaw;
mod classlayout;
pub use classlayout::ClassLayoutRaw;
mod constant;
pub use constant::ConstantRaw;
mod customattribute;
pub use customattribute::CustomAttributeRaw;
mod declsecurity;
pub use declsecurity::DeclSecurityRaw;
mod enclog;
pub use enclog::EncLogRaw;
mod encmap;
pub use encmap::EncMapRaw;
mod event;
pub use event::EventRaw;
mod eventmap;
pub use eventmap::EventMapRaw;
mod eventptr;
pub use eventptr::EventPtrRaw;
mod exportedtype;
pub use exportedtype::ExportedTypeRaw;
mod field;
pub use field::{FieldAttributes, FieldRaw};
mod fieldlayout;
pub use fieldlayout::FieldLayoutRaw;
mod fieldmarshal;
pub use fieldmarshal::FieldMarshalRaw;
mod fieldptr;
pub use fieldptr::FieldPtrRaw;
mod fieldrva;
pub use fieldrva::FieldRvaRaw;
mod file;
pub use file::FileRaw;
mod genericparam;
pub use genericparam::{GenericParamAttributes, GenericParamRaw};
mod genericparamconstraint;
pub use genericparamconstraint::GenericParamConstraintRaw;
mod implmap;
pub use implmap::ImplMapRaw;
mod interfaceimpl;
pub use interfaceimpl::InterfaceImplRaw;
mod manifestresource;
pub use manifestresource::ManifestResourceRaw;
mod memberref;
pub use memberref::MemberRefRaw;
mod methoddef;
pub use methoddef::{MethodAttributes, MethodDefRaw};
mod methodimpl;
pub use methodimpl::MethodImplRaw;
mod methodptr;
pub use methodptr::MethodPtrRaw;
mod methodsemantics;
pub use methodsemantics::{MethodSemanticsAttributes, MethodSemanticsRaw};
mod methodspec;
pub use methodspec::MethodSpecRaw;
mod module;
pub use module::ModuleRaw;
mod moduleref;
pub use moduleref::ModuleRefRaw;
mod nestedclass;
pub use nestedclass::NestedClassRaw;
mod param;
pub use param::{ParamAttributes, ParamRaw};
mod paramptr;
pub use paramptr::ParamPtrRaw;
mod property;
pub use property::PropertyRaw;
mod propertymap;
pub use propertymap::PropertyMapRaw;
mod propertyptr;
pub use propertyptr::PropertyPtrRaw;
mod standalonesig;
pub use standalonesig::StandAloneSigRaw;
mod typedef;
pub use typedef::{TypeAttributes, TypeDefRaw};
mod typeref;
pub use typeref::TypeRefRaw;
mod typespec;
pub use typespec::TypeSpecRaw;

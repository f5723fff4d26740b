use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        assembly::Assembly,
        members::{primary_accessor, semantic_methods, Attribute, Member, MethodRc},
        tables::{CodedIndex, EventRaw, MethodSemanticsAttributes},
        token::Token,
        typesystem::{Definition, EntityRef, TypeDefinition, TypeNode, Visibility},
    },
    utils::Memo,
    Result,
};

/// Reference to an [`Event`]
pub type EventRc = Arc<Event>;

#[derive(Default)]
struct EventAccessors {
    add: Option<MethodRc>,
    remove: Option<MethodRc>,
    fire: Option<MethodRc>,
    others: Vec<MethodRc>,
}

/// An event (`Event` row).
pub struct Event {
    assembly: EntityRef<Assembly>,
    declaring_type: u32,
    token: Token,
    /// `EventAttributes`
    pub flags: u16,
    name: String,
    event_type: CodedIndex,
    handler_type: Memo<Option<TypeNode>>,
    accessors: Memo<EventAccessors>,
    attributes: Memo<Vec<Attribute>>,
}

impl Event {
    pub(crate) fn load(assembly: &Assembly, declaring_type: u32, rid: u32) -> Result<EventRc> {
        let module = assembly.module();
        let row = module.row::<EventRaw>(rid)?;

        Ok(Arc::new(Event {
            assembly: assembly.entity_ref(),
            declaring_type,
            token: row.token,
            flags: row.flags,
            name: module.string(row.name)?.to_string(),
            event_type: row.event_type,
            handler_type: Memo::new(),
            accessors: Memo::new(),
            attributes: Memo::new(),
        }))
    }

    /// The delegate type of the event's handlers.
    ///
    /// # Errors
    /// Returns an error if the type cannot be resolved.
    pub fn handler_type(&self) -> Result<Option<&TypeNode>> {
        self.handler_type
            .get_or_try_init(|| {
                if self.event_type.is_null() {
                    return Ok(None);
                }

                let assembly = self.assembly.get()?;
                let context = self.declaring_type()?.generic_context()?;
                assembly.resolve_type_def_or_ref(self.event_type.token, &context)
            })
            .map(Option::as_ref)
    }

    fn accessors(&self) -> Result<&EventAccessors> {
        self.accessors.get_or_try_init(|| {
            let assembly = self.assembly.get()?;
            let mut accessors = EventAccessors::default();
            for (semantics, method) in semantic_methods(&assembly, self.token)? {
                match semantics {
                    MethodSemanticsAttributes::ADD_ON => accessors.add = Some(method),
                    MethodSemanticsAttributes::REMOVE_ON => accessors.remove = Some(method),
                    MethodSemanticsAttributes::FIRE => accessors.fire = Some(method),
                    MethodSemanticsAttributes::OTHER => accessors.others.push(method),
                    _ => {
                        return Err(malformed_error!(
                            "Unexpected semantics {:#06x} for an accessor of event {}",
                            semantics,
                            self.name
                        ))
                    }
                }
            }
            Ok(accessors)
        })
    }

    /// The `add` accessor.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn add_accessor(&self) -> Result<Option<&MethodRc>> {
        Ok(self.accessors()?.add.as_ref())
    }

    /// The `remove` accessor.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn remove_accessor(&self) -> Result<Option<&MethodRc>> {
        Ok(self.accessors()?.remove.as_ref())
    }

    /// The `raise` accessor, which C# never emits.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn fire_accessor(&self) -> Result<Option<&MethodRc>> {
        Ok(self.accessors()?.fire.as_ref())
    }

    /// Accessors that are none of add, remove and fire.
    ///
    /// # Errors
    /// Returns an error if the `MethodSemantics` rows are malformed.
    pub fn other_accessors(&self) -> Result<&[MethodRc]> {
        Ok(&self.accessors()?.others)
    }

    fn primary(&self) -> Result<Option<&MethodRc>> {
        let accessors = self.accessors()?;
        Ok(primary_accessor([
            accessors.add.as_ref(),
            accessors.remove.as_ref(),
            accessors.fire.as_ref(),
            accessors.others.first(),
        ]))
    }

    /// Custom attributes applied to the event.
    ///
    /// # Errors
    /// Returns an error if an attribute row or its constructor cannot be resolved.
    pub fn attributes(&self) -> Result<&[Attribute]> {
        self.attributes
            .get_or_try_init(|| self.assembly.get()?.attributes_of(self.token))
            .map(Vec::as_slice)
    }
}

impl Member for Event {
    fn name(&self) -> &str {
        &self.name
    }

    fn token(&self) -> Token {
        self.token
    }

    fn visibility(&self) -> Result<Visibility> {
        match self.primary()? {
            Some(accessor) => accessor.visibility(),
            None => Ok(Visibility::Public),
        }
    }

    fn is_static(&self) -> Result<bool> {
        match self.primary()? {
            Some(accessor) => accessor.is_static(),
            None => Ok(false),
        }
    }

    fn declaring_type(&self) -> Result<TypeDefinition> {
        self.assembly.get()?.type_definition(self.declaring_type)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

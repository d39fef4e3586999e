use ecs_history_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

use crate::{
    ChangeSerializer, Component, DynComponent, HistoryError, StableEntity, WireMode,
};

// ChangeKind
/// Wire tag of a single change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Construct,
    UpdateFull,
    UpdateNewOnly,
    DestructFull,
    DestructNewOnly,
}

impl ChangeKind {
    pub fn to_u8(&self) -> u8 {
        match self {
            ChangeKind::Construct => 0,
            ChangeKind::UpdateFull => 1,
            ChangeKind::UpdateNewOnly => 2,
            ChangeKind::DestructFull => 3,
            ChangeKind::DestructNewOnly => 4,
        }
    }

    pub fn from_u8(tag: u8) -> Result<Self, SerdeErr> {
        match tag {
            0 => Ok(ChangeKind::Construct),
            1 => Ok(ChangeKind::UpdateFull),
            2 => Ok(ChangeKind::UpdateNewOnly),
            3 => Ok(ChangeKind::DestructFull),
            4 => Ok(ChangeKind::DestructNewOnly),
            _ => Err(SerdeErr::InvalidChangeKind { tag }),
        }
    }

    /// `Compact` for the kinds that carry no old value
    pub fn wire_mode(&self) -> WireMode {
        match self {
            ChangeKind::UpdateNewOnly | ChangeKind::DestructNewOnly => WireMode::Compact,
            _ => WireMode::Full,
        }
    }
}

impl Serde for ChangeKind {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.to_u8().ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Self::from_u8(u8::de(reader)?)
    }

    fn byte_length(&self) -> u32 {
        1
    }
}

// Change
/// One mutation of a component of type `C` on one entity
#[derive(Clone, Debug, PartialEq)]
pub enum Change<C: Component> {
    Construct { entity: StableEntity, value: C },
    Update { entity: StableEntity, old: C, new: C },
    Destruct { entity: StableEntity, old: C },
}

impl<C: Component> Change<C> {
    pub fn entity(&self) -> StableEntity {
        match self {
            Change::Construct { entity, .. }
            | Change::Update { entity, .. }
            | Change::Destruct { entity, .. } => *entity,
        }
    }

    /// The change that undoes this one
    pub fn invert(&self) -> Self {
        match self {
            Change::Construct { entity, value } => Change::Destruct {
                entity: *entity,
                old: value.clone(),
            },
            Change::Update { entity, old, new } => Change::Update {
                entity: *entity,
                old: new.clone(),
                new: old.clone(),
            },
            Change::Destruct { entity, old } => Change::Construct {
                entity: *entity,
                value: old.clone(),
            },
        }
    }

    pub fn apply<V: ChangeVisitor<C>>(&self, visitor: &mut V) -> Result<(), V::Error> {
        match self {
            Change::Construct { entity, value } => visitor.construct(*entity, value),
            Change::Update { entity, old, new } => visitor.update(*entity, old, new),
            Change::Destruct { entity, old } => visitor.destruct(*entity, old),
        }
    }

    /// Size of this change on the wire in full mode
    pub fn byte_size(&self) -> usize {
        let values = match self {
            Change::Construct { value, .. } => value.byte_length(),
            Change::Update { old, new, .. } => old.byte_length() + new.byte_length(),
            Change::Destruct { old, .. } => old.byte_length(),
        };
        (self.entity().byte_length() + 1 + values) as usize
    }

    pub fn write(&self, writer: &mut dyn ByteWrite, mode: WireMode) {
        let mut serializer = ChangeSerializer::new(writer, mode);
        match self.apply(&mut serializer) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Reads one change. Kinds that omit the old value fill it with
    /// `C::default()`.
    pub fn read(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self::read_tagged(reader)?.0)
    }

    /// Like `read`, also returning the tag the change was written with
    pub fn read_tagged(reader: &mut ByteReader) -> Result<(Self, ChangeKind), SerdeErr> {
        let entity = StableEntity::de(reader)?;
        let kind = ChangeKind::de(reader)?;
        let change = match kind {
            ChangeKind::Construct => Change::Construct {
                entity,
                value: C::de(reader)?,
            },
            ChangeKind::UpdateFull => {
                let old = C::de(reader)?;
                let new = C::de(reader)?;
                Change::Update { entity, old, new }
            }
            ChangeKind::UpdateNewOnly => Change::Update {
                entity,
                old: C::default(),
                new: C::de(reader)?,
            },
            ChangeKind::DestructFull => Change::Destruct {
                entity,
                old: C::de(reader)?,
            },
            ChangeKind::DestructNewOnly => Change::Destruct {
                entity,
                old: C::default(),
            },
        };
        Ok((change, kind))
    }
}

// ChangeVisitor
/// Consumer of typed changes
pub trait ChangeVisitor<C: Component> {
    type Error;

    fn construct(&mut self, entity: StableEntity, value: &C) -> Result<(), Self::Error>;
    fn update(&mut self, entity: StableEntity, old: &C, new: &C) -> Result<(), Self::Error>;
    fn destruct(&mut self, entity: StableEntity, old: &C) -> Result<(), Self::Error>;
}

// AnyChangeVisitor
/// Consumer of changes whose component type is only known at runtime
pub trait AnyChangeVisitor {
    fn construct(&mut self, entity: StableEntity, value: &dyn DynComponent) -> Result<(), HistoryError>;
    fn update(
        &mut self,
        entity: StableEntity,
        old: &dyn DynComponent,
        new: &dyn DynComponent,
    ) -> Result<(), HistoryError>;
    fn destruct(&mut self, entity: StableEntity, old: &dyn DynComponent) -> Result<(), HistoryError>;
}

// AnyChangeAdapter
/// Bridges typed changes into an `AnyChangeVisitor`
pub struct AnyChangeAdapter<'v> {
    inner: &'v mut dyn AnyChangeVisitor,
}

impl<'v> AnyChangeAdapter<'v> {
    pub fn new(inner: &'v mut dyn AnyChangeVisitor) -> Self {
        Self { inner }
    }
}

impl<'v, C: Component> ChangeVisitor<C> for AnyChangeAdapter<'v> {
    type Error = HistoryError;

    fn construct(&mut self, entity: StableEntity, value: &C) -> Result<(), Self::Error> {
        self.inner.construct(entity, value)
    }

    fn update(&mut self, entity: StableEntity, old: &C, new: &C) -> Result<(), Self::Error> {
        self.inner.update(entity, old, new)
    }

    fn destruct(&mut self, entity: StableEntity, old: &C) -> Result<(), Self::Error> {
        self.inner.destruct(entity, old)
    }
}

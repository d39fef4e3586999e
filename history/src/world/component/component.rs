use std::{
    any::Any,
    fmt::{Debug, Formatter},
};

use ecs_history_serde::{ByteReader, ByteWrite, ConstByteLength, Serde, SerdeErr};

/// A typed component value tracked by the history.
/// `NAME` must be identical on every replica, it is hashed into the
/// component's wire id.
pub trait Component: Clone + Default + PartialEq + Debug + Send + Sync + Serde + 'static {
    const NAME: &'static str;
}

// ComponentKind
/// Wire identifier of a component type: the 64-bit FNV-1a hash of its name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind(u64);

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl ComponentKind {
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = FNV_OFFSET_BASIS;
        let mut index = 0;
        while index < bytes.len() {
            hash ^= bytes[index] as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
            index += 1;
        }
        Self(hash)
    }

    pub fn of<C: Component>() -> Self {
        Self::from_name(C::NAME)
    }

    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub const fn to_u64(&self) -> u64 {
        self.0
    }
}

impl Serde for ComponentKind {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self(u64::de(reader)?))
    }

    fn byte_length(&self) -> u32 {
        <Self as ConstByteLength>::const_byte_length()
    }
}

impl ConstByteLength for ComponentKind {
    fn const_byte_length() -> u32 {
        u64::const_byte_length()
    }
}

// DynComponent
/// Type-erased view of a `Component`, used wherever the concrete type is
/// not known statically (world storage, change application).
pub trait DynComponent: Any + Send + Sync {
    fn kind(&self) -> ComponentKind;
    fn name(&self) -> &'static str;
    fn copy_to_box(&self) -> Box<dyn DynComponent>;
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynComponent) -> bool;
    fn dyn_fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result;
    fn write(&self, writer: &mut dyn ByteWrite);
    fn encoded_length(&self) -> u32;
}

impl<C: Component> DynComponent for C {
    fn kind(&self) -> ComponentKind {
        ComponentKind::of::<C>()
    }

    fn name(&self) -> &'static str {
        C::NAME
    }

    fn copy_to_box(&self) -> Box<dyn DynComponent> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynComponent) -> bool {
        other
            .as_any()
            .downcast_ref::<C>()
            .is_some_and(|other| self == other)
    }

    fn dyn_fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }

    fn write(&self, writer: &mut dyn ByteWrite) {
        self.ser(writer);
    }

    fn encoded_length(&self) -> u32 {
        Serde::byte_length(self)
    }
}

impl dyn DynComponent {
    pub fn downcast_ref<C: Component>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }

    pub fn is<C: Component>(&self) -> bool {
        self.as_any().is::<C>()
    }
}

impl Debug for dyn DynComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.dyn_fmt(f)
    }
}

impl PartialEq for dyn DynComponent {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Clone for Box<dyn DynComponent> {
    fn clone(&self) -> Self {
        self.copy_to_box()
    }
}

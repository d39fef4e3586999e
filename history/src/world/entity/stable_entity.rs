use ecs_history_serde::{ByteReader, ByteWrite, ConstByteLength, Serde, SerdeErr};

// StableEntity
/// Identifier of a logical entity that is the same on every replica.
/// Never a storage handle: serialized state only ever carries these.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct StableEntity(u64);

impl StableEntity {
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub const fn to_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for StableEntity {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Serde for StableEntity {
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

impl ConstByteLength for StableEntity {
    fn const_byte_length() -> u32 {
        u64::const_byte_length()
    }
}

use crate::{
    byte_reader::ByteReader,
    byte_writer::ByteWrite,
    error::SerdeErr,
    serde::{ConstByteLength, Serde},
};

macro_rules! impl_serde_le {
    ($($ty:ty),* $(,)?) => {$(
        impl Serde for $ty {
            fn ser(&self, writer: &mut dyn ByteWrite) {
                writer.write_bytes(&self.to_le_bytes());
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                let bytes = reader.read_array::<{ std::mem::size_of::<$ty>() }>()?;
                Ok(<$ty>::from_le_bytes(bytes))
            }

            fn byte_length(&self) -> u32 {
                <Self as ConstByteLength>::const_byte_length()
            }
        }

        impl ConstByteLength for $ty {
            fn const_byte_length() -> u32 {
                std::mem::size_of::<$ty>() as u32
            }
        }
    )*};
}

impl_serde_le!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

// Bool

impl Serde for bool {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(SerdeErr::InvalidValue { context: "bool" }),
        }
    }

    fn byte_length(&self) -> u32 {
        1
    }
}

impl ConstByteLength for bool {
    fn const_byte_length() -> u32 {
        1
    }
}

// String

impl Serde for String {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        (self.len() as u32).ser(writer);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = u32::de(reader)? as usize;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr::InvalidValue {
            context: "utf-8 string",
        })
    }

    fn byte_length(&self) -> u32 {
        4 + self.len() as u32
    }
}

// Option

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            Some(value) => {
                true.ser(writer);
                value.ser(writer);
            }
            None => false.ser(writer),
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }

    fn byte_length(&self) -> u32 {
        1 + self.as_ref().map_or(0, Serde::byte_length)
    }
}

// Vec

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        (self.len() as u32).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = u32::de(reader)? as usize;
        // never trust the length prefix for preallocation
        let mut output = Vec::with_capacity(length.min(reader.remaining()));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }

    fn byte_length(&self) -> u32 {
        4 + self.iter().map(Serde::byte_length).sum::<u32>()
    }
}

// Tuples

impl<A: Serde, B: Serde> Serde for (A, B) {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?))
    }

    fn byte_length(&self) -> u32 {
        self.0.byte_length() + self.1.byte_length()
    }
}

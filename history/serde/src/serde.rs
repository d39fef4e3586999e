use crate::{byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr};

/// A type that can be written to and read back from the wire
pub trait Serde: Sized {
    /// Writes the value into the given writer
    fn ser(&self, writer: &mut dyn ByteWrite);

    /// Reads a value from the given reader
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` will write for this value
    fn byte_length(&self) -> u32;
}

/// Implemented by types whose encoded size never depends on the value
pub trait ConstByteLength {
    fn const_byte_length() -> u32;
}

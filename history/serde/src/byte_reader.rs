use crate::error::SerdeErr;

/// Cursor over a received byte buffer
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    cursor: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], SerdeErr> {
        if self.remaining() < count {
            return Err(SerdeErr::UnexpectedEnd {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let start = self.cursor;
        self.cursor += count;
        Ok(&self.buffer[start..self.cursor])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let bytes = self.read_bytes(N)?;
        let mut output = [0u8; N];
        output.copy_from_slice(bytes);
        Ok(output)
    }

    /// Fails if any bytes remain unread
    pub fn finish(&self) -> Result<(), SerdeErr> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(SerdeErr::TrailingBytes {
                remaining: self.remaining(),
            })
        }
    }
}

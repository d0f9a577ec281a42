use crate::error::{Error, Result};

/// Big-endian cursor over a byte slice.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn read_u1(&mut self) -> Result<u8> {
        let b = *self.bytes.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn read_u2(&mut self) -> Result<u16> {
        let b = self.read_array::<2>()?;
        Ok(u16::from_be_bytes(b))
    }

    pub(crate) fn read_u4(&mut self) -> Result<u32> {
        let b = self.read_array::<4>()?;
        Ok(u32::from_be_bytes(b))
    }

    pub(crate) fn read_i4(&mut self) -> Result<i32> {
        let b = self.read_array::<4>()?;
        Ok(i32::from_be_bytes(b))
    }

    pub(crate) fn read_u8(&mut self) -> Result<u64> {
        let b = self.read_array::<8>()?;
        Ok(u64::from_be_bytes(b))
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(Error::UnexpectedEof)?;
        let slice = self.bytes.get(self.pos..end).ok_or(Error::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub(crate) fn ensure_empty(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Other("trailing bytes after structure"))
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }
}

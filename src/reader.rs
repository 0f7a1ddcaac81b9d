//! Forward-only little-endian cursor over an untrusted byte stream.

use crate::config::DEFAULT_MAX_ELEMENTS;
use crate::error::{DecodeError, Result};
use crate::types::{FixedString, Tag, Vec3};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, BufRead, Read};

/// Upper bound on the capacity reserved up front for any array. Larger
/// arrays grow as records arrive.
const PREALLOC_CAP: usize = 4096;

/// Counts every byte handed out by the inner reader.
struct Tracked<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> Read for Tracked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.offset += n as u64;
        Ok(n)
    }
}

/// A record with a fixed on-disk shape that doesn't depend on the format variant.
pub trait ReadRecord: Sized {
    fn read_record<R: BufRead>(reader: &mut Reader<R>) -> Result<Self>;
}

impl ReadRecord for Vec3 {
    fn read_record<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        reader.read_vec3()
    }
}

pub struct Reader<R> {
    inner: Tracked<R>,
    max_elements: usize,
}

impl<R: BufRead> Reader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limit(inner, DEFAULT_MAX_ELEMENTS)
    }

    pub fn with_limit(inner: R, max_elements: usize) -> Self {
        Self {
            inner: Tracked { inner, offset: 0 },
            max_elements,
        }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.inner.offset
    }

    fn map_err(&self, err: io::Error) -> DecodeError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::UnexpectedEof { offset: self.inner.offset }
        } else {
            DecodeError::Io(err)
        }
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.inner.read_i16::<LittleEndian>().map_err(|e| self.map_err(e))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.inner.read_i32::<LittleEndian>().map_err(|e| self.map_err(e))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.inner.read_u32::<LittleEndian>().map_err(|e| self.map_err(e))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.inner.read_f32::<LittleEndian>().map_err(|e| self.map_err(e))
    }

    pub fn read_tag(&mut self) -> Result<Tag> {
        self.read_u32().map(Tag)
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub fn read_fixed_string<const N: usize>(&mut self) -> Result<FixedString<N>> {
        let mut bytes = [0u8; N];
        self.inner.read_exact(&mut bytes).map_err(|e| self.map_err(e))?;
        Ok(FixedString(bytes))
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(count.min(PREALLOC_CAP));
        let result = (&mut self.inner).take(count as u64).read_to_end(&mut bytes);
        let read = result.map_err(|e| self.map_err(e))?;
        if read < count {
            return Err(DecodeError::UnexpectedEof { offset: self.inner.offset });
        }
        Ok(bytes)
    }

    pub fn read_i16_array(&mut self, count: usize) -> Result<Vec<i16>> {
        let mut values = vec![0i16; count];
        self.inner
            .read_i16_into::<LittleEndian>(&mut values)
            .map_err(|e| self.map_err(e))?;
        Ok(values)
    }

    pub fn read_i32_array(&mut self, count: usize) -> Result<Vec<i32>> {
        self.read_records(count, |r| r.read_i32())
    }

    pub fn read_array<T: ReadRecord>(&mut self, count: usize) -> Result<Vec<T>> {
        self.read_records(count, |r| T::read_record(r))
    }

    /// Reads `count` records with `read_one`, in stream order.
    pub fn read_records<T>(
        &mut self,
        count: usize,
        mut read_one: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut records = Vec::with_capacity(count.min(PREALLOC_CAP));
        for _ in 0..count {
            records.push(read_one(self)?);
        }
        Ok(records)
    }

    /// True once no bytes remain.
    pub fn is_exhausted(&mut self) -> Result<bool> {
        Ok(self.inner.inner.fill_buf()?.is_empty())
    }

    /// Validates a count field read from the stream.
    pub fn count(&self, what: &'static str, raw: i64) -> Result<usize> {
        if raw < 0 {
            return Err(DecodeError::NegativeCount { what, count: raw });
        }
        match usize::try_from(raw) {
            Ok(count) if count <= self.max_elements => Ok(count),
            _ => Err(DecodeError::CountTooLarge {
                what,
                count: raw,
                limit: self.max_elements,
            }),
        }
    }
}

//! Fixed-width bit container.
//!
//! Bits are stored most-significant first: index 0 of the backing vector is
//! the bit that is transmitted first. Numeric values are read and written
//! with bit 0 as the least significant bit, which lives at the *end* of the
//! vector.

use std::fmt;

use crate::error::{CodegenError, CodegenResult};

/// A named, fixed-width run of bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitPacker {
    name: String,
    bits: Vec<bool>,
}

impl BitPacker {
    /// A zero-filled packer of `width` bits.
    pub fn new(name: impl Into<String>, width: u64) -> Self {
        Self {
            name: name.into(),
            bits: vec![false; width as usize],
        }
    }

    /// A packer of `width` bits holding `value`.
    pub fn with_value(name: impl Into<String>, width: u64, value: u64) -> CodegenResult<Self> {
        let mut packer = Self::new(name, width);
        packer.set(value)?;
        Ok(packer)
    }

    /// A packer of `width` bits, every one set.
    pub fn ones(name: impl Into<String>, width: u64) -> Self {
        Self {
            name: name.into(),
            bits: vec![true; width as usize],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u64 {
        self.bits.len() as u64
    }

    /// Overwrite the stored bits with `value`.
    pub fn set(&mut self, value: u64) -> CodegenResult<()> {
        let width = self.width();
        if width < 64 && value >> width != 0 {
            return Err(CodegenError::FieldOverflow {
                field: self.name.clone(),
                width,
                value,
                span: None,
            });
        }
        for (i, bit) in self.bits.iter_mut().rev().enumerate() {
            *bit = i < 64 && (value >> i) & 1 == 1;
        }
        Ok(())
    }

    /// Set the bit at `index`, counted from the least significant end.
    pub fn set_flag(&mut self, index: u64) -> CodegenResult<()> {
        let width = self.width();
        if index >= width {
            return Err(CodegenError::FlagOutOfRange {
                field: self.name.clone(),
                index,
                width,
                span: None,
            });
        }
        self.bits[(width - 1 - index) as usize] = true;
        Ok(())
    }

    /// Whether the bit at `index` (from the least significant end) is set.
    pub fn flag(&self, index: u64) -> bool {
        let width = self.width();
        index < width && self.bits[(width - 1 - index) as usize]
    }

    /// The unsigned value of the low 64 bits.
    pub fn get(&self) -> u64 {
        let skip = self.bits.len().saturating_sub(64);
        self.bits[skip..]
            .iter()
            .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit))
    }

    /// Serialize as big-endian bytes. A trailing partial byte is padded with
    /// zeros in its low bits.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |byte, (i, &bit)| byte | (u8::from(bit) << (7 - i)))
            })
            .collect()
    }

    /// A new packer holding `self`'s bits followed by `other`'s.
    ///
    /// `self` occupies the most significant end of the result.
    pub fn concat(&self, other: &BitPacker) -> BitPacker {
        let mut bits = Vec::with_capacity(self.bits.len() + other.bits.len());
        bits.extend_from_slice(&self.bits);
        bits.extend_from_slice(&other.bits);
        BitPacker {
            name: self.name.clone(),
            bits,
        }
    }

    /// Append `other`'s bits in place.
    pub fn append(&mut self, other: &BitPacker) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Splice `other` in after the first `index` transmitted bits.
    pub fn insert_at(&mut self, index: u64, other: &BitPacker) -> CodegenResult<()> {
        let width = self.width();
        if index > width {
            return Err(CodegenError::InsertOutOfRange {
                field: self.name.clone(),
                index,
                width,
            });
        }
        let at = index as usize;
        self.bits.splice(at..at, other.bits.iter().copied());
        Ok(())
    }
}

impl fmt::Display for BitPacker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

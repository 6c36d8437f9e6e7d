//! Variable-width numeric fields.
//!
//! A small opcode announces how many bytes the value after it occupies, so
//! small values stay small on the wire.

use crate::error::CodegenResult;
use crate::fields::{FieldId, FieldSet};

/// Field name suffix shared by every width opcode.
pub const WIDTH_OPCODE: &str = "byte width opcode";

fn byte_count(value: u64) -> u64 {
    match value {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

/// 2-bit width opcode: the value takes 1 to 4 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode2 {
    Bytes1 = 0,
    Bytes2 = 1,
    Bytes3 = 2,
    Bytes4 = 3,
}

impl Opcode2 {
    pub const WIDTH: u64 = 2;

    pub fn for_value(value: u64) -> Self {
        match byte_count(value) {
            1 => Self::Bytes1,
            2 => Self::Bytes2,
            3 => Self::Bytes3,
            _ => Self::Bytes4,
        }
    }

    pub fn code(self) -> u64 {
        self as u64
    }

    /// Width of the value field in bits.
    pub fn value_width(self) -> u64 {
        (self.code() + 1) * 8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bytes1 => "Bytes1",
            Self::Bytes2 => "Bytes2",
            Self::Bytes3 => "Bytes3",
            Self::Bytes4 => "Bytes4",
        }
    }
}

/// 3-bit width opcode: like [`Opcode2`] plus a zero case with no value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode3 {
    Bytes0 = 0,
    Bytes1 = 1,
    Bytes2 = 2,
    Bytes3 = 3,
    Bytes4 = 4,
}

impl Opcode3 {
    pub const WIDTH: u64 = 3;

    pub fn for_value(value: u64) -> Self {
        if value == 0 {
            return Self::Bytes0;
        }
        match byte_count(value) {
            1 => Self::Bytes1,
            2 => Self::Bytes2,
            3 => Self::Bytes3,
            _ => Self::Bytes4,
        }
    }

    pub fn code(self) -> u64 {
        self as u64
    }

    pub fn value_width(self) -> u64 {
        self.code() * 8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bytes0 => "Bytes0",
            Self::Bytes1 => "Bytes1",
            Self::Bytes2 => "Bytes2",
            Self::Bytes3 => "Bytes3",
            Self::Bytes4 => "Bytes4",
        }
    }
}

/// Push a 2-bit width opcode and the value it describes.
pub fn push_var2(fields: &mut FieldSet, name: &str, value: u64) -> CodegenResult<FieldId> {
    let op = Opcode2::for_value(value);
    fields.push_value(WIDTH_OPCODE, Opcode2::WIDTH, op.code())?;
    fields.push_value(name, op.value_width(), value)
}

/// Push a 2-bit width opcode sized for `sized_by` but holding `value`.
pub fn push_var2_sized(
    fields: &mut FieldSet,
    name: &str,
    sized_by: u64,
    value: u64,
) -> CodegenResult<FieldId> {
    let op = Opcode2::for_value(sized_by);
    fields.push_value(WIDTH_OPCODE, Opcode2::WIDTH, op.code())?;
    fields.push_value(name, op.value_width(), value)
}

/// Push a 3-bit width opcode and, unless `value` is zero, the value.
pub fn push_var3(fields: &mut FieldSet, name: &str, value: u64) -> CodegenResult<Option<FieldId>> {
    let op = Opcode3::for_value(value);
    fields.push_value(WIDTH_OPCODE, Opcode3::WIDTH, op.code())?;
    if op == Opcode3::Bytes0 {
        return Ok(None);
    }
    fields.push_value(name, op.value_width(), value).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var3_zero_has_no_value_field() {
        let mut fields = FieldSet::new();
        assert_eq!(push_var3(&mut fields, "ticks", 0).unwrap(), None);
        assert_eq!(fields.width(), 3);
        assert!(push_var3(&mut fields, "ticks", 300).unwrap().is_some());
        assert_eq!(fields.width(), 3 + 3 + 16);
    }

    #[test]
    fn var2_sized_keeps_width_of_sizing_value() {
        let mut fields = FieldSet::new();
        let id = push_var2_sized(&mut fields, "addr", 0x1234, 0).unwrap();
        assert_eq!(fields.get(id).width(), 16);
        assert_eq!(fields.get(id).get(), 0);
    }

    #[test]
    fn values_above_32_bits_overflow() {
        let mut fields = FieldSet::new();
        assert!(push_var2(&mut fields, "huge", 1 << 32).is_err());
    }
}

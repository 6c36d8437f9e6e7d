//! Ordered field list of one encoded record.

use crate::bits::BitPacker;
use crate::error::CodegenResult;

/// Handle to a field inside the [`FieldSet`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldId(usize);

/// The named fields of one instruction, in transmission order.
///
/// The first field pushed is the most significant part of the aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<BitPacker>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn push(&mut self, field: BitPacker) -> FieldId {
        self.fields.push(field);
        FieldId(self.fields.len() - 1)
    }

    /// Push a `width`-bit field holding `value`.
    pub fn push_value(
        &mut self,
        name: impl Into<String>,
        width: u64,
        value: u64,
    ) -> CodegenResult<FieldId> {
        Ok(self.push(BitPacker::with_value(name, width, value)?))
    }

    pub fn get(&self, id: FieldId) -> &BitPacker {
        &self.fields[id.0]
    }

    pub fn get_mut(&mut self, id: FieldId) -> &mut BitPacker {
        &mut self.fields[id.0]
    }

    /// First field called `name`.
    pub fn find(&self, name: &str) -> Option<&BitPacker> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut BitPacker> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BitPacker> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total width in bits.
    pub fn width(&self) -> u64 {
        self.fields.iter().map(BitPacker::width).sum()
    }

    /// Every field concatenated in order.
    pub fn aggregate(&self) -> BitPacker {
        let mut agg = BitPacker::new("aggregate", 0);
        for field in &self.fields {
            agg.append(field);
        }
        agg
    }
}

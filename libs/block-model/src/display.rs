//! Display projection of block values

use std::fmt;

use crate::kind::BlockKind;
use crate::values::BlockValues;

/// A single rendered channel value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayValue {
    Flag(bool),
    Number(u16),
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Flag(true) => f.write_str("True"),
            DisplayValue::Flag(false) => f.write_str("False"),
            DisplayValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One labelled line, e.g. `Coil 2` / `True`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub label: String,
    pub value: DisplayValue,
}

/// Project block values into labelled display entries
///
/// Bit blocks become `True`/`False` flags, register blocks decimal numbers.
/// Labels are numbered from the block's base address.
pub fn format_for_display(kind: BlockKind, values: &BlockValues) -> Vec<DisplayEntry> {
    let label = |i: usize| format!("{} {}", kind.item_label(), usize::from(kind.base_address()) + i);

    match values {
        BlockValues::Bits(bits) => bits
            .iter()
            .enumerate()
            .map(|(i, &b)| DisplayEntry {
                label: label(i),
                value: DisplayValue::Flag(b),
            })
            .collect(),
        BlockValues::Registers(registers) => registers
            .iter()
            .enumerate()
            .map(|(i, &r)| DisplayEntry {
                label: label(i),
                value: DisplayValue::Number(r),
            })
            .collect(),
    }
}

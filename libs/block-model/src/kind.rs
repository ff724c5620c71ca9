//! The four Modbus data blocks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// One of the four standard Modbus data blocks
///
/// | Kind               | Column | Width | Access |
/// |--------------------|--------|-------|--------|
/// | `DiscreteInputs`   | `di`   | 4     | R/O    |
/// | `Coils`            | `co`   | 4     | R/W    |
/// | `InputRegisters`   | `ir`   | 8     | R/O    |
/// | `HoldingRegisters` | `hr`   | 8     | R/W    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "di")]
    DiscreteInputs,
    #[serde(rename = "co")]
    Coils,
    #[serde(rename = "ir")]
    InputRegisters,
    #[serde(rename = "hr")]
    HoldingRegisters,
}

impl BlockKind {
    /// All kinds in persisted column order
    pub const ALL: [BlockKind; 4] = [
        BlockKind::DiscreteInputs,
        BlockKind::Coils,
        BlockKind::InputRegisters,
        BlockKind::HoldingRegisters,
    ];

    /// Fixed number of channels in the block
    ///
    /// ```
    /// # use block_model::BlockKind;
    /// assert_eq!(BlockKind::Coils.width(), 4);
    /// assert_eq!(BlockKind::HoldingRegisters.width(), 8);
    /// ```
    pub fn width(&self) -> usize {
        match self {
            BlockKind::DiscreteInputs | BlockKind::Coils => 4,
            BlockKind::InputRegisters | BlockKind::HoldingRegisters => 8,
        }
    }

    /// First Modbus address of the block
    pub fn base_address(&self) -> u16 {
        0
    }

    /// Coils and holding registers accept writes
    pub fn is_writable(&self) -> bool {
        matches!(self, BlockKind::Coils | BlockKind::HoldingRegisters)
    }

    /// Single-bit channels (discrete inputs, coils)
    pub fn is_bit(&self) -> bool {
        matches!(self, BlockKind::DiscreteInputs | BlockKind::Coils)
    }

    /// Column name in the `modbus` table
    pub fn column(&self) -> &'static str {
        match self {
            BlockKind::DiscreteInputs => "di",
            BlockKind::Coils => "co",
            BlockKind::InputRegisters => "ir",
            BlockKind::HoldingRegisters => "hr",
        }
    }

    /// Human-readable block title
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::DiscreteInputs => "Discrete Input Contacts",
            BlockKind::Coils => "Discrete Output Coils",
            BlockKind::InputRegisters => "Analogue Input Registers",
            BlockKind::HoldingRegisters => "Analogue Output Holding Registers",
        }
    }

    /// Name of a single channel in the block
    pub fn item_label(&self) -> &'static str {
        match self {
            BlockKind::DiscreteInputs => "Contact",
            BlockKind::Coils => "Coil",
            BlockKind::InputRegisters | BlockKind::HoldingRegisters => "Register",
        }
    }

    /// `R/O` or `R/W`
    pub fn access(&self) -> &'static str {
        if self.is_writable() {
            "R/W"
        } else {
            "R/O"
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for BlockKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "di" => Ok(BlockKind::DiscreteInputs),
            "co" => Ok(BlockKind::Coils),
            "ir" => Ok(BlockKind::InputRegisters),
            "hr" => Ok(BlockKind::HoldingRegisters),
            _ => Err(ModelError::UnknownKind(s.to_string())),
        }
    }
}

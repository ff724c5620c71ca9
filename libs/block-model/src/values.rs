//! Block values and snapshots
//!
//! Persisted encoding is comma-separated without spaces: bits as `1`/`0`,
//! registers as decimal numbers (`"1,0,1,0"`, `"3,0,9,0,0,0,0,0"`).

use crate::error::{ModelError, Result};
use crate::kind::BlockKind;

/// Values of one block, as read from or written to the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockValues {
    Bits(Vec<bool>),
    Registers(Vec<u16>),
}

impl BlockValues {
    pub fn len(&self) -> usize {
        match self {
            BlockValues::Bits(bits) => bits.len(),
            BlockValues::Registers(registers) => registers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shape(&self) -> &'static str {
        match self {
            BlockValues::Bits(_) => "bits",
            BlockValues::Registers(_) => "registers",
        }
    }

    /// Check shape and fixed width against a block kind
    pub fn check(&self, kind: BlockKind) -> Result<()> {
        let expected = if kind.is_bit() { "bits" } else { "registers" };
        if self.shape() != expected {
            return Err(ModelError::KindMismatch {
                kind: kind.to_string(),
                expected,
                found: self.shape(),
            });
        }
        if self.len() != kind.width() {
            return Err(ModelError::WrongCount {
                expected: kind.width(),
                found: self.len(),
            });
        }
        Ok(())
    }

    /// Comma-separated text for the state store
    pub fn encode(&self) -> String {
        match self {
            BlockValues::Bits(bits) => bits
                .iter()
                .map(|&b| if b { "1" } else { "0" })
                .collect::<Vec<_>>()
                .join(","),
            BlockValues::Registers(registers) => registers
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Parse stored text back into values, enforcing the block width
    pub fn decode(kind: BlockKind, text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split(',').map(str::trim).collect();

        let values = if kind.is_bit() {
            let bits = tokens
                .iter()
                .map(|token| match *token {
                    "0" => Ok(false),
                    "1" => Ok(true),
                    other => Err(ModelError::InvalidToken {
                        token: other.to_string(),
                        reason: "stored bit must be 0 or 1".to_string(),
                    }),
                })
                .collect::<Result<Vec<_>>>()?;
            BlockValues::Bits(bits)
        } else {
            let registers = tokens
                .iter()
                .map(|token| {
                    token.parse::<u16>().map_err(|e| ModelError::InvalidToken {
                        token: token.to_string(),
                        reason: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            BlockValues::Registers(registers)
        };

        values.check(kind)?;
        Ok(values)
    }
}

/// Last known values of all four blocks for one device address
///
/// Construction enforces the fixed width of every block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSnapshot {
    di: Vec<bool>,
    co: Vec<bool>,
    ir: Vec<u16>,
    hr: Vec<u16>,
}

impl BlockSnapshot {
    pub fn new(di: Vec<bool>, co: Vec<bool>, ir: Vec<u16>, hr: Vec<u16>) -> Result<Self> {
        let snapshot = Self { di, co, ir, hr };
        for kind in BlockKind::ALL {
            snapshot.get(kind).check(kind)?;
        }
        Ok(snapshot)
    }

    /// Build from four per-kind values in any order
    pub fn from_blocks(blocks: impl IntoIterator<Item = (BlockKind, BlockValues)>) -> Result<Self> {
        let (mut di, mut co, mut ir, mut hr) = (None, None, None, None);

        for (kind, values) in blocks {
            values.check(kind)?;
            match (kind, values) {
                (BlockKind::DiscreteInputs, BlockValues::Bits(v)) => di = Some(v),
                (BlockKind::Coils, BlockValues::Bits(v)) => co = Some(v),
                (BlockKind::InputRegisters, BlockValues::Registers(v)) => ir = Some(v),
                (BlockKind::HoldingRegisters, BlockValues::Registers(v)) => hr = Some(v),
                // check() above rejects every other pairing
                _ => {}
            }
        }

        let missing = |kind: BlockKind| ModelError::WrongCount {
            expected: kind.width(),
            found: 0,
        };
        Self::new(
            di.ok_or_else(|| missing(BlockKind::DiscreteInputs))?,
            co.ok_or_else(|| missing(BlockKind::Coils))?,
            ir.ok_or_else(|| missing(BlockKind::InputRegisters))?,
            hr.ok_or_else(|| missing(BlockKind::HoldingRegisters))?,
        )
    }

    pub fn get(&self, kind: BlockKind) -> BlockValues {
        match kind {
            BlockKind::DiscreteInputs => BlockValues::Bits(self.di.clone()),
            BlockKind::Coils => BlockValues::Bits(self.co.clone()),
            BlockKind::InputRegisters => BlockValues::Registers(self.ir.clone()),
            BlockKind::HoldingRegisters => BlockValues::Registers(self.hr.clone()),
        }
    }

    pub fn discrete_inputs(&self) -> &[bool] {
        &self.di
    }

    pub fn coils(&self) -> &[bool] {
        &self.co
    }

    pub fn input_registers(&self) -> &[u16] {
        &self.ir
    }

    pub fn holding_registers(&self) -> &[u16] {
        &self.hr
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn sample() -> BlockSnapshot {
        BlockSnapshot::new(
            vec![true, false, false, true],
            vec![false, false, true, true],
            vec![100, 200, 300, 400, 500, 600, 700, 65535],
            vec![1, 2, 3, 4, 5, 6, 7, 8],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_matches_stored_format() {
        assert_eq!(
            BlockValues::Bits(vec![true, false, true, false]).encode(),
            "1,0,1,0"
        );
        assert_eq!(
            BlockValues::Registers(vec![3, 0, 9, 0, 0, 0, 0, 12]).encode(),
            "3,0,9,0,0,0,0,12"
        );
    }

    #[test]
    fn test_decode_tolerates_spaces() {
        let values = BlockValues::decode(BlockKind::Coils, "1, 0, 1, 0").unwrap();
        assert_eq!(values, BlockValues::Bits(vec![true, false, true, false]));
    }

    #[test]
    fn test_decode_enforces_width() {
        assert_eq!(
            BlockValues::decode(BlockKind::Coils, "1,0,1").unwrap_err(),
            ModelError::WrongCount {
                expected: 4,
                found: 3
            }
        );
        assert!(BlockValues::decode(BlockKind::InputRegisters, "1,2").is_err());
        assert!(BlockValues::decode(BlockKind::InputRegisters, "").is_err());
    }

    #[test]
    fn test_decode_rejects_bad_tokens() {
        assert!(BlockValues::decode(BlockKind::DiscreteInputs, "1,0,1,2").is_err());
        assert!(BlockValues::decode(BlockKind::HoldingRegisters, "1,2,3,4,5,6,7,70000").is_err());
    }

    #[test]
    fn test_check_kind_mismatch() {
        let err = BlockValues::Registers(vec![0; 4])
            .check(BlockKind::Coils)
            .unwrap_err();
        assert!(matches!(err, ModelError::KindMismatch { .. }));
    }

    #[test]
    fn test_snapshot_rejects_wrong_width() {
        let err = BlockSnapshot::new(vec![true; 3], vec![true; 4], vec![0; 8], vec![0; 8]);
        assert!(err.is_err());
    }

    #[test]
    fn test_from_blocks_any_order() {
        let snapshot = sample();
        let blocks = BlockKind::ALL
            .iter()
            .rev()
            .map(|&kind| (kind, snapshot.get(kind)));
        assert_eq!(BlockSnapshot::from_blocks(blocks).unwrap(), snapshot);
    }

    #[test]
    fn test_from_blocks_missing_kind() {
        let snapshot = sample();
        let blocks = [
            (BlockKind::DiscreteInputs, snapshot.get(BlockKind::DiscreteInputs)),
            (BlockKind::Coils, snapshot.get(BlockKind::Coils)),
            (BlockKind::InputRegisters, snapshot.get(BlockKind::InputRegisters)),
        ];
        assert!(BlockSnapshot::from_blocks(blocks).is_err());
    }
}

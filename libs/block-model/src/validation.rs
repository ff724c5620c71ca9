//! Write-input validation
//!
//! Pure checks applied to operator input before any device call.

use crate::error::{ModelError, Result};
use crate::kind::BlockKind;

/// Split a comma-separated input line into trimmed, non-empty tokens
///
/// ```
/// # use block_model::split_tokens;
/// assert_eq!(split_tokens("1, 0,1,0,"), vec!["1", "0", "1", "0"]);
/// assert!(split_tokens("  ").is_empty());
/// ```
pub fn split_tokens(line: &str) -> Vec<&str> {
    line.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

fn check_count(kind: BlockKind, tokens: &[&str]) -> Result<()> {
    if tokens.len() != kind.width() {
        return Err(ModelError::WrongCount {
            expected: kind.width(),
            found: tokens.len(),
        });
    }
    Ok(())
}

/// Validate coil input: exactly 4 tokens, each literally `0` or `1`
///
/// ```
/// # use block_model::validate_discrete_write;
/// assert_eq!(
///     validate_discrete_write(&["1", "0", "0", "1"]).unwrap(),
///     vec![true, false, false, true]
/// );
/// assert!(validate_discrete_write(&["1", "0", "1"]).is_err());
/// assert!(validate_discrete_write(&["1", "0", "1", "true"]).is_err());
/// ```
pub fn validate_discrete_write(tokens: &[&str]) -> Result<Vec<bool>> {
    check_count(BlockKind::Coils, tokens)?;

    tokens
        .iter()
        .map(|token| match *token {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(ModelError::InvalidToken {
                token: other.to_string(),
                reason: "only 0 or 1 allowed".to_string(),
            }),
        })
        .collect()
}

/// Validate holding register input: exactly 8 single decimal digits
///
/// ```
/// # use block_model::validate_register_write;
/// let tokens = ["0", "1", "2", "3", "4", "5", "6", "9"];
/// assert_eq!(
///     validate_register_write(&tokens).unwrap(),
///     vec![0, 1, 2, 3, 4, 5, 6, 9]
/// );
/// ```
pub fn validate_register_write(tokens: &[&str]) -> Result<Vec<u16>> {
    check_count(BlockKind::HoldingRegisters, tokens)?;

    tokens
        .iter()
        .map(|token| {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_digit() => Ok(u16::from(c as u8 - b'0')),
                _ => Err(ModelError::InvalidToken {
                    token: token.to_string(),
                    reason: "only integers from 0 to 9 allowed".to_string(),
                }),
            }
        })
        .collect()
}

//! Block Model Library
//!
//! The four standard Modbus data blocks as seen by the gateway, with their
//! fixed widths, write-input validation, display projection and the
//! comma-separated text encoding used by the state store.
//! Pure logic, no I/O.
//!
//! # Example
//!
//! ```
//! use block_model::{split_tokens, validate_discrete_write, BlockKind, BlockValues};
//!
//! let tokens = split_tokens(" 1, 0,1,0,");
//! let bits = validate_discrete_write(&tokens).unwrap();
//! assert_eq!(bits, vec![true, false, true, false]);
//!
//! let encoded = BlockValues::Bits(bits).encode();
//! assert_eq!(encoded, "1,0,1,0");
//! assert!(BlockValues::decode(BlockKind::Coils, &encoded).is_ok());
//! ```

pub mod display;
pub mod error;
pub mod kind;
pub mod validation;
pub mod values;

pub use display::{format_for_display, DisplayEntry, DisplayValue};
pub use error::{ModelError, Result};
pub use kind::BlockKind;
pub use validation::{split_tokens, validate_discrete_write, validate_register_write};
pub use values::{BlockSnapshot, BlockValues};

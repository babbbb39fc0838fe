//! zipdiff core library
//!
//! This crate provides the identifiers, digests and error handling shared
//! by the archive reader, the comparison engine and the command line tool.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::*;
}

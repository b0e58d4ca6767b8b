//! # sshscan platform
//!
//! Shared types for the sshscan crates:
//! - Unified error type (`SshScanError`, `SshScanResult`)
//! - Module and scanner traits (`SecurityModule`, `Scanner`)
//!
//! # Examples
//!
//! ```
//! use sshscan_platform::{SshScanError, SshScanResult};
//!
//! fn check_type(byte: u8) -> SshScanResult<u8> {
//!     if byte != 20 {
//!         return Err(SshScanError::UnexpectedMessageType { expected: 20, actual: byte });
//!     }
//!     Ok(byte)
//! }
//!
//! assert!(check_type(20).is_ok());
//! assert!(check_type(1).is_err());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod error;
pub mod traits;

pub use error::{SshScanError, SshScanResult};
pub use traits::{Scanner, SecurityModule};

/// Platform version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! SSH key exchange probe.
//!
//! Connects to an SSH server, swaps identification strings, and decodes the
//! server's SSH_MSG_KEXINIT into an inventory of the algorithms it offers.
//! No key exchange, authentication or encryption takes place.
//!
//! # Features
//!
//! - `ssh` (default) - the probe itself
//! - `serde` (default) - `Serialize` for results and JSON rendering
//!
//! # Example
//!
//! ```rust,no_run
//! use sshscan_proto::ssh::{inspect, render_text};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let result = inspect("127.0.0.1", "22").await;
//! print!("{}", render_text(&result));
//! # }
//! ```
//!
//! # References
//!
//! - [RFC 4253](https://datatracker.ietf.org/doc/html/rfc4253) - SSH Transport Layer Protocol

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

#[cfg(feature = "ssh")]
pub mod ssh;

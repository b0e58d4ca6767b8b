//! SSH transport-layer probe.
//!
//! Just enough of RFC 4253 to learn what a server offers: exchange
//! identification strings, read the server's SSH_MSG_KEXINIT, decode its
//! cookie and ten name-lists, hang up.
//!
//! # Layout
//!
//! 1. **Wire pieces** - [`version`], [`message`], [`packet`], [`kex`]
//! 2. **Handshaker** ([`handshake`]) - connect, banners, one packet
//! 3. **Decoder** ([`decoder`]) - bounds-checked walk over the KEXINIT bytes
//! 4. **Probe** ([`scan`]) - [`inspect`] ties the two together
//! 5. **Report** ([`report`]) - text and JSON rendering
//!
//! # Security Considerations
//!
//! - **Input Validation**: every field end offset is checked against the
//!   35000-byte packet ceiling before it is read
//! - **Bounded Waits**: connect has its own timeout, every later read and
//!   write shares one deadline
//! - **No Key Material**: nothing past KEXINIT is ever sent or parsed
//! - **No Unsafe Code**
//!
//! # Example
//!
//! ```rust
//! use sshscan_proto::ssh::{decode_kexinit, KexField, KexInit, Packet};
//!
//! let offer = KexInit::default()
//!     .with_name_list(KexField::KexAlgorithms, ["curve25519-sha256", "ecdh-sha2-nistp256"]);
//! let raw = Packet::new(offer.to_bytes()).to_bytes();
//!
//! let decoded = decode_kexinit(&raw, "localhost").unwrap();
//! assert_eq!(decoded.kex_algorithms().len(), 2);
//! ```
//!
//! # References
//!
//! - [RFC 4251](https://datatracker.ietf.org/doc/html/rfc4251) - SSH Protocol Architecture
//! - [RFC 4253](https://datatracker.ietf.org/doc/html/rfc4253) - SSH Transport Layer Protocol

pub mod config;
pub mod decoder;
pub mod handshake;
pub mod kex;
pub mod message;
pub mod packet;
pub mod report;
pub mod scan;
pub mod version;

// Re-export main types
pub use config::{ReadMode, ScanConfig};
pub use decoder::{decode_kexinit, KexInitDecoder, NameListCursor};
pub use handshake::{handshake, Handshake};
pub use kex::{KexField, KexInit};
pub use message::MessageType;
pub use packet::{Packet, MAX_PACKET_SIZE};
#[cfg(feature = "serde")]
pub use report::render_json;
pub use report::render_text;
pub use scan::{inspect, inspect_with_config, HandshakeResult, SshScanner};
pub use version::Version;

//! SSH transport message numbers (RFC 4253 Section 12).
//!
//! Only the transport-layer generic and algorithm negotiation ranges matter
//! to a probe that stops after the server's KEXINIT. Knowing the generic
//! messages lets failure reports say what the server sent instead.
//!
//! # Example
//!
//! ```rust
//! use sshscan_proto::ssh::message::MessageType;
//!
//! assert_eq!(MessageType::KexInit as u8, 20);
//! assert_eq!(MessageType::from_u8(1), Some(MessageType::Disconnect));
//! ```

/// SSH message numbers seen before key exchange completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Disconnect message - terminates the connection.
    Disconnect = 1,
    /// Ignore message - can be used for padding or keep-alive.
    Ignore = 2,
    /// Unimplemented message - response to unknown message type.
    Unimplemented = 3,
    /// Debug message - debugging information.
    Debug = 4,
    /// Key exchange init - algorithm negotiation.
    KexInit = 20,
    /// New keys - signals transition to new keys.
    NewKeys = 21,
}

impl MessageType {
    /// Converts a byte to a message type.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(MessageType::Disconnect),
            2 => Some(MessageType::Ignore),
            3 => Some(MessageType::Unimplemented),
            4 => Some(MessageType::Debug),
            20 => Some(MessageType::KexInit),
            21 => Some(MessageType::NewKeys),
            _ => None,
        }
    }

    /// RFC symbolic name, e.g. `SSH_MSG_KEXINIT`.
    pub fn name(self) -> &'static str {
        match self {
            MessageType::Disconnect => "SSH_MSG_DISCONNECT",
            MessageType::Ignore => "SSH_MSG_IGNORE",
            MessageType::Unimplemented => "SSH_MSG_UNIMPLEMENTED",
            MessageType::Debug => "SSH_MSG_DEBUG",
            MessageType::KexInit => "SSH_MSG_KEXINIT",
            MessageType::NewKeys => "SSH_MSG_NEWKEYS",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//! Error types for sshscan

use std::fmt;

/// Unified error type for every stage of a probe.
#[derive(Debug)]
pub enum SshScanError {
    /// Name resolution, connect failure or connect timeout
    Connection(std::io::Error),

    /// Read or write failure after the connection was established
    Io(std::io::Error),

    /// Malformed or truncated packet framing
    Framing(String),

    /// The packet does not carry the expected SSH message
    UnexpectedMessageType {
        /// Message number we were waiting for
        expected: u8,
        /// Message number found on the wire
        actual: u8,
    },

    /// A declared name-list length runs past the packet size ceiling
    OversizedField {
        /// Peer that sent the packet
        server: String,
        /// Offset one past the last byte the field claims
        end: usize,
        /// Ceiling the field was checked against
        limit: usize,
    },

    /// Invalid configuration value
    Config(String),
}

impl fmt::Display for SshScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SshScanError::Connection(e) => write!(f, "connection error: {}", e),
            SshScanError::Io(e) => write!(f, "IO error: {}", e),
            SshScanError::Framing(msg) => write!(f, "binary decode error: {}", msg),
            SshScanError::UnexpectedMessageType { expected, actual } => write!(
                f,
                "expected message type {} (SSH_MSG_KEXINIT), got {}",
                expected, actual
            ),
            SshScanError::OversizedField { server, end, limit } => write!(
                f,
                "server {} is attempting to overflow the maximum expected packet size: \
                 key exchange must not exceed {} bytes, but a field ends at byte {}",
                server, limit, end
            ),
            SshScanError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for SshScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SshScanError::Connection(e) | SshScanError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SshScanError {
    fn from(err: std::io::Error) -> Self {
        SshScanError::Io(err)
    }
}

/// Result type for sshscan operations
pub type SshScanResult<T> = Result<T, SshScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_unexpected_message_type_names_actual_byte() {
        let err = SshScanError::UnexpectedMessageType {
            expected: 20,
            actual: 21,
        };
        assert_eq!(
            err.to_string(),
            "expected message type 20 (SSH_MSG_KEXINIT), got 21"
        );
    }

    #[test]
    fn test_oversized_field_names_server_and_offset() {
        let err = SshScanError::OversizedField {
            server: "example.com".to_string(),
            end: 40_000,
            limit: 35_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("example.com"));
        assert!(msg.contains("overflow the maximum expected packet size"));
        assert!(msg.contains("40000"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "peer closed");
        let err: SshScanError = io_err.into();
        assert!(matches!(err, SshScanError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_framing_has_no_source() {
        let err = SshScanError::Framing("short packet".to_string());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "binary decode error: short packet");
    }
}

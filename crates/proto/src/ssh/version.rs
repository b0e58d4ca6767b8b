//! SSH identification string (RFC 4253 Section 4.2).
//!
//! Both sides open the connection with a line of the form:
//!
//! ```text
//! SSH-protoversion-softwareversion SP comments CR LF
//! ```
//!
//! The probe sends its own line verbatim and keeps the server's line as raw
//! text. Parsing the server line is only used for diagnostics: a server whose
//! banner does not parse is still scanned.
//!
//! # Example
//!
//! ```rust
//! use sshscan_proto::ssh::version::Version;
//!
//! let ours = Version::sshscan();
//! assert_eq!(ours.to_wire_format(), b"SSH-2.0-sshscan\r\n");
//!
//! let theirs = Version::parse("SSH-2.0-OpenSSH_9.6 Ubuntu-3ubuntu13\r\n").unwrap();
//! assert_eq!(theirs.software(), "OpenSSH_9.6");
//! assert_eq!(theirs.comments(), Some("Ubuntu-3ubuntu13"));
//! ```

use sshscan_platform::{SshScanError, SshScanResult};

/// Maximum length of an identification line, CR LF included.
pub const MAX_VERSION_LENGTH: usize = 255;

/// Software version the probe announces.
pub const SSHSCAN_SOFTWARE: &str = "sshscan";

/// SSH identification string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    proto_version: String,
    software_version: String,
    comments: Option<String>,
}

impl Version {
    /// Creates an SSH-2.0 identification string.
    pub fn new(software: &str, comments: Option<&str>) -> Self {
        Self {
            proto_version: "2.0".to_string(),
            software_version: software.to_string(),
            comments: comments.map(String::from),
        }
    }

    /// The identification string sent by the probe, `SSH-2.0-sshscan`.
    pub fn sshscan() -> Self {
        Self::new(SSHSCAN_SOFTWARE, None)
    }

    /// Parses an identification line, with or without the trailing CR LF.
    ///
    /// # Errors
    ///
    /// Returns [`SshScanError::Framing`] if the line is longer than 255
    /// bytes, contains a null byte, or is not `SSH-<proto>-<software>`.
    /// Any protocol version is accepted; the probe reports what it sees.
    pub fn parse(line: &str) -> SshScanResult<Self> {
        if line.len() > MAX_VERSION_LENGTH {
            return Err(SshScanError::Framing(format!(
                "identification string too long: {} bytes (max {})",
                line.len(),
                MAX_VERSION_LENGTH
            )));
        }

        let line = line.trim_end_matches('\n').trim_end_matches('\r');
        if line.contains('\0') {
            return Err(SshScanError::Framing(
                "identification string contains null byte".to_string(),
            ));
        }

        let rest = line.strip_prefix("SSH-").ok_or_else(|| {
            SshScanError::Framing(format!(
                "identification string must start with 'SSH-', got '{}'",
                line
            ))
        })?;

        let (proto_version, rest) = rest
            .split_once('-')
            .filter(|(proto, software)| !proto.is_empty() && !software.is_empty())
            .ok_or_else(|| {
                SshScanError::Framing(format!("malformed identification string: '{}'", line))
            })?;

        let (software_version, comments) = match rest.split_once(' ') {
            Some((software, comments)) => (software, Some(comments.trim().to_string())),
            None => (rest, None),
        };

        Ok(Self {
            proto_version: proto_version.to_string(),
            software_version: software_version.to_string(),
            comments,
        })
    }

    /// Returns the protocol version (e.g., "2.0").
    pub fn proto_version(&self) -> &str {
        &self.proto_version
    }

    /// Returns the software version (e.g., "OpenSSH_9.6").
    pub fn software(&self) -> &str {
        &self.software_version
    }

    /// Returns the comments, if any.
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    /// Line as written to the wire, CR LF terminated.
    pub fn to_wire_format(&self) -> Vec<u8> {
        format!("{}\r\n", self).into_bytes()
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::sshscan()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SSH-{}-{}", self.proto_version, self.software_version)?;
        if let Some(comments) = &self.comments {
            write!(f, " {}", comments)?;
        }
        Ok(())
    }
}

//! Probe configuration.

use crate::ssh::version::Version;
use sshscan_platform::{SshScanError, SshScanResult};
use std::time::Duration;

/// Connect timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Budget for all reads and writes after connect, when none is configured.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(10);

/// How the handshaker pulls the banner and the KEXINIT packet off the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// One read for the banner and one for the packet. Whatever the first
    /// read returns is taken as complete.
    #[default]
    Single,
    /// Keep reading until the banner line ends and the packet reaches its
    /// declared length, the 35000-byte ceiling, or end of stream.
    Complete,
}

/// Probe configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Bound on name resolution plus TCP connect.
    pub connect_timeout: Duration,

    /// Single deadline shared by every read and write after connect.
    pub io_timeout: Duration,

    /// Read strategy for banner and packet.
    pub read_mode: ReadMode,

    /// Identification string sent to the server.
    pub client_version: Version,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: DEFAULT_IO_TIMEOUT,
            read_mode: ReadMode::Single,
            client_version: Version::sshscan(),
        }
    }
}

impl ScanConfig {
    /// Set connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set read/write budget
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Set read mode
    pub fn with_read_mode(mut self, mode: ReadMode) -> Self {
        self.read_mode = mode;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> SshScanResult<()> {
        if self.connect_timeout.is_zero() {
            return Err(SshScanError::Config(
                "connect timeout must be greater than zero".into(),
            ));
        }
        if self.io_timeout.is_zero() {
            return Err(SshScanError::Config(
                "I/O timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

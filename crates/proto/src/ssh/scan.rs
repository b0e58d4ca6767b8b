//! Probe entry point.
//!
//! [`inspect`] runs the handshaker and the decoder against one host and always
//! returns a [`HandshakeResult`]. The first error stops the probe and is
//! recorded in the result; fields that were not reached stay empty.
//!
//! # Example
//!
//! ```rust,no_run
//! use sshscan_proto::ssh::scan::inspect;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let result = inspect("127.0.0.1", "22").await;
//! if let Some(reason) = result.failure_reason() {
//!     eprintln!("scan failed: {}", reason);
//! } else {
//!     println!("{:?}", result.kexinit().kex_algorithms());
//! }
//! # }
//! ```

use crate::ssh::config::ScanConfig;
use crate::ssh::decoder::KexInitDecoder;
use crate::ssh::handshake::{handshake, Handshake};
use crate::ssh::kex::{KexField, KexInit, COOKIE_LEN};
use sshscan_platform::{Scanner, SecurityModule, SshScanError, SshScanResult};
use tracing::{debug, info};

/// Everything learned from one probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HandshakeResult {
    pub(crate) server: String,
    pub(crate) port: String,
    pub(crate) protocol_version: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub(crate) kexinit: KexInit,
    pub(crate) failed: bool,
    pub(crate) failure_reason: String,
}

impl HandshakeResult {
    /// Empty result for `server:port`.
    pub fn new(server: &str, port: &str) -> Self {
        Self {
            server: server.to_string(),
            port: port.to_string(),
            ..Self::default()
        }
    }

    /// Host that was probed.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Port that was probed, as given.
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Server identification string as received.
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// KEXINIT cookie; all zero if the packet was never decoded.
    pub fn cookie(&self) -> &[u8; COOKIE_LEN] {
        self.kexinit.cookie()
    }

    /// Algorithms offered by the server.
    pub fn kexinit(&self) -> &KexInit {
        &self.kexinit
    }

    /// Shorthand for `self.kexinit().name_list(field)`.
    pub fn name_list(&self, field: KexField) -> &[String] {
        self.kexinit.name_list(field)
    }

    /// Whether the probe stopped on an error.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Why the probe stopped, if it did.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failed.then_some(self.failure_reason.as_str())
    }

    fn fail(&mut self, err: SshScanError) {
        info!(server = %self.server, port = %self.port, error = %err, "probe failed");
        self.failed = true;
        self.failure_reason = err.to_string();
    }
}

/// Probes `host:port` with the default configuration.
pub async fn inspect(host: &str, port: &str) -> HandshakeResult {
    inspect_with_config(host, port, &ScanConfig::default()).await
}

/// Probes `host:port` with `config`.
pub async fn inspect_with_config(host: &str, port: &str, config: &ScanConfig) -> HandshakeResult {
    let mut result = HandshakeResult::new(host, port);
    if let Err(err) = probe(&mut result, config).await {
        result.fail(err);
    }
    result
}

async fn probe(result: &mut HandshakeResult, config: &ScanConfig) -> SshScanResult<()> {
    config.validate()?;

    let Handshake { banner, packet } = handshake(&result.server, &result.port, config).await?;
    result.protocol_version = banner;

    let mut decoder = KexInitDecoder::new(&packet, &result.server)?;
    decoder.decode_into(&mut result.kexinit)?;
    debug!(
        server = %result.server,
        kex = result.kexinit.kex_algorithms().len(),
        host_key = result.kexinit.server_host_key_algorithms().len(),
        "probe complete"
    );
    Ok(())
}

/// [`Scanner`] over [`inspect_with_config`].
#[derive(Debug, Clone, Default)]
pub struct SshScanner {
    config: ScanConfig,
}

impl SshScanner {
    /// Scanner probing with `config`.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Configuration used for every scan.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }
}

impl SecurityModule for SshScanner {
    fn id(&self) -> &'static str {
        "sshscan"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &'static str {
        "Audit key exchange algorithms and settings on an SSH server"
    }
}

#[async_trait::async_trait]
impl Scanner for SshScanner {
    type Report = HandshakeResult;

    async fn scan(&self, host: &str, port: &str) -> HandshakeResult {
        inspect_with_config(host, port, &self.config).await
    }
}

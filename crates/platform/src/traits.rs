//! Core traits for sshscan modules

/// Identity of a probing module.
pub trait SecurityModule: Send + Sync {
    /// Unique module identifier
    fn id(&self) -> &'static str;

    /// Module version
    fn version(&self) -> &'static str;

    /// Module description
    fn description(&self) -> &'static str;
}

/// Scanner interface for network probes.
///
/// A scan never fails at the type level: whatever went wrong is recorded in
/// the returned report so callers can render success and failure the same way.
#[async_trait::async_trait]
pub trait Scanner: SecurityModule {
    /// Record produced by one scan
    type Report: Send;

    /// Scan `host` on `port`
    ///
    /// # Arguments
    ///
    /// * `host` - Host name or IP literal
    /// * `port` - Port, as given by the caller
    async fn scan(&self, host: &str, port: &str) -> Self::Report;
}

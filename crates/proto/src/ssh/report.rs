//! Rendering of probe results.
//!
//! The text form lists what the server will use when talking to us: key
//! exchange, host key, and the server-to-client encryption, MAC, compression
//! and language lists. The JSON form carries every field of
//! [`HandshakeResult`], client-to-server lists included.

use crate::ssh::kex::KexField;
use crate::ssh::scan::HandshakeResult;
use std::fmt::Write;

const TEXT_SECTIONS: [(&str, KexField); 6] = [
    ("Key Exchange Algorithms", KexField::KexAlgorithms),
    ("Server Host Key Algorithms", KexField::ServerHostKeyAlgorithms),
    ("Server Encryption Algorithms", KexField::EncryptionServerToClient),
    ("Server MAC Algorithms", KexField::MacServerToClient),
    ("Server Compression Algorithms", KexField::CompressionServerToClient),
    ("Server Languages", KexField::LanguagesServerToClient),
];

/// Human-readable report, one field per line, algorithms tab-indented.
pub fn render_text(result: &HandshakeResult) -> String {
    let mut out = String::new();

    if let Some(reason) = result.failure_reason() {
        let _ = writeln!(
            out,
            "SSH Scan of {}:{} failed with error: {}",
            result.server(),
            result.port(),
            reason
        );
        return out;
    }

    let _ = writeln!(out, "Server: {}", result.server());
    let _ = writeln!(out, "Port: {}", result.port());
    let _ = writeln!(out, "Server Version: {}", result.protocol_version().trim());
    let _ = writeln!(out, "Random Cookie: {}", hex::encode(result.cookie()));

    for (label, field) in TEXT_SECTIONS {
        let names = result.name_list(field);
        let _ = writeln!(out, "{}: ({})", label, names.len());
        let _ = writeln!(out, "\t{}", names.join("\n\t"));
    }
    out
}

/// JSON report; field names follow [`HandshakeResult`], cookie as hex.
#[cfg(feature = "serde")]
pub fn render_json(result: &HandshakeResult) -> serde_json::Result<String> {
    serde_json::to_string(result)
}

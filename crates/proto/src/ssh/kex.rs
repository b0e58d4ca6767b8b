//! SSH_MSG_KEXINIT contents (RFC 4253 Section 7.1).
//!
//! ```text
//! byte         SSH_MSG_KEXINIT (20)
//! byte[16]     cookie (random bytes)
//! name-list    kex_algorithms
//! name-list    server_host_key_algorithms
//! name-list    encryption_algorithms_client_to_server
//! name-list    encryption_algorithms_server_to_client
//! name-list    mac_algorithms_client_to_server
//! name-list    mac_algorithms_server_to_client
//! name-list    compression_algorithms_client_to_server
//! name-list    compression_algorithms_server_to_client
//! name-list    languages_client_to_server
//! name-list    languages_server_to_client
//! boolean      first_kex_packet_follows
//! uint32       0 (reserved for future extension)
//! ```
//!
//! [`KexInit`] is the inventory a probe collects. Decoding lives in
//! [`crate::ssh::decoder`]; this module owns the model and the encoder used
//! to build server packets.
//!
//! # Example
//!
//! ```rust
//! use sshscan_proto::ssh::kex::{KexField, KexInit};
//!
//! let kexinit = KexInit::default()
//!     .with_name_list(KexField::KexAlgorithms, ["curve25519-sha256"]);
//! let bytes = kexinit.to_bytes();
//! assert_eq!(bytes[0], 20);
//! assert_eq!(kexinit.kex_algorithms(), ["curve25519-sha256"]);
//! ```

use crate::ssh::message::MessageType;
use bytes::{BufMut, BytesMut};
use rand::RngCore;

/// Length of the KEXINIT cookie.
pub const COOKIE_LEN: usize = 16;

/// The ten name-lists of a KEXINIT, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KexField {
    /// Key exchange algorithms
    KexAlgorithms,
    /// Server host key algorithms
    ServerHostKeyAlgorithms,
    /// Encryption algorithms client to server
    EncryptionClientToServer,
    /// Encryption algorithms server to client
    EncryptionServerToClient,
    /// MAC algorithms client to server
    MacClientToServer,
    /// MAC algorithms server to client
    MacServerToClient,
    /// Compression algorithms client to server
    CompressionClientToServer,
    /// Compression algorithms server to client
    CompressionServerToClient,
    /// Languages client to server
    LanguagesClientToServer,
    /// Languages server to client
    LanguagesServerToClient,
}

impl KexField {
    /// Every field, in the order they appear on the wire.
    pub const ALL: [KexField; 10] = [
        KexField::KexAlgorithms,
        KexField::ServerHostKeyAlgorithms,
        KexField::EncryptionClientToServer,
        KexField::EncryptionServerToClient,
        KexField::MacClientToServer,
        KexField::MacServerToClient,
        KexField::CompressionClientToServer,
        KexField::CompressionServerToClient,
        KexField::LanguagesClientToServer,
        KexField::LanguagesServerToClient,
    ];

    /// Field name as used in RFC 4253.
    pub fn wire_name(self) -> &'static str {
        match self {
            KexField::KexAlgorithms => "kex_algorithms",
            KexField::ServerHostKeyAlgorithms => "server_host_key_algorithms",
            KexField::EncryptionClientToServer => "encryption_algorithms_client_to_server",
            KexField::EncryptionServerToClient => "encryption_algorithms_server_to_client",
            KexField::MacClientToServer => "mac_algorithms_client_to_server",
            KexField::MacServerToClient => "mac_algorithms_server_to_client",
            KexField::CompressionClientToServer => "compression_algorithms_client_to_server",
            KexField::CompressionServerToClient => "compression_algorithms_server_to_client",
            KexField::LanguagesClientToServer => "languages_client_to_server",
            KexField::LanguagesServerToClient => "languages_server_to_client",
        }
    }
}

impl std::fmt::Display for KexField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Algorithms offered in one KEXINIT.
///
/// Every list keeps the peer's preference order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KexInit {
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_hex"))]
    cookie: [u8; COOKIE_LEN],
    kex_algorithms: Vec<String>,
    server_host_key_algorithms: Vec<String>,
    encryption_algorithms_client_to_server: Vec<String>,
    encryption_algorithms_server_to_client: Vec<String>,
    mac_algorithms_client_to_server: Vec<String>,
    mac_algorithms_server_to_client: Vec<String>,
    compression_algorithms_client_to_server: Vec<String>,
    compression_algorithms_server_to_client: Vec<String>,
    languages_client_to_server: Vec<String>,
    languages_server_to_client: Vec<String>,
}

impl KexInit {
    /// Empty inventory carrying `cookie`.
    pub fn with_cookie(cookie: [u8; COOKIE_LEN]) -> Self {
        Self {
            cookie,
            ..Self::default()
        }
    }

    /// Empty inventory with a fresh random cookie.
    pub fn with_random_cookie() -> Self {
        let mut cookie = [0u8; COOKIE_LEN];
        rand::thread_rng().fill_bytes(&mut cookie);
        Self::with_cookie(cookie)
    }

    /// Builder form of [`KexInit::set_name_list`].
    pub fn with_name_list<I, S>(mut self, field: KexField, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_name_list(field, names.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the cookie.
    pub fn cookie(&self) -> &[u8; COOKIE_LEN] {
        &self.cookie
    }

    pub(crate) fn set_cookie(&mut self, cookie: [u8; COOKIE_LEN]) {
        self.cookie = cookie;
    }

    /// Returns the list stored for `field`.
    pub fn name_list(&self, field: KexField) -> &[String] {
        match field {
            KexField::KexAlgorithms => &self.kex_algorithms,
            KexField::ServerHostKeyAlgorithms => &self.server_host_key_algorithms,
            KexField::EncryptionClientToServer => &self.encryption_algorithms_client_to_server,
            KexField::EncryptionServerToClient => &self.encryption_algorithms_server_to_client,
            KexField::MacClientToServer => &self.mac_algorithms_client_to_server,
            KexField::MacServerToClient => &self.mac_algorithms_server_to_client,
            KexField::CompressionClientToServer => &self.compression_algorithms_client_to_server,
            KexField::CompressionServerToClient => &self.compression_algorithms_server_to_client,
            KexField::LanguagesClientToServer => &self.languages_client_to_server,
            KexField::LanguagesServerToClient => &self.languages_server_to_client,
        }
    }

    /// Replaces the list stored for `field`.
    pub fn set_name_list(&mut self, field: KexField, names: Vec<String>) {
        let slot = match field {
            KexField::KexAlgorithms => &mut self.kex_algorithms,
            KexField::ServerHostKeyAlgorithms => &mut self.server_host_key_algorithms,
            KexField::EncryptionClientToServer => &mut self.encryption_algorithms_client_to_server,
            KexField::EncryptionServerToClient => &mut self.encryption_algorithms_server_to_client,
            KexField::MacClientToServer => &mut self.mac_algorithms_client_to_server,
            KexField::MacServerToClient => &mut self.mac_algorithms_server_to_client,
            KexField::CompressionClientToServer => {
                &mut self.compression_algorithms_client_to_server
            }
            KexField::CompressionServerToClient => {
                &mut self.compression_algorithms_server_to_client
            }
            KexField::LanguagesClientToServer => &mut self.languages_client_to_server,
            KexField::LanguagesServerToClient => &mut self.languages_server_to_client,
        };
        *slot = names;
    }

    /// Returns the key exchange algorithms.
    pub fn kex_algorithms(&self) -> &[String] {
        &self.kex_algorithms
    }

    /// Returns the server host key algorithms.
    pub fn server_host_key_algorithms(&self) -> &[String] {
        &self.server_host_key_algorithms
    }

    /// Returns the encryption algorithms (client to server).
    pub fn encryption_algorithms_client_to_server(&self) -> &[String] {
        &self.encryption_algorithms_client_to_server
    }

    /// Returns the encryption algorithms (server to client).
    pub fn encryption_algorithms_server_to_client(&self) -> &[String] {
        &self.encryption_algorithms_server_to_client
    }

    /// Returns the MAC algorithms (client to server).
    pub fn mac_algorithms_client_to_server(&self) -> &[String] {
        &self.mac_algorithms_client_to_server
    }

    /// Returns the MAC algorithms (server to client).
    pub fn mac_algorithms_server_to_client(&self) -> &[String] {
        &self.mac_algorithms_server_to_client
    }

    /// Returns the compression algorithms (client to server).
    pub fn compression_algorithms_client_to_server(&self) -> &[String] {
        &self.compression_algorithms_client_to_server
    }

    /// Returns the compression algorithms (server to client).
    pub fn compression_algorithms_server_to_client(&self) -> &[String] {
        &self.compression_algorithms_server_to_client
    }

    /// Returns the languages (client to server).
    pub fn languages_client_to_server(&self) -> &[String] {
        &self.languages_client_to_server
    }

    /// Returns the languages (server to client).
    pub fn languages_server_to_client(&self) -> &[String] {
        &self.languages_server_to_client
    }

    /// Whether no name-list has been filled in.
    pub fn is_empty(&self) -> bool {
        KexField::ALL
            .iter()
            .all(|field| self.name_list(*field).is_empty())
    }

    /// Serializes the message payload, without packet framing.
    ///
    /// `first_kex_packet_follows` is always false.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_u8(MessageType::KexInit as u8);
        buf.put_slice(&self.cookie);
        self.write_name_lists(&mut buf);
        buf.put_u8(0);
        buf.put_u32(0);
        buf.to_vec()
    }

    /// Appends the ten length-prefixed name-lists in wire order.
    pub fn write_name_lists(&self, buf: &mut BytesMut) {
        for field in KexField::ALL {
            write_name_list(buf, self.name_list(field));
        }
    }
}

/// Writes a name-list to the buffer (RFC 4251 Section 5).
///
/// Format: uint32 length + comma-separated names
pub fn write_name_list(buf: &mut BytesMut, names: &[String]) {
    let list = names.join(",");
    buf.put_u32(list.len() as u32);
    buf.put_slice(list.as_bytes());
}

#[cfg(feature = "serde")]
fn serialize_hex<S: serde::Serializer>(
    cookie: &[u8; COOKIE_LEN],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(cookie))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KexInit {
        KexInit::with_cookie([7u8; COOKIE_LEN])
            .with_name_list(
                KexField::KexAlgorithms,
                ["curve25519-sha256", "diffie-hellman-group14-sha256"],
            )
            .with_name_list(KexField::ServerHostKeyAlgorithms, ["ssh-ed25519"])
            .with_name_list(KexField::CompressionServerToClient, ["none"])
    }

    #[test]
    fn test_field_order_matches_wire() {
        assert_eq!(KexField::ALL.len(), 10);
        assert_eq!(KexField::ALL[0], KexField::KexAlgorithms);
        assert_eq!(KexField::ALL[9], KexField::LanguagesServerToClient);
        assert_eq!(
            KexField::MacServerToClient.to_string(),
            "mac_algorithms_server_to_client"
        );
    }

    #[test]
    fn test_set_and_get_every_field() {
        let mut kexinit = KexInit::default();
        for (i, field) in KexField::ALL.iter().enumerate() {
            kexinit.set_name_list(*field, vec![format!("alg-{}", i)]);
        }
        for (i, field) in KexField::ALL.iter().enumerate() {
            assert_eq!(kexinit.name_list(*field), [format!("alg-{}", i)]);
        }
        assert!(!kexinit.is_empty());
    }

    #[test]
    fn test_to_bytes_layout() {
        let bytes = sample().to_bytes();

        assert_eq!(bytes[0], 20);
        assert_eq!(&bytes[1..17], &[7u8; COOKIE_LEN]);
        let first_len = u32::from_be_bytes([bytes[17], bytes[18], bytes[19], bytes[20]]);
        assert_eq!(first_len as usize, "curve25519-sha256,diffie-hellman-group14-sha256".len());
        // first_kex_packet_follows + reserved
        assert_eq!(&bytes[bytes.len() - 5..], &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_name_list_is_bare_length() {
        let mut buf = BytesMut::new();
        write_name_list(&mut buf, &[]);
        assert_eq!(&buf[..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_default_is_empty_with_zero_cookie() {
        let kexinit = KexInit::default();
        assert!(kexinit.is_empty());
        assert_eq!(kexinit.cookie(), &[0u8; COOKIE_LEN]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_cookie_as_hex() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["cookie"], "07".repeat(COOKIE_LEN));
        assert_eq!(value["server_host_key_algorithms"][0], "ssh-ed25519");
        assert!(value["languages_server_to_client"].as_array().unwrap().is_empty());
    }
}

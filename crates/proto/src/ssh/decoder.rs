//! KEXINIT packet decoder.
//!
//! Walks the raw bytes of the server's first binary packet:
//!
//! ```text
//! offset 0   uint32    packet_length
//! offset 4   byte      padding_length
//! offset 5   byte      SSH_MSG_KEXINIT (20)
//! offset 6   byte[16]  cookie
//! offset 22  name-list x 10
//! ```
//!
//! Every name-list end offset is checked against [`MAX_PACKET_SIZE`] before
//! any byte of it is touched, so a peer declaring a huge field is reported as
//! [`SshScanError::OversizedField`] rather than trusted. A field that stays
//! under the ceiling but runs past the bytes actually received is a framing
//! error. Bytes past the end of what was received are never read as zeros,
//! so a short packet fails here instead of yielding empty trailing lists.
//! The trailing `first_kex_packet_follows` and reserved fields are never
//! read.
//!
//! # Example
//!
//! ```rust
//! use sshscan_proto::ssh::decoder::decode_kexinit;
//! use sshscan_proto::ssh::kex::{KexField, KexInit};
//! use sshscan_proto::ssh::packet::Packet;
//!
//! let offer = KexInit::default().with_name_list(KexField::KexAlgorithms, ["curve25519-sha256"]);
//! let raw = Packet::new(offer.to_bytes()).to_bytes();
//!
//! let decoded = decode_kexinit(&raw, "localhost").unwrap();
//! assert_eq!(decoded.kex_algorithms(), ["curve25519-sha256"]);
//! ```

use crate::ssh::kex::{KexField, KexInit, COOKIE_LEN};
use crate::ssh::message::MessageType;
use crate::ssh::packet::{MAX_PACKET_SIZE, PACKET_HEADER_LEN};
use sshscan_platform::{SshScanError, SshScanResult};
use tracing::{debug, trace, warn};

/// Offset of the message number within the raw packet.
pub const MESSAGE_TYPE_OFFSET: usize = PACKET_HEADER_LEN;

/// Offset of the first name-list: header, message number, cookie.
pub const PAYLOAD_BEGIN: usize = PACKET_HEADER_LEN + 1 + COOKIE_LEN;

/// Forward-only reader over length-prefixed name-lists.
///
/// `begin..end` is the byte range of the last field read; the next length
/// prefix is read at `end`.
#[derive(Debug)]
pub struct NameListCursor<'a> {
    buf: &'a [u8],
    server: &'a str,
    begin: usize,
    end: usize,
}

impl<'a> NameListCursor<'a> {
    /// Cursor positioned at `offset` in `buf`. `server` names the peer in
    /// overflow reports.
    pub fn new(buf: &'a [u8], server: &'a str, offset: usize) -> Self {
        Self {
            buf,
            server,
            begin: offset,
            end: offset,
        }
    }

    /// Offset the next length prefix will be read from.
    pub fn position(&self) -> usize {
        self.end
    }

    /// Byte range of the most recently read field value.
    pub fn last_range(&self) -> std::ops::Range<usize> {
        self.begin..self.end
    }

    /// Reads one name-list and advances past it.
    ///
    /// # Errors
    ///
    /// - [`SshScanError::Framing`] if the length prefix or the field value
    ///   is not fully inside the received bytes
    /// - [`SshScanError::OversizedField`] if the field would end beyond
    ///   [`MAX_PACKET_SIZE`]
    pub fn read_name_list(&mut self) -> SshScanResult<Vec<String>> {
        let prefix = self.buf.get(self.end..self.end + 4).ok_or_else(|| {
            SshScanError::Framing(format!(
                "cannot read name-list length at offset {}: only {} bytes received",
                self.end,
                self.buf.len()
            ))
        })?;
        let length = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;

        let begin = self.end + 4;
        let end = begin.saturating_add(length);
        if end > MAX_PACKET_SIZE {
            return Err(SshScanError::OversizedField {
                server: self.server.to_string(),
                end,
                limit: MAX_PACKET_SIZE,
            });
        }
        let value = self.buf.get(begin..end).ok_or_else(|| {
            SshScanError::Framing(format!(
                "name-list truncated: field ends at byte {} but only {} bytes received",
                end,
                self.buf.len()
            ))
        })?;

        self.begin = begin;
        self.end = end;

        if value.is_empty() {
            return Ok(Vec::new());
        }
        Ok(String::from_utf8_lossy(value)
            .split(',')
            .map(String::from)
            .collect())
    }
}

/// Validated KEXINIT packet, ready to yield its name-lists.
#[derive(Debug)]
pub struct KexInitDecoder<'a> {
    packet_length: u32,
    cookie: [u8; COOKIE_LEN],
    cursor: NameListCursor<'a>,
}

impl<'a> KexInitDecoder<'a> {
    /// Checks the packet header, message number and cookie.
    ///
    /// # Errors
    ///
    /// - [`SshScanError::Framing`] if `raw` is too short for the length,
    ///   message number or cookie
    /// - [`SshScanError::UnexpectedMessageType`] if the message is not
    ///   SSH_MSG_KEXINIT
    pub fn new(raw: &'a [u8], server: &'a str) -> SshScanResult<Self> {
        let length = raw.get(..4).ok_or_else(|| {
            SshScanError::Framing(format!(
                "cannot decode packet length: need 4 bytes, got {}",
                raw.len()
            ))
        })?;
        let packet_length = u32::from_be_bytes([length[0], length[1], length[2], length[3]]);

        let message_type = *raw.get(MESSAGE_TYPE_OFFSET).ok_or_else(|| {
            SshScanError::Framing(format!(
                "packet too short for a message number: {} bytes",
                raw.len()
            ))
        })?;
        if message_type != MessageType::KexInit as u8 {
            warn!(
                server,
                actual = message_type,
                kind = MessageType::from_u8(message_type).map_or("unknown", MessageType::name),
                "server did not open with SSH_MSG_KEXINIT"
            );
            return Err(SshScanError::UnexpectedMessageType {
                expected: MessageType::KexInit as u8,
                actual: message_type,
            });
        }

        let cookie: [u8; COOKIE_LEN] = raw
            .get(MESSAGE_TYPE_OFFSET + 1..PAYLOAD_BEGIN)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| {
                SshScanError::Framing(format!(
                    "packet too short for the KEXINIT cookie: {} bytes",
                    raw.len()
                ))
            })?;

        if (packet_length as usize).saturating_add(4) > raw.len() {
            trace!(
                server,
                packet_length,
                received = raw.len(),
                "KEXINIT packet shorter than declared"
            );
        }

        Ok(Self {
            packet_length,
            cookie,
            cursor: NameListCursor::new(raw, server, PAYLOAD_BEGIN),
        })
    }

    /// `packet_length` as declared by the peer.
    pub fn packet_length(&self) -> u32 {
        self.packet_length
    }

    /// The 16-byte cookie.
    pub fn cookie(&self) -> &[u8; COOKIE_LEN] {
        &self.cookie
    }

    /// Offset just past the last name-list read.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Stores the cookie, then each name-list in wire order, into `kexinit`.
    ///
    /// Decoding stops at the first error; lists read before it stay in
    /// `kexinit` and later ones are left untouched.
    pub fn decode_into(&mut self, kexinit: &mut KexInit) -> SshScanResult<()> {
        kexinit.set_cookie(self.cookie);
        for field in KexField::ALL {
            let names = self.cursor.read_name_list()?;
            trace!(%field, count = names.len(), range = ?self.cursor.last_range(), "name-list");
            kexinit.set_name_list(field, names);
        }
        debug!(bytes = self.cursor.position(), "KEXINIT decoded");
        Ok(())
    }
}

/// Decodes a complete KEXINIT packet received from `server`.
pub fn decode_kexinit(raw: &[u8], server: &str) -> SshScanResult<KexInit> {
    let mut kexinit = KexInit::default();
    KexInitDecoder::new(raw, server)?.decode_into(&mut kexinit)?;
    Ok(kexinit)
}

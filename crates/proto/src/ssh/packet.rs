//! SSH binary packet framing (RFC 4253 Section 6).
//!
//! # Packet Format
//!
//! ```text
//! uint32    packet_length
//! byte      padding_length
//! byte[n1]  payload (n1 = packet_length - padding_length - 1)
//! byte[n2]  random padding (n2 = padding_length)
//! ```
//!
//! Before key exchange there is no MAC and no encryption, so the server's
//! KEXINIT arrives in exactly this layout.
//!
//! # Example
//!
//! ```rust
//! use sshscan_proto::ssh::packet::{declared_frame_len, Packet};
//!
//! let packet = Packet::new(vec![20; 40]);
//! let bytes = packet.to_bytes();
//! assert_eq!(bytes.len() % 8, 0);
//! assert_eq!(declared_frame_len(&bytes), Some(bytes.len()));
//! ```

use bytes::{BufMut, BytesMut};
use rand::RngCore;

/// Largest packet the probe will read (RFC 4253 Section 6.1).
///
/// This is also the ceiling every decoded field is checked against.
pub const MAX_PACKET_SIZE: usize = 35000;

/// `packet_length` plus `padding_length`.
pub const PACKET_HEADER_LEN: usize = 5;

/// Minimum padding length in bytes (RFC 4253 Section 6).
pub const MIN_PADDING_LEN: usize = 4;

const BLOCK_SIZE: usize = 8;

/// Unencrypted SSH binary packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    payload: Vec<u8>,
    padding: Vec<u8>,
}

impl Packet {
    /// Wraps `payload` with random padding aligned to an 8-byte block.
    ///
    /// # Panics
    ///
    /// Panics if the framed packet would exceed [`MAX_PACKET_SIZE`].
    pub fn new(payload: Vec<u8>) -> Self {
        let unpadded_len = PACKET_HEADER_LEN + payload.len();
        let mut padding_len = MIN_PADDING_LEN;
        while (unpadded_len + padding_len) % BLOCK_SIZE != 0 {
            padding_len += 1;
        }

        let total_size = unpadded_len + padding_len;
        assert!(
            total_size <= MAX_PACKET_SIZE,
            "Packet size {} exceeds maximum {}",
            total_size,
            MAX_PACKET_SIZE
        );

        let mut padding = vec![0u8; padding_len];
        rand::thread_rng().fill_bytes(&mut padding);

        Self { payload, padding }
    }

    /// Returns the payload of this packet.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the padding of this packet.
    pub fn padding(&self) -> &[u8] {
        &self.padding
    }

    /// Serializes this packet to wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let packet_length = 1 + self.payload.len() + self.padding.len();
        let mut buf = BytesMut::with_capacity(4 + packet_length);
        buf.put_u32(packet_length as u32);
        buf.put_u8(self.padding.len() as u8);
        buf.put_slice(&self.payload);
        buf.put_slice(&self.padding);
        buf.to_vec()
    }
}

/// Total frame size announced by the first four bytes of `buf`.
///
/// Returns `None` until the length field itself has arrived. The value is
/// what the peer claims; callers must still cap it at [`MAX_PACKET_SIZE`].
pub fn declared_frame_len(buf: &[u8]) -> Option<usize> {
    let length: [u8; 4] = buf.get(..4)?.try_into().ok()?;
    Some(4 + u32::from_be_bytes(length) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_alignment_and_padding() {
        for len in [0, 1, 3, 7, 22, 100] {
            let packet = Packet::new(vec![0xab; len]);
            assert!(packet.padding().len() >= MIN_PADDING_LEN);
            assert_eq!(packet.to_bytes().len() % BLOCK_SIZE, 0);
        }
    }

    #[test]
    fn test_packet_layout() {
        let packet = Packet::new(b"test".to_vec());
        let bytes = packet.to_bytes();
        let padding_len = bytes[4] as usize;

        assert_eq!(packet.payload(), b"test");
        assert_eq!(padding_len, packet.padding().len());
        assert_eq!(&bytes[5..9], b"test");
        assert_eq!(declared_frame_len(&bytes), Some(bytes.len()));
    }

    #[test]
    fn test_declared_frame_len_needs_four_bytes() {
        assert_eq!(declared_frame_len(&[]), None);
        assert_eq!(declared_frame_len(&[0, 0, 1]), None);
        assert_eq!(declared_frame_len(&[0, 0, 1, 0]), Some(4 + 256));
    }

    #[test]
    #[should_panic(expected = "Packet size")]
    fn test_packet_exceeds_max_size() {
        let _packet = Packet::new(vec![0u8; MAX_PACKET_SIZE]);
    }
}

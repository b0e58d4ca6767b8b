//! Transport handshaker: connect, swap identification strings, pull the
//! server's first binary packet.
//!
//! The sequence mirrors the start of RFC 4253:
//!
//! 1. TCP connect, bounded by [`ScanConfig::connect_timeout`]
//! 2. Read the server identification string (at most 255 bytes)
//! 3. Send `SSH-2.0-sshscan\r\n`
//! 4. Read the server's KEXINIT packet (at most 35000 bytes)
//!
//! Every read and write after connect shares one deadline,
//! `connect + io_timeout`. The stream is owned by [`handshake`] and closed
//! when it returns, whatever the outcome.
//!
//! With [`ReadMode::Single`] each of steps 2 and 4 is a single read call: a
//! banner or packet split across TCP segments is cut short, and anything the
//! server sent along with its banner in the first read is dropped.
//! [`ReadMode::Complete`] reads until the line or the declared frame is
//! complete instead.

use crate::ssh::config::{ReadMode, ScanConfig};
use crate::ssh::packet::{declared_frame_len, MAX_PACKET_SIZE};
use crate::ssh::version::{Version, MAX_VERSION_LENGTH};
use sshscan_platform::{SshScanError, SshScanResult};
use std::future::Future;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, trace, warn};

/// What the server sent before key exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    /// Identification string exactly as received, line ending included.
    pub banner: String,
    /// Raw bytes of the first binary packet, starting at `packet_length`.
    pub packet: Vec<u8>,
}

/// Joins host and port the way a dialer expects, bracketing IPv6 literals.
pub fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Connects to `host:port` and runs [`exchange`] on the new stream.
///
/// # Errors
///
/// [`SshScanError::Connection`] if resolution or connect fails or exceeds
/// the connect timeout; otherwise whatever [`exchange`] reports.
pub async fn handshake(host: &str, port: &str, config: &ScanConfig) -> SshScanResult<Handshake> {
    let addr = join_host_port(host, port);
    debug!(%addr, timeout = ?config.connect_timeout, "connecting");

    let mut stream = timeout(config.connect_timeout, TcpStream::connect(addr.as_str()))
        .await
        .map_err(|_| {
            SshScanError::Connection(io::Error::new(
                io::ErrorKind::TimedOut,
                format!(
                    "connect to {} timed out after {:?}",
                    addr, config.connect_timeout
                ),
            ))
        })?
        .map_err(SshScanError::Connection)?;

    exchange(&mut stream, config).await
}

/// Swaps identification strings and reads the first packet over `stream`.
///
/// # Errors
///
/// [`SshScanError::Io`] on read or write failure, end of stream before any
/// data, or when the I/O deadline passes.
pub async fn exchange<S>(stream: &mut S, config: &ScanConfig) -> SshScanResult<Handshake>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let deadline = Instant::now() + config.io_timeout;

    let (banner, pending) = match config.read_mode {
        ReadMode::Single => (read_banner_once(stream, deadline).await?, Vec::new()),
        ReadMode::Complete => read_banner_line(stream, deadline).await?,
    };
    match Version::parse(&banner) {
        Ok(version) => debug!(
            proto = version.proto_version(),
            software = version.software(),
            comments = version.comments().unwrap_or(""),
            "server identification"
        ),
        Err(e) => warn!(error = %e, "server identification string does not parse"),
    }

    let ours = config.client_version.to_wire_format();
    with_deadline(deadline, "identification write", stream.write_all(&ours)).await?;
    trace!(bytes = ours.len(), "identification sent");

    let packet = match config.read_mode {
        ReadMode::Single => read_packet_once(stream, deadline).await?,
        ReadMode::Complete => read_packet_frame(stream, deadline, pending).await?,
    };
    debug!(bytes = packet.len(), "packet received");

    Ok(Handshake { banner, packet })
}

async fn with_deadline<F, T>(deadline: Instant, what: &str, op: F) -> SshScanResult<T>
where
    F: Future<Output = io::Result<T>>,
{
    match timeout_at(deadline, op).await {
        Ok(result) => result.map_err(SshScanError::Io),
        Err(_) => Err(SshScanError::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("{} timed out", what),
        ))),
    }
}

fn closed_before(what: &str) -> SshScanError {
    SshScanError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("connection closed by peer before {}", what),
    ))
}

async fn read_banner_once<S>(stream: &mut S, deadline: Instant) -> SshScanResult<String>
where
    S: AsyncRead + Unpin,
{
    let mut buf = [0u8; MAX_VERSION_LENGTH];
    let n = with_deadline(deadline, "banner read", stream.read(&mut buf)).await?;
    if n == 0 {
        return Err(closed_before("identification string"));
    }
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}

/// Reads until LF or 255 bytes. Bytes after the line are returned as the
/// start of the next packet.
async fn read_banner_line<S>(stream: &mut S, deadline: Instant) -> SshScanResult<(String, Vec<u8>)>
where
    S: AsyncRead + Unpin,
{
    let mut acc = Vec::with_capacity(MAX_VERSION_LENGTH);
    let mut chunk = [0u8; MAX_VERSION_LENGTH];

    let line_len = loop {
        if let Some(lf) = acc.iter().position(|&b| b == b'\n') {
            break lf + 1;
        }
        if acc.len() >= MAX_VERSION_LENGTH {
            break MAX_VERSION_LENGTH;
        }
        // never buffer more than one identification line's worth
        let room = MAX_VERSION_LENGTH - acc.len();
        let n = with_deadline(deadline, "banner read", stream.read(&mut chunk[..room])).await?;
        if n == 0 {
            if acc.is_empty() {
                return Err(closed_before("identification string"));
            }
            break acc.len();
        }
        acc.extend_from_slice(&chunk[..n]);
    };

    let rest = acc.split_off(line_len);
    Ok((String::from_utf8_lossy(&acc).into_owned(), rest))
}

async fn read_packet_once<S>(stream: &mut S, deadline: Instant) -> SshScanResult<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; MAX_PACKET_SIZE];
    let n = with_deadline(deadline, "packet read", stream.read(&mut buf)).await?;
    if n == 0 {
        return Err(closed_before("key exchange init"));
    }
    buf.truncate(n);
    Ok(buf)
}

/// Reads until the frame announced by `packet_length` is buffered, capped at
/// [`MAX_PACKET_SIZE`]. End of stream after some data ends the read early.
async fn read_packet_frame<S>(
    stream: &mut S,
    deadline: Instant,
    mut buf: Vec<u8>,
) -> SshScanResult<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; MAX_PACKET_SIZE];
    loop {
        let target =
            declared_frame_len(&buf).map_or(MAX_PACKET_SIZE, |len| len.min(MAX_PACKET_SIZE));
        if buf.len() >= target {
            break;
        }
        let want = MAX_PACKET_SIZE - buf.len();
        let n = with_deadline(deadline, "packet read", stream.read(&mut chunk[..want])).await?;
        if n == 0 {
            if buf.is_empty() {
                return Err(closed_before("key exchange init"));
            }
            trace!(have = buf.len(), target, "peer closed mid-packet");
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    buf.truncate(MAX_PACKET_SIZE);
    Ok(buf)
}

//! Integration tests for the probe against an in-process SSH server stub.
//!
//! The stub speaks just enough of RFC 4253 to be scanned:
//! - sends its identification string
//! - waits for ours
//! - sends one binary packet and hangs up

use bytes::{BufMut, BytesMut};
use sshscan_proto::ssh::kex::write_name_list;
use sshscan_proto::ssh::{
    inspect, inspect_with_config, KexField, KexInit, MessageType, Packet, ReadMode, ScanConfig,
};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::{timeout, Duration};

const SERVER_BANNER: &[u8] = b"SSH-2.0-OpenSSH_9.6p1 Ubuntu-3ubuntu13\r\n";

/// How the stub puts its banner and packet on the wire.
#[derive(Clone, Copy)]
enum Delivery {
    /// Banner, wait for the client banner, then the packet in one write.
    Separate,
    /// Banner and packet in one write, then wait for the client banner.
    Coalesced,
}

/// Starts a stub that serves a single connection.
async fn spawn_stub(packet: Option<Vec<u8>>, delivery: Delivery) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut client_banner = [0u8; 17];

        match (delivery, packet) {
            (Delivery::Coalesced, Some(packet)) => {
                let mut first = SERVER_BANNER.to_vec();
                first.extend_from_slice(&packet);
                socket.write_all(&first).await.unwrap();
                socket.read_exact(&mut client_banner).await.unwrap();
            }
            (_, packet) => {
                socket.write_all(SERVER_BANNER).await.unwrap();
                socket.read_exact(&mut client_banner).await.unwrap();
                match packet {
                    Some(packet) => socket.write_all(&packet).await.unwrap(),
                    None => return,
                }
            }
        }
        assert_eq!(&client_banner, b"SSH-2.0-sshscan\r\n");

        // Let the client finish reading before the socket closes.
        let mut rest = Vec::new();
        let _ = timeout(Duration::from_secs(2), socket.read_to_end(&mut rest)).await;
    });

    addr
}

fn openssh_offer() -> KexInit {
    KexInit::with_random_cookie()
        .with_name_list(
            KexField::KexAlgorithms,
            [
                "sntrup761x25519-sha512@openssh.com",
                "curve25519-sha256",
                "curve25519-sha256@libssh.org",
                "ecdh-sha2-nistp256",
                "diffie-hellman-group14-sha256",
                "kex-strict-s-v00@openssh.com",
            ],
        )
        .with_name_list(
            KexField::ServerHostKeyAlgorithms,
            ["rsa-sha2-512", "rsa-sha2-256", "ecdsa-sha2-nistp256", "ssh-ed25519"],
        )
        .with_name_list(
            KexField::EncryptionClientToServer,
            ["chacha20-poly1305@openssh.com", "aes128-ctr", "aes256-gcm@openssh.com"],
        )
        .with_name_list(
            KexField::EncryptionServerToClient,
            ["chacha20-poly1305@openssh.com", "aes128-ctr", "aes256-gcm@openssh.com"],
        )
        .with_name_list(
            KexField::MacClientToServer,
            ["umac-64-etm@openssh.com", "hmac-sha2-256-etm@openssh.com"],
        )
        .with_name_list(
            KexField::MacServerToClient,
            ["umac-64-etm@openssh.com", "hmac-sha2-256-etm@openssh.com"],
        )
        .with_name_list(KexField::CompressionClientToServer, ["none", "zlib@openssh.com"])
        .with_name_list(KexField::CompressionServerToClient, ["none", "zlib@openssh.com"])
}

/// Test a full scan with one read per step.
#[tokio::test]
async fn test_scan_openssh_like_server() {
    let offer = openssh_offer();
    let addr = spawn_stub(
        Some(Packet::new(offer.to_bytes()).to_bytes()),
        Delivery::Separate,
    )
    .await;

    let result = inspect("127.0.0.1", &addr.port().to_string()).await;

    assert!(!result.is_failed(), "{:?}", result.failure_reason());
    assert_eq!(result.server(), "127.0.0.1");
    assert_eq!(
        result.protocol_version(),
        "SSH-2.0-OpenSSH_9.6p1 Ubuntu-3ubuntu13\r\n"
    );
    assert_eq!(result.kexinit(), &offer);
    assert_eq!(result.cookie(), offer.cookie());
    assert!(result.kexinit().languages_server_to_client().is_empty());
}

/// Test the complete-read mode when the server coalesces banner and packet.
#[tokio::test]
async fn test_scan_coalesced_banner_and_packet() {
    let offer = openssh_offer();
    let addr = spawn_stub(
        Some(Packet::new(offer.to_bytes()).to_bytes()),
        Delivery::Coalesced,
    )
    .await;

    let config = ScanConfig::default().with_read_mode(ReadMode::Complete);
    let result = inspect_with_config("127.0.0.1", &addr.port().to_string(), &config).await;

    assert!(!result.is_failed(), "{:?}", result.failure_reason());
    assert_eq!(
        result.protocol_version(),
        "SSH-2.0-OpenSSH_9.6p1 Ubuntu-3ubuntu13\r\n"
    );
    assert_eq!(result.kexinit(), &offer);
}

/// Test a zero cookie, a single two-byte list, and nine empty lists.
#[tokio::test]
async fn test_scan_minimal_kexinit() {
    let offer = KexInit::with_cookie([0u8; 16]).with_name_list(KexField::KexAlgorithms, ["ab"]);
    let addr = spawn_stub(
        Some(Packet::new(offer.to_bytes()).to_bytes()),
        Delivery::Separate,
    )
    .await;

    let result = inspect("127.0.0.1", &addr.port().to_string()).await;

    assert!(!result.is_failed(), "{:?}", result.failure_reason());
    assert_eq!(result.cookie(), &[0u8; 16]);
    assert_eq!(result.kexinit().kex_algorithms(), ["ab"]);
    for field in &KexField::ALL[1..] {
        assert!(result.name_list(*field).is_empty(), "{} not empty", field);
    }
}

/// Test a server that answers with SSH_MSG_DISCONNECT instead of KEXINIT.
#[tokio::test]
async fn test_scan_disconnect_instead_of_kexinit() {
    let mut disconnect = BytesMut::new();
    disconnect.put_u8(MessageType::Disconnect as u8);
    disconnect.put_u32(2); // SSH_DISCONNECT_PROTOCOL_ERROR
    disconnect.put_u32(22);
    disconnect.put_slice(b"too many connections\r\n");
    disconnect.put_u32(0);
    let addr = spawn_stub(
        Some(Packet::new(disconnect.to_vec()).to_bytes()),
        Delivery::Separate,
    )
    .await;

    let result = inspect("127.0.0.1", &addr.port().to_string()).await;

    assert!(result.is_failed());
    let reason = result.failure_reason().unwrap();
    assert!(reason.contains("expected message type 20"), "{}", reason);
    assert!(reason.contains("got 1"), "{}", reason);
    assert!(!result.protocol_version().is_empty());
    assert!(result.kexinit().is_empty());
    assert_eq!(result.cookie(), &[0u8; 16]);
}

/// Test a server declaring a name-list past the 35000-byte ceiling.
#[tokio::test]
async fn test_scan_oversized_field() {
    let mut payload = BytesMut::new();
    payload.put_u8(MessageType::KexInit as u8);
    payload.put_slice(&[0x11; 16]);
    write_name_list(&mut payload, &["curve25519-sha256".to_string()]);
    write_name_list(&mut payload, &["ssh-ed25519".to_string()]);
    write_name_list(&mut payload, &["aes128-ctr".to_string()]);
    payload.put_u32(1_000_000);
    payload.put_slice(b"aes128-ctr");
    let addr = spawn_stub(
        Some(Packet::new(payload.to_vec()).to_bytes()),
        Delivery::Separate,
    )
    .await;

    let result = inspect("127.0.0.1", &addr.port().to_string()).await;

    assert!(result.is_failed());
    let reason = result.failure_reason().unwrap();
    assert!(
        reason.contains("server 127.0.0.1 is attempting to overflow the maximum expected packet size"),
        "{}",
        reason
    );
    assert_eq!(result.cookie(), &[0x11; 16]);
    assert_eq!(result.kexinit().kex_algorithms(), ["curve25519-sha256"]);
    assert_eq!(result.kexinit().server_host_key_algorithms(), ["ssh-ed25519"]);
    assert_eq!(result.kexinit().encryption_algorithms_client_to_server(), ["aes128-ctr"]);
    for field in &KexField::ALL[3..] {
        assert!(result.name_list(*field).is_empty(), "{} not empty", field);
    }
}

/// Test a server that hangs up right after the banner exchange.
#[tokio::test]
async fn test_scan_server_closes_after_banner() {
    let addr = spawn_stub(None, Delivery::Separate).await;

    let result = inspect("127.0.0.1", &addr.port().to_string()).await;

    assert!(result.is_failed());
    assert!(result.failure_reason().unwrap().starts_with("IO error"));
    assert!(result.protocol_version().starts_with("SSH-2.0-OpenSSH_9.6p1"));
    assert!(result.kexinit().is_empty());
}

/// Test that a server which never speaks is cut off by the I/O deadline.
#[tokio::test]
async fn test_scan_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let holder = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let config = ScanConfig::default().with_io_timeout(Duration::from_millis(200));
    let result = timeout(
        Duration::from_secs(3),
        inspect_with_config("127.0.0.1", &port.to_string(), &config),
    )
    .await
    .expect("probe must respect its I/O deadline");

    assert!(result.is_failed());
    assert!(result.failure_reason().unwrap().contains("timed out"));
    holder.abort();
}

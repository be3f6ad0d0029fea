// Native probe - in-process OpenSSL handshakes against an endpoint
//
// Each attempt opens a fresh TCP connection with the dial timeout, then runs
// the blocking OpenSSL handshake on the blocking pool with the same timeout
// applied to socket reads and writes.

use super::ladder::{Attempt, HandshakeDriver, assess};
use super::{ProbeMode, ProbeSettings, Prober, TlsProbeResult};
use crate::ciphers::{compute_disallowed_ciphers, native_name};
use crate::error::TlsError;
use crate::policy::TlsPolicy;
use crate::protocols::Protocol;
use crate::utils::network::{connect_with_timeout, into_blocking};
use async_trait::async_trait;
use openssl::ssl::{HandshakeError, SslConnector, SslMethod, SslVerifyMode};
use std::io;
use std::net::IpAddr;
use std::time::Duration;

/// Cipher string offering everything the local library supports, including
/// suites (and protocol versions) disabled at the default security level
const ALL_CIPHERS: &str = "ALL:@SECLEVEL=0";

/// What a single handshake offers
#[derive(Debug, Clone)]
struct Offer {
    min: Protocol,
    max: Protocol,
    cipher_list: String,
}

/// Parameters of an established session
#[derive(Debug)]
struct Established {
    protocol: Option<Protocol>,
    cipher: Option<String>,
}

/// Probe that drives OpenSSL directly
#[derive(Debug, Clone, Default)]
pub struct NativeProber {
    settings: ProbeSettings,
}

impl NativeProber {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }

    async fn attempt(&self, address: &str, port: u16, offer: Offer) -> Attempt {
        match self.handshake(address, port, offer).await {
            Ok(established) => Attempt::Accepted {
                protocol: established.protocol,
                cipher: established.cipher,
            },
            Err(e) => Attempt::Failed {
                evidence: e.to_string(),
            },
        }
    }

    async fn handshake(
        &self,
        address: &str,
        port: u16,
        offer: Offer,
    ) -> std::result::Result<Established, TlsError> {
        let timeout = self.settings.dial_timeout;
        let stream = connect_with_timeout(address, port, timeout).await?;
        let std_stream = into_blocking(stream, timeout)?;
        let host = address.to_string();

        // Wrap blocking SSL operations in spawn_blocking
        tokio::task::spawn_blocking(move || handshake_blocking(&host, std_stream, &offer, timeout))
            .await?
    }
}

fn handshake_blocking(
    host: &str,
    stream: std::net::TcpStream,
    offer: &Offer,
    timeout: Duration,
) -> std::result::Result<Established, TlsError> {
    let mut builder = SslConnector::builder(SslMethod::tls())?;
    builder.set_verify(SslVerifyMode::NONE);
    builder.set_min_proto_version(Some(offer.min.ssl_version()))?;
    builder.set_max_proto_version(Some(offer.max.ssl_version()))?;
    builder.set_cipher_list(&offer.cipher_list)?;
    let connector = builder.build();

    // SNI cannot carry an IP literal
    let use_sni = host.parse::<IpAddr>().is_err();
    let config = connector
        .configure()?
        .verify_hostname(false)
        .use_server_name_indication(use_sni);

    match config.connect(host, stream) {
        Ok(tls) => {
            let ssl = tls.ssl();
            Ok(Established {
                protocol: Protocol::from_ssl_version_str(ssl.version_str()),
                cipher: ssl
                    .current_cipher()
                    .map(|c| c.standard_name().unwrap_or(c.name()).to_string()),
            })
        }
        Err(HandshakeError::SetupFailure(e)) => Err(TlsError::OpenSslError(e)),
        // A blocking socket only reports WouldBlock when the read timeout fired
        Err(HandshakeError::WouldBlock(_)) => Err(TlsError::Timeout { duration: timeout }),
        Err(HandshakeError::Failure(mid)) => {
            let error = mid.error();
            let stalled = error
                .io_error()
                .is_some_and(|e| matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut));
            if stalled {
                Err(TlsError::Timeout { duration: timeout })
            } else {
                Err(TlsError::InvalidHandshake {
                    details: error.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl HandshakeDriver for NativeProber {
    fn mode(&self) -> ProbeMode {
        ProbeMode::Native
    }

    async fn pinned(&self, address: &str, port: u16, version: Protocol) -> Attempt {
        let offer = Offer {
            min: version,
            max: version,
            cipher_list: ALL_CIPHERS.to_string(),
        };
        self.attempt(address, port, offer).await
    }

    async fn at_most(&self, address: &str, port: u16, max: Protocol) -> Attempt {
        let offer = Offer {
            min: Protocol::TLS10,
            max,
            cipher_list: ALL_CIPHERS.to_string(),
        };
        self.attempt(address, port, offer).await
    }

    async fn disallowed_ciphers(
        &self,
        address: &str,
        port: u16,
        policy: &TlsPolicy,
    ) -> Option<Attempt> {
        let names: Vec<&str> = compute_disallowed_ciphers(policy.allowed_cipher_ids())
            .into_iter()
            .filter_map(native_name)
            .collect();
        if names.is_empty() {
            return None;
        }

        let offer = Offer {
            min: Protocol::TLS12,
            max: Protocol::TLS12,
            cipher_list: format!("{}:@SECLEVEL=0", names.join(":")),
        };
        let attempt = self.attempt(address, port, offer).await;
        if let Attempt::Failed { evidence } = &attempt {
            tracing::debug!("Disallowed cipher offer to {}:{} refused: {}", address, port, evidence);
        }
        Some(attempt)
    }
}

#[async_trait]
impl Prober for NativeProber {
    async fn probe(&self, address: &str, port: u16, policy: &TlsPolicy) -> TlsProbeResult {
        assess(self, address, port, policy).await
    }

    fn mode(&self) -> ProbeMode {
        ProbeMode::Native
    }
}

/// Probe `address:port` in-process with default settings
pub async fn probe_tls(address: &str, port: u16, policy: &TlsPolicy) -> TlsProbeResult {
    NativeProber::default().probe(address, port, policy).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::default_policy;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let port = closed_port().await;
        let result = probe_tls("127.0.0.1", port, &default_policy()).await;

        assert!(result.compliant);
        assert!(!result.reachable);
        assert!(result.reason.starts_with("port unreachable"), "{}", result.reason);
    }

    #[tokio::test]
    async fn test_plain_tcp_is_not_tls() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n").await;
                });
            }
        });

        let result = probe_tls("127.0.0.1", port, &default_policy()).await;
        assert!(result.compliant, "{}", result.reason);
        assert!(!result.is_tls);
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let prober = NativeProber::new(ProbeSettings {
            dial_timeout: Duration::from_millis(300),
            ..Default::default()
        });
        let attempt = prober.pinned("127.0.0.1", port, Protocol::TLS12).await;
        match attempt {
            Attempt::Failed { evidence } => assert!(evidence.contains("timed out"), "{}", evidence),
            other => panic!("unexpected {:?}", other),
        }
    }
}

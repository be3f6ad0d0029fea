// Network utilities - socket helpers shared by the probes

use crate::error::TlsError;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Format `host:port`, bracketing IPv6 literals
pub fn endpoint_string(host: &str, port: u16) -> String {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => format!("[{}]:{}", host, port),
        _ => format!("{}:{}", host, port),
    }
}

/// Connect to target with timeout
pub async fn connect_with_timeout(
    host: &str,
    port: u16,
    connect_timeout: Duration,
) -> std::result::Result<TcpStream, TlsError> {
    match timeout(connect_timeout, TcpStream::connect((host, port))).await {
        Ok(stream) => Ok(stream?),
        Err(_) => Err(TlsError::ConnectionTimeout {
            duration: connect_timeout,
            addr: endpoint_string(host, port),
        }),
    }
}

/// Hand a connected tokio stream over to blocking code with socket timeouts applied
pub fn into_blocking(
    stream: TcpStream,
    io_timeout: Duration,
) -> std::result::Result<std::net::TcpStream, TlsError> {
    let std_stream = stream.into_std()?;
    std_stream.set_nonblocking(false)?;
    std_stream.set_read_timeout(Some(io_timeout))?;
    std_stream.set_write_timeout(Some(io_timeout))?;
    Ok(std_stream)
}

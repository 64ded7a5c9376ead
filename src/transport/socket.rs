use log::{debug, warn};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::Transport;
use crate::error::TransportError;

/// Raw SCPI socket port defined by LXI
pub const DEFAULT_SCPI_PORT: u16 = 5025;

/// Connection configuration for the SCPI socket transport.
///
/// Contains timeout settings for the phases of a TCP exchange.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rusty_scpi::transport::ConnectionConfig;
///
/// // Use default timeouts
/// let config = ConnectionConfig::default();
///
/// // Slow instrument, e.g. an LCR meter with long aperture
/// let config = ConnectionConfig {
///     read_timeout: Duration::from_secs(30),
///     ..ConnectionConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// Timeout for establishing the TCP connection
    pub connect_timeout: Duration,
    /// Timeout for waiting on a reply line
    pub read_timeout: Duration,
    /// Timeout for writing a command
    pub write_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(5),
        }
    }
}

/// Builder for [`SocketTransport`].
///
/// ```no_run
/// use std::time::Duration;
/// use rusty_scpi::transport::SocketTransport;
///
/// let transport = SocketTransport::builder()
///     .address("192.168.1.50")
///     .port(5555)
///     .read_timeout(Duration::from_secs(20))
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct SocketTransportBuilder {
    address: Option<String>,
    port: Option<u16>,
    config: ConnectionConfig,
}

impl SocketTransportBuilder {
    pub fn address(mut self, addr: &str) -> Self {
        self.address = Some(addr.to_string());
        self
    }

    /// Defaults to [`DEFAULT_SCPI_PORT`]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<SocketTransport, TransportError> {
        let address = self
            .address
            .ok_or_else(|| TransportError::InvalidAddress("Address must be specified".to_string()))?;
        let port = self.port.unwrap_or(DEFAULT_SCPI_PORT);

        let socket_addr: SocketAddr = (address.as_str(), port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| TransportError::InvalidAddress(format!("{address}:{port}")))?;

        debug!("Connecting to instrument at {socket_addr}");

        let stream = TcpStream::connect_timeout(&socket_addr, self.config.connect_timeout)
            .map_err(|e| {
                warn!("Failed to connect to {socket_addr}: {e}");
                if e.kind() == ErrorKind::TimedOut {
                    TransportError::Timeout
                } else {
                    TransportError::Io {
                        source: e,
                        context: format!("Failed to connect to {socket_addr}"),
                    }
                }
            })?;

        stream
            .set_read_timeout(Some(self.config.read_timeout))
            .and_then(|_| stream.set_write_timeout(Some(self.config.write_timeout)))
            .and_then(|_| stream.set_nodelay(true))
            .map_err(|source| TransportError::Io {
                source,
                context: "Configuring socket".to_string(),
            })?;

        let reader = stream.try_clone().map_err(|source| TransportError::Io {
            source,
            context: "Cloning socket for reading".to_string(),
        })?;

        debug!("Connected to {socket_addr}");

        Ok(SocketTransport {
            writer: stream,
            reader: BufReader::new(reader),
            config: self.config,
        })
    }
}

/// Raw SCPI over TCP: newline-terminated commands and replies.
///
/// No retries are attempted; a timeout or a closed connection is reported to the caller.
pub struct SocketTransport {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    config: ConnectionConfig,
}

impl SocketTransport {
    pub fn builder() -> SocketTransportBuilder {
        SocketTransportBuilder::default()
    }

    /// Connect with default timeouts
    pub fn connect(addr: &str, port: u16) -> Result<Self, TransportError> {
        Self::builder().address(addr).port(port).build()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn io_error(source: std::io::Error, context: &str) -> TransportError {
        match source.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => TransportError::Timeout,
            ErrorKind::ConnectionReset | ErrorKind::BrokenPipe | ErrorKind::UnexpectedEof => {
                TransportError::Disconnected
            }
            _ => TransportError::Io {
                source,
                context: context.to_string(),
            },
        }
    }
}

impl Transport for SocketTransport {
    fn send_command(&mut self, command: &str) -> Result<(), TransportError> {
        let mut line = String::with_capacity(command.len() + 1);
        line.push_str(command);
        line.push('\n');

        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| Self::io_error(e, "Writing command"))
    }

    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        self.send_command(command)?;

        let mut reply = String::new();
        let read = self
            .reader
            .read_line(&mut reply)
            .map_err(|e| Self::io_error(e, "Reading reply"))?;
        if read == 0 {
            return Err(TransportError::Disconnected);
        }

        let trimmed = reply.trim_end_matches(['\r', '\n']).len();
        reply.truncate(trimmed);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_builder_requires_address() {
        assert!(matches!(
            SocketTransport::builder().port(5025).build(),
            Err(TransportError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_query_strips_terminator() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = stream;
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            assert_eq!(line, "*IDN?\n");
            writer.write_all(b"RIGOL TECHNOLOGIES,DL3021,DL3A000001,00.01.02\r\n").unwrap();
            line.clear();
            reader.read_line(&mut line).unwrap();
            assert_eq!(line, "*RST\n");
        });

        let mut transport = SocketTransport::connect("127.0.0.1", port).unwrap();
        assert_eq!(
            transport.query("*IDN?").unwrap(),
            "RIGOL TECHNOLOGIES,DL3021,DL3A000001,00.01.02"
        );
        transport.send_command("*RST").unwrap();
        server.join().unwrap();
    }

    #[test]
    fn test_closed_connection_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
        });

        let mut transport = SocketTransport::connect("127.0.0.1", port).unwrap();
        let result = transport.query("*OPC?");
        server.join().unwrap();
        assert!(matches!(
            result,
            Err(TransportError::Disconnected) | Err(TransportError::Io { .. })
        ));
    }
}

//! Client/server socket handler.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::formatter::TemplateFormatter;
use crate::handler::{Handler, HandlerError};
use crate::logger::Logger;
use crate::record::LogRecord;

use super::protocol::{ACK, MAX_PAYLOAD, Transport, WireRecord};

/// Template used by the server when forwarding received records.
pub const DEFAULT_SERVER_TEMPLATE: &str =
    "{asctime}: [{loggername}]: [{loglevel}]: {client_addr}: {message}";

/// How often blocking loops wake to observe the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Fixed role of a [`SysHandler`], chosen at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Sends records to a remote server via [`Handler::emit`].
    Client,
    /// Receives records and forwards them into a local logger via
    /// [`SysHandler::serve`].
    Server,
}

/// Requests termination of a running [`SysHandler::serve`] loop.
///
/// The flag is observed between blocking socket operations, within one
/// poll interval.
#[derive(Clone, Debug)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One socket per handler instance, variant fixed by role and transport.
enum Conn {
    TcpClient(TcpStream),
    UdpClient(UdpSocket),
    TcpServer(TcpListener),
    UdpServer(UdpSocket),
}

/// Handler shipping records to, or receiving records from, a remote peer.
///
/// A `SysHandler` is a client or a server for its entire lifetime. Only
/// the client role implements the send path ([`Handler::emit`]); only the
/// server role implements the receive loop ([`SysHandler::serve`]).
/// Calling an operation on the wrong role yields a typed error and has no
/// side effects.
pub struct SysHandler {
    role: Role,
    transport: Transport,
    host: String,
    port: u16,
    client_name: String,
    template: TemplateFormatter,
    local_logger: Option<Logger>,
    conn: Conn,
    stop: Arc<AtomicBool>,
}

impl SysHandler {
    /// Construct a client handler targeting `host:port`.
    ///
    /// TCP connects immediately; a refused or timed-out connection yields
    /// [`HandlerError::ServerUnreachable`] naming the target, and no
    /// socket is retained. UDP performs no handshake: the handler binds an
    /// ephemeral local socket and sends unconnected datagrams.
    pub fn client(
        transport: Transport,
        host: impl Into<String>,
        port: u16,
    ) -> Result<Self, HandlerError> {
        let host = host.into();
        let conn = match transport {
            Transport::Tcp => {
                let stream = TcpStream::connect((host.as_str(), port)).map_err(|source| {
                    HandlerError::ServerUnreachable {
                        host: host.clone(),
                        port,
                        source,
                    }
                })?;
                Conn::TcpClient(stream)
            }
            Transport::Udp => Conn::UdpClient(UdpSocket::bind(("0.0.0.0", 0))?),
        };
        log::debug!("sys client handler connected over {transport} to {host}:{port}");
        Ok(Self {
            role: Role::Client,
            transport,
            host,
            port,
            client_name: String::from("syshandler"),
            template: TemplateFormatter::new(DEFAULT_SERVER_TEMPLATE),
            local_logger: None,
            conn,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Construct a server handler bound to `host:port`.
    ///
    /// Received records are forwarded into `local_logger` at INFO level,
    /// rendered through the server template.
    pub fn server(
        transport: Transport,
        host: impl Into<String>,
        port: u16,
        local_logger: Logger,
    ) -> Result<Self, HandlerError> {
        let host = host.into();
        let conn = match transport {
            Transport::Tcp => Conn::TcpServer(TcpListener::bind((host.as_str(), port))?),
            Transport::Udp => Conn::UdpServer(UdpSocket::bind((host.as_str(), port))?),
        };
        log::debug!("sys server handler listening over {transport} on {host}:{port}");
        Ok(Self {
            role: Role::Server,
            transport,
            host,
            port,
            client_name: String::from("syshandler"),
            template: TemplateFormatter::new(DEFAULT_SERVER_TEMPLATE),
            local_logger: Some(local_logger),
            conn,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Override the logical name sent as `client_name` on the wire.
    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }

    /// Override the server-side forwarding template.
    ///
    /// On top of the record fields, `{client_addr}` (observed peer
    /// address) and `{client_name}` (sender-declared name) are available.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = TemplateFormatter::new(template);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Local address of the underlying socket.
    ///
    /// Mainly useful for servers bound to port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        match &self.conn {
            Conn::TcpClient(stream) => stream.local_addr(),
            Conn::UdpClient(socket) => socket.local_addr(),
            Conn::TcpServer(listener) => listener.local_addr(),
            Conn::UdpServer(socket) => socket.local_addr(),
        }
    }

    /// Handle for stopping a running [`serve`](Self::serve) loop.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.stop))
    }

    /// Run the receive loop until shut down (server role only).
    ///
    /// TCP accepts one connection at a time; each received record is
    /// decoded, stamped with the peer address, rendered through the
    /// template, forwarded into the local logger at INFO level, and
    /// acknowledged. A malformed payload or I/O failure on one connection
    /// drops that connection and returns to accepting; it never
    /// terminates the loop. UDP runs the same exchange per datagram.
    pub fn serve(&mut self) -> Result<(), HandlerError> {
        if self.role == Role::Client {
            return Err(HandlerError::ServerMethodCall);
        }
        let stop = Arc::clone(&self.stop);
        match (&self.conn, self.local_logger.as_mut()) {
            (Conn::TcpServer(listener), Some(logger)) => {
                serve_tcp(listener, logger, &self.template, &stop)
            }
            (Conn::UdpServer(socket), Some(logger)) => {
                serve_udp(socket, logger, &self.template, &stop)
            }
            _ => Err(HandlerError::ServerMethodCall),
        }
    }

    /// The logger received records are forwarded into (server role only).
    pub fn local_logger(&self) -> Option<&Logger> {
        self.local_logger.as_ref()
    }
}

impl Handler for SysHandler {
    /// Transmit one record to the remote server (client role only).
    ///
    /// TCP performs one unframed write followed by one blocking read for
    /// the acknowledgement; if the peer closes instead of acknowledging,
    /// the empty read is accepted and the call returns without retrying.
    /// UDP sends one datagram and does not await acknowledgement.
    fn emit(&mut self, record: &LogRecord) -> Result<(), HandlerError> {
        if self.role == Role::Server {
            return Err(HandlerError::ClientMethodCall);
        }
        let payload = WireRecord::from_record(record, &self.client_name).encode()?;
        match &mut self.conn {
            Conn::TcpClient(stream) => {
                stream.write_all(&payload)?;
                let mut ack = [0u8; MAX_PAYLOAD];
                let _ = stream.read(&mut ack)?;
                Ok(())
            }
            Conn::UdpClient(socket) => {
                socket.send_to(&payload, (self.host.as_str(), self.port))?;
                Ok(())
            }
            _ => Err(HandlerError::ClientMethodCall),
        }
    }
}

impl std::fmt::Debug for SysHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysHandler")
            .field("role", &self.role)
            .field("transport", &self.transport)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

fn serve_tcp(
    listener: &TcpListener,
    logger: &mut Logger,
    template: &TemplateFormatter,
    stop: &AtomicBool,
) -> Result<(), HandlerError> {
    listener.set_nonblocking(true)?;
    while !stop.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(err) = serve_connection(stream, peer, logger, template, stop) {
                    log::warn!("sys server: connection from {peer} dropped: {err}");
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Lock-step exchange with one accepted client until it closes.
fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    logger: &mut Logger,
    template: &TemplateFormatter,
    stop: &AtomicBool,
) -> Result<(), HandlerError> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(POLL_INTERVAL))?;
    let peer_addr = peer.to_string();
    let mut buf = [0u8; MAX_PAYLOAD];
    loop {
        if stop.load(Ordering::SeqCst) {
            return Ok(());
        }
        let read = match stream.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(read) => read,
            Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        forward(&buf[..read], &peer_addr, logger, template)?;
        stream.write_all(ACK)?;
    }
}

fn serve_udp(
    socket: &UdpSocket,
    logger: &mut Logger,
    template: &TemplateFormatter,
    stop: &AtomicBool,
) -> Result<(), HandlerError> {
    socket.set_read_timeout(Some(POLL_INTERVAL))?;
    let mut buf = [0u8; MAX_PAYLOAD];
    while !stop.load(Ordering::SeqCst) {
        let (read, peer) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if let Err(err) = forward(&buf[..read], &peer.to_string(), logger, template) {
            log::warn!("sys server: datagram from {peer} rejected: {err}");
            continue;
        }
        if let Err(err) = socket.send_to(ACK, peer) {
            log::warn!("sys server: acknowledgement to {peer} failed: {err}");
        }
    }
    Ok(())
}

/// Decode one payload, render it with the peer address attached, and
/// forward it into the local logger at INFO level.
fn forward(
    payload: &[u8],
    peer_addr: &str,
    logger: &mut Logger,
    template: &TemplateFormatter,
) -> Result<(), HandlerError> {
    let wire = WireRecord::decode(payload)?;
    let message = template.render(&[
        ("loggername", wire.loggername.as_str()),
        ("iso_8601_time", wire.iso_8601_time.as_str()),
        ("asctime", wire.asctime.as_str()),
        ("loglevel", wire.loglevel.as_str()),
        ("message", wire.message.as_str()),
        ("client_name", wire.client_name.as_str()),
        ("client_addr", peer_addr),
    ]);
    logger.info(&message)
}

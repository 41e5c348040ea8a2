//! Tests for the network handler.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use crate::handler::{Handler, HandlerError};
use crate::level::LogLevel;
use crate::logger::Logger;
use crate::record::LogRecord;
use crate::test_utils::CollectingHandler;

use super::{ACK, Role, ShutdownHandle, SysHandler, Transport, WireRecord};

fn record() -> LogRecord {
    LogRecord::new(
        "app",
        "2024-05-01T10:00:00.000000+0000",
        "10:00:00",
        LogLevel::Info,
        "hi",
    )
}

fn collecting_logger() -> (Logger, CollectingHandler) {
    let collector = CollectingHandler::new();
    let mut logger = Logger::new("received");
    logger.add_handler(Box::new(collector.clone()));
    (logger, collector)
}

fn spawn_server(
    transport: Transport,
) -> (
    SocketAddr,
    ShutdownHandle,
    JoinHandle<Result<(), HandlerError>>,
    CollectingHandler,
) {
    let (logger, collector) = collecting_logger();
    let mut server = SysHandler::server(transport, "127.0.0.1", 0, logger).expect("bind server");
    let addr = server.local_addr().expect("server has local address");
    let handle = server.shutdown_handle();
    let join = thread::spawn(move || server.serve());
    (addr, handle, join, collector)
}

fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[fixture]
fn listener() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}

#[test]
fn wire_record_round_trips() {
    let wire = WireRecord::from_record(&record(), "edge");
    let decoded = WireRecord::decode(&wire.encode().unwrap()).unwrap();
    assert_eq!(decoded, wire);
    assert_eq!(decoded.loglevel, "INFO");
    assert_eq!(decoded.client_name, "edge");
}

#[test]
fn decode_tolerates_missing_client_name() {
    let payload = br#"{"loggername":"app","iso_8601_time":"i","asctime":"a","loglevel":"INFO","message":"hi"}"#;
    let decoded = WireRecord::decode(payload).unwrap();
    assert_eq!(decoded.client_name, "");
}

#[rstest]
fn server_rejects_emit_without_side_effects() {
    let (logger, collector) = collecting_logger();
    let mut server = SysHandler::server(Transport::Tcp, "127.0.0.1", 0, logger).unwrap();
    assert_eq!(server.role(), Role::Server);

    let err = server.emit(&record()).unwrap_err();
    assert!(matches!(err, HandlerError::ClientMethodCall));
    assert!(collector.records().is_empty());
}

#[rstest]
fn tcp_client_rejects_serve(listener: TcpListener) {
    let port = listener.local_addr().unwrap().port();
    let mut client = SysHandler::client(Transport::Tcp, "127.0.0.1", port).unwrap();
    assert_eq!(client.role(), Role::Client);

    let err = client.serve().unwrap_err();
    assert!(matches!(err, HandlerError::ServerMethodCall));
}

#[test]
fn udp_client_rejects_serve() {
    let mut client = SysHandler::client(Transport::Udp, "127.0.0.1", 9).unwrap();
    let err = client.serve().unwrap_err();
    assert!(matches!(err, HandlerError::ServerMethodCall));
}

#[test]
fn unreachable_server_yields_typed_error() {
    // Bind and immediately drop a listener so the port is known closed.
    let port = {
        let probe = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        probe.local_addr().unwrap().port()
    };

    let err = SysHandler::client(Transport::Tcp, "127.0.0.1", port).unwrap_err();
    let display = err.to_string();
    assert!(display.contains("127.0.0.1"));
    assert!(display.contains(&port.to_string()));
    match err {
        HandlerError::ServerUnreachable { host, port: reported, .. } => {
            assert_eq!(host, "127.0.0.1");
            assert_eq!(reported, port);
        }
        other => panic!("expected ServerUnreachable, got {other:?}"),
    }
}

#[rstest]
fn tcp_server_acknowledges_each_record() {
    let (addr, handle, join, _collector) = spawn_server(Transport::Tcp);

    let mut stream = TcpStream::connect(addr).unwrap();
    let payload = WireRecord::from_record(&record(), "probe").encode().unwrap();
    stream.write_all(&payload).unwrap();
    let mut buf = [0u8; 64];
    let read = stream.read(&mut buf).unwrap();
    assert_eq!(&buf[..read], ACK);

    drop(stream);
    handle.shutdown();
    join.join().unwrap().unwrap();
}

#[rstest]
fn tcp_round_trip_forwards_into_local_logger() {
    let (addr, handle, join, collector) = spawn_server(Transport::Tcp);

    let mut client = SysHandler::client(Transport::Tcp, "127.0.0.1", addr.port())
        .unwrap()
        .with_client_name("edge");
    client.emit(&record()).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        collector.records().len() == 1
    }));
    let received = collector.records();
    assert_eq!(received[0].level, LogLevel::Info);
    assert_eq!(received[0].logger_name, "received");
    let message = &received[0].message;
    assert!(message.contains("hi"));
    assert!(message.contains("INFO"));
    assert!(message.contains("app"));
    assert!(message.contains("127.0.0.1"));

    drop(client);
    handle.shutdown();
    join.join().unwrap().unwrap();
}

#[rstest]
fn tcp_client_sends_multiple_records_on_one_connection() {
    let (addr, handle, join, collector) = spawn_server(Transport::Tcp);

    let mut client = SysHandler::client(Transport::Tcp, "127.0.0.1", addr.port()).unwrap();
    for i in 0..3 {
        let one = LogRecord::new("app", "i", "a", LogLevel::Info, format!("msg-{i}"));
        client.emit(&one).unwrap();
    }

    assert!(wait_until(Duration::from_secs(2), || {
        collector.records().len() == 3
    }));
    let messages: Vec<String> = collector
        .records()
        .iter()
        .map(|r| r.message.clone())
        .collect();
    assert!(messages[0].contains("msg-0"));
    assert!(messages[2].contains("msg-2"));

    drop(client);
    handle.shutdown();
    join.join().unwrap().unwrap();
}

#[rstest]
fn udp_round_trip_forwards_into_local_logger() {
    let (addr, handle, join, collector) = spawn_server(Transport::Udp);

    let mut client = SysHandler::client(Transport::Udp, "127.0.0.1", addr.port()).unwrap();
    client.emit(&record()).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        collector.records().len() == 1
    }));
    let message = &collector.records()[0].message;
    assert!(message.contains("hi"));
    assert!(message.contains("127.0.0.1"));

    handle.shutdown();
    join.join().unwrap().unwrap();
}

#[rstest]
fn malformed_tcp_payload_drops_only_that_connection() {
    let (addr, handle, join, collector) = spawn_server(Transport::Tcp);

    {
        let mut bad = TcpStream::connect(addr).unwrap();
        bad.write_all(b"not json").unwrap();
        let mut buf = [0u8; 16];
        // The connection is dropped without an acknowledgement.
        let read = bad.read(&mut buf).unwrap_or(0);
        assert_eq!(read, 0);
    }

    let mut client = SysHandler::client(Transport::Tcp, "127.0.0.1", addr.port()).unwrap();
    client.emit(&record()).unwrap();
    assert!(wait_until(Duration::from_secs(2), || {
        collector.records().len() == 1
    }));

    drop(client);
    handle.shutdown();
    join.join().unwrap().unwrap();
}

#[rstest]
fn shutdown_stops_serve_loop() {
    let (_addr, handle, join, _collector) = spawn_server(Transport::Tcp);
    assert!(!handle.is_shutdown());
    handle.shutdown();
    assert!(handle.is_shutdown());
    join.join().unwrap().unwrap();
}

#[rstest]
fn custom_server_template_controls_forwarded_message() {
    let (logger, collector) = collecting_logger();
    let mut server = SysHandler::server(Transport::Udp, "127.0.0.1", 0, logger)
        .unwrap()
        .with_template("{client_name} said {message}");
    let addr = server.local_addr().unwrap();
    let handle = server.shutdown_handle();
    let join = thread::spawn(move || server.serve());

    let mut client = SysHandler::client(Transport::Udp, "127.0.0.1", addr.port())
        .unwrap()
        .with_client_name("edge");
    client.emit(&record()).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        collector.records().len() == 1
    }));
    assert_eq!(collector.records()[0].message, "edge said hi");

    handle.shutdown();
    join.join().unwrap().unwrap();
}

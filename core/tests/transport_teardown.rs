/*
 * transport_teardown.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Resource accounting for the client facade. A scripted connector hands out in-memory streams
 * that record every acquisition, handshake, shutdown and drop, and can be told to fail at any
 * stage. Whatever happens, every acquired stream must be released exactly once.
 */

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use newcurl_core::net::Connector;
use newcurl_core::{
    Client, ClientConfig, ClientError, ConnectionError, Method, ProtocolError, TlsError, UrlError,
};

#[derive(Default)]
struct Ledger {
    connects: AtomicUsize,
    handshakes: AtomicUsize,
    shutdowns: AtomicUsize,
    drops: AtomicUsize,
    last_target: Mutex<Option<(String, u16)>>,
    written: Mutex<Vec<u8>>,
}

impl Ledger {
    fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn connects(&self) -> usize {
        Self::count(&self.connects)
    }

    fn handshakes(&self) -> usize {
        Self::count(&self.handshakes)
    }

    fn shutdowns(&self) -> usize {
        Self::count(&self.shutdowns)
    }

    fn drops(&self) -> usize {
        Self::count(&self.drops)
    }

    fn target(&self) -> Option<(String, u16)> {
        self.last_target.lock().unwrap().clone()
    }

    fn written(&self) -> String {
        String::from_utf8_lossy(&self.written.lock().unwrap()).into_owned()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    connect: bool,
    handshake: bool,
    send: bool,
    receive: bool,
}

struct ScriptedStream {
    ledger: Arc<Ledger>,
    faults: Faults,
    reply: Vec<u8>,
    pos: usize,
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.ledger.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl AsyncRead for ScriptedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.faults.receive {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "reset by peer",
            )));
        }
        let n = buf.remaining().min(self.reply.len() - self.pos);
        let start = self.pos;
        buf.put_slice(&self.reply[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for ScriptedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.faults.send {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe")));
        }
        self.ledger.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.ledger.shutdowns.fetch_add(1, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}

struct ScriptedConnector {
    ledger: Arc<Ledger>,
    faults: Faults,
    reply: Vec<u8>,
}

impl Connector for ScriptedConnector {
    type Stream = ScriptedStream;

    async fn connect(&self, host: &str, port: u16) -> Result<ScriptedStream, ConnectionError> {
        *self.ledger.last_target.lock().unwrap() = Some((host.to_string(), port));
        if self.faults.connect {
            return Err(ConnectionError::Connect {
                addr: format!("{host}:{port}"),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        }
        self.ledger.connects.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedStream {
            ledger: self.ledger.clone(),
            faults: self.faults,
            reply: self.reply.clone(),
            pos: 0,
        })
    }

    async fn negotiate_tls(
        &self,
        stream: ScriptedStream,
        host: &str,
    ) -> Result<ScriptedStream, TlsError> {
        self.ledger.handshakes.fetch_add(1, Ordering::SeqCst);
        if self.faults.handshake {
            return Err(TlsError::Handshake {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::InvalidData, "unknown issuer"),
            });
        }
        Ok(stream)
    }
}

const REPLY: &[u8] = b"HTTP/1.1 200 OK\r\nServer: scripted\r\n\r\nbody";

fn client_with(faults: Faults, config: ClientConfig) -> (Client<ScriptedConnector>, Arc<Ledger>) {
    let ledger = Arc::new(Ledger::default());
    let connector = ScriptedConnector {
        ledger: ledger.clone(),
        faults,
        reply: REPLY.to_vec(),
    };
    (Client::with_connector(connector, config), ledger)
}

fn client(faults: Faults) -> (Client<ScriptedConnector>, Arc<Ledger>) {
    client_with(faults, ClientConfig::default())
}

#[tokio::test]
async fn success_closes_once() {
    let (client, ledger) = client(Faults::default());
    let response = client.get("http://10.0.0.1/index").await.unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body.as_deref(), Some("body"));
    assert_eq!(ledger.connects(), 1);
    assert_eq!(ledger.shutdowns(), 1);
    assert_eq!(ledger.drops(), 1);
    assert_eq!(ledger.handshakes(), 0);
    assert_eq!(
        ledger.written(),
        "GET /index HTTP/1.1\r\nHost: 10.0.0.1\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
}

#[tokio::test]
async fn connect_failure_acquires_nothing() {
    let (client, ledger) = client(Faults {
        connect: true,
        ..Faults::default()
    });
    let err = client.get("http://10.0.0.1/").await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(ConnectionError::Connect { .. })));
    assert_eq!(ledger.connects(), 0);
    assert_eq!(ledger.drops(), 0);
    assert_eq!(ledger.shutdowns(), 0);
}

#[tokio::test]
async fn handshake_failure_releases_socket() {
    let (client, ledger) = client(Faults {
        handshake: true,
        ..Faults::default()
    });
    let err = client.get("https://10.0.0.1/").await.unwrap_err();
    assert!(matches!(err, ClientError::Tls(TlsError::Handshake { .. })));
    assert_eq!(ledger.connects(), 1);
    assert_eq!(ledger.handshakes(), 1);
    assert_eq!(ledger.drops(), 1);
    assert!(ledger.written().is_empty());
}

#[tokio::test]
async fn send_failure_still_closes() {
    let (client, ledger) = client(Faults {
        send: true,
        ..Faults::default()
    });
    let err = client.post("http://10.0.0.1/", "data").await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(ConnectionError::Send(_))));
    assert_eq!(ledger.connects(), 1);
    assert_eq!(ledger.shutdowns(), 1);
    assert_eq!(ledger.drops(), 1);
}

#[tokio::test]
async fn receive_failure_still_closes() {
    let (client, ledger) = client(Faults {
        receive: true,
        ..Faults::default()
    });
    let err = client.get("http://10.0.0.1/").await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(ConnectionError::Receive(_))));
    assert_eq!(ledger.connects(), 1);
    assert_eq!(ledger.shutdowns(), 1);
    assert_eq!(ledger.drops(), 1);
}

#[tokio::test]
async fn raw_command_failure_still_closes() {
    let (client, ledger) = client(Faults {
        receive: true,
        ..Faults::default()
    });
    let err = client.ftp("ftp://10.0.0.1", "NOOP").await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(ConnectionError::Receive(_))));
    assert_eq!(ledger.target(), Some(("10.0.0.1".to_string(), 21)));
    assert_eq!(ledger.drops(), 1);
    assert_eq!(ledger.shutdowns(), 1);
    assert_eq!(ledger.written(), "NOOP\r\n");
}

#[tokio::test]
async fn invalid_request_never_connects() {
    let (client, ledger) = client(Faults::default());
    let err = client
        .request("http://10.0.0.1/a\rb", Method::Get, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Protocol(ProtocolError::InvalidRequestField { field: "path", .. })
    ));
    let err = client.get("http:///").await.unwrap_err();
    assert!(matches!(err, ClientError::Url(UrlError::MissingHost)));
    assert_eq!(ledger.connects(), 0);
}

#[tokio::test]
async fn tls_only_for_https() {
    let (client, ledger) = client(Faults::default());

    client.get("http://10.0.0.1/").await.unwrap();
    assert_eq!(ledger.handshakes(), 0);
    assert_eq!(ledger.target(), Some(("10.0.0.1".to_string(), 80)));

    client.get("10.0.0.1/").await.unwrap();
    assert_eq!(ledger.handshakes(), 0);

    client.get("https://10.0.0.1/").await.unwrap();
    assert_eq!(ledger.handshakes(), 1);
    assert_eq!(ledger.target(), Some(("10.0.0.1".to_string(), 443)));

    client.get("https://10.0.0.1:8443/").await.unwrap();
    assert_eq!(ledger.handshakes(), 2);
    assert_eq!(ledger.target(), Some(("10.0.0.1".to_string(), 8443)));

    client.telnet("telnet://10.0.0.1", "x").await.unwrap();
    assert_eq!(ledger.handshakes(), 2);
    assert_eq!(ledger.target(), Some(("10.0.0.1".to_string(), 23)));

    assert_eq!(ledger.connects(), 5);
    assert_eq!(ledger.drops(), 5);
    assert_eq!(ledger.shutdowns(), 5);
}

#[tokio::test]
async fn single_read_truncates_at_buffer_size() {
    let (client, ledger) = client_with(Faults::default(), ClientConfig::default().with_receive_buffer(12));
    let response = client.get("http://10.0.0.1/").await.unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.headers, None);
    assert_eq!(response.body, None);
    assert_eq!(ledger.drops(), 1);
}

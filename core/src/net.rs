/*
 * net.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of newcurl, a minimal HTTP(S), FTP and Telnet client.
 *
 * newcurl is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * newcurl is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with newcurl.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Transport: TCP connect to a literal IPv4 address, optional rustls handshake, and a
//! `Connection` that sends and receives the same way whether or not TLS is active.
//!
//! The `Connector` trait is the seam the client goes through to acquire streams; the default
//! `TcpConnector` produces `NetStream`s, which are either plain TCP or TLS over TCP.

use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::pin::Pin;
use std::sync::{Arc, Once, OnceLock};
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream as TokioTlsStream;
use tokio_rustls::rustls::client::ClientConfig;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::RootCertStore;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use crate::config::{ReadStrategy, RootSource};
use crate::error::{ConnectionError, Result, TlsError};

/// Install the process-wide rustls crypto provider. Safe to call before every handshake.
pub fn ensure_tls_initialized() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // Fails only if a provider is already installed, which is just as good.
        let _ = tokio_rustls::rustls::crypto::ring::default_provider().install_default();
        debug!("TLS crypto provider ready");
    });
}

/// Build a root certificate store: platform native certs first, then webpki-roots as fallback.
fn build_root_store(source: RootSource) -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    if source == RootSource::NativeThenWebpki {
        match rustls_native_certs::load_native_certs() {
            Ok(certs) => {
                for cert in certs {
                    let _ = root_store.add(cert);
                }
            }
            Err(e) => debug!(error = %e, "native root certificates unavailable"),
        }
    }
    if root_store.is_empty() {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }
    root_store
}

/// TLS client config for HTTP/1.1 (ALPN `http/1.1`, no client auth), built once per root source.
pub fn tls_client_config(source: RootSource) -> Arc<ClientConfig> {
    static NATIVE: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    static WEBPKI: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    ensure_tls_initialized();
    let cell = match source {
        RootSource::NativeThenWebpki => &NATIVE,
        RootSource::Webpki => &WEBPKI,
    };
    cell.get_or_init(|| {
        let mut config = ClientConfig::builder()
            .with_root_certificates(build_root_store(source))
            .with_no_client_auth();
        config.alpn_protocols = vec![b"http/1.1".to_vec()];
        Arc::new(config)
    })
    .clone()
}

/// Acquires streams for the client. One `connect` per request; `negotiate_tls` only for https.
pub trait Connector {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = std::result::Result<Self::Stream, ConnectionError>> + Send;

    /// Wrap an established stream in TLS. On failure the stream is dropped, closing the socket.
    fn negotiate_tls(
        &self,
        stream: Self::Stream,
        host: &str,
    ) -> impl Future<Output = std::result::Result<Self::Stream, TlsError>> + Send;
}

/// Unified stream: plain TCP or TLS. Implements AsyncRead + AsyncWrite.
pub enum NetStream {
    Plain(TcpStream),
    Tls(Box<TokioTlsStream<TcpStream>>),
}

impl NetStream {
    pub fn is_secure(&self) -> bool {
        matches!(self, NetStream::Tls(_))
    }
}

impl AsyncRead for NetStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            NetStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            NetStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for NetStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            NetStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            NetStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            NetStream::Plain(s) => Pin::new(s).poll_flush(cx),
            NetStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            NetStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            NetStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Real network connector: no name resolution, host must be dotted IPv4.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnector {
    roots: RootSource,
}

impl TcpConnector {
    pub fn new(roots: RootSource) -> Self {
        Self { roots }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(RootSource::NativeThenWebpki)
    }
}

impl Connector for TcpConnector {
    type Stream = NetStream;

    async fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> std::result::Result<NetStream, ConnectionError> {
        let ip: Ipv4Addr = host
            .parse()
            .map_err(|_| ConnectionError::InvalidAddress(host.to_string()))?;
        let addr = SocketAddrV4::new(ip, port);
        debug!(%addr, "connecting");
        let tcp = TcpStream::connect(addr)
            .await
            .map_err(|source| ConnectionError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        Ok(NetStream::Plain(tcp))
    }

    async fn negotiate_tls(
        &self,
        stream: NetStream,
        host: &str,
    ) -> std::result::Result<NetStream, TlsError> {
        let tcp = match stream {
            NetStream::Plain(tcp) => tcp,
            secure @ NetStream::Tls(_) => return Ok(secure),
        };
        let server_name: ServerName<'static> = host
            .to_string()
            .try_into()
            .map_err(|_| TlsError::InvalidServerName(host.to_string()))?;
        let connector = TlsConnector::from(tls_client_config(self.roots));
        let tls = connector
            .connect(server_name, tcp)
            .await
            .map_err(|source| TlsError::Handshake {
                host: host.to_string(),
                source,
            })?;
        debug!(host, "TLS handshake complete");
        Ok(NetStream::Tls(Box::new(tls)))
    }
}

/// One request's connection. All traffic goes through `send`/`receive`; `close` consumes it.
pub struct Connection<S> {
    stream: S,
    peer: String,
    secure: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, peer: impl Into<String>, secure: bool) -> Self {
        Self {
            stream,
            peer: peer.into(),
            secure,
        }
    }

    /// Write all of `data` and flush.
    pub async fn send(&mut self, data: &[u8]) -> std::result::Result<(), ConnectionError> {
        self.stream
            .write_all(data)
            .await
            .map_err(ConnectionError::Send)?;
        self.stream.flush().await.map_err(ConnectionError::Send)?;
        debug!(peer = %self.peer, bytes = data.len(), "sent");
        Ok(())
    }

    /// One read into `buf`. Returns 0 when the peer has closed.
    pub async fn receive(&mut self, buf: &mut [u8]) -> std::result::Result<usize, ConnectionError> {
        let n = self
            .stream
            .read(buf)
            .await
            .map_err(ConnectionError::Receive)?;
        debug!(peer = %self.peer, bytes = n, "received");
        Ok(n)
    }

    /// Collect the response according to `strategy`. `capacity` sizes each receive.
    pub async fn receive_response(
        &mut self,
        strategy: ReadStrategy,
        capacity: usize,
    ) -> Result<Bytes> {
        let capacity = capacity.max(1);
        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(capacity)?;
        buf.resize(capacity, 0);

        match strategy {
            ReadStrategy::Single => {
                let n = self.receive(&mut buf).await?;
                if n == capacity {
                    warn!(peer = %self.peer, capacity, "response filled the receive buffer and may be truncated");
                }
                buf.truncate(n);
                Ok(Bytes::from(buf))
            }
            ReadStrategy::UntilClose { limit } => {
                let mut read_buf = BytesMut::with_capacity(capacity.min(limit.max(1)));
                loop {
                    let n = self.receive(&mut buf).await?;
                    if n == 0 {
                        break;
                    }
                    let room = limit.saturating_sub(read_buf.len());
                    read_buf.extend_from_slice(&buf[..n.min(room)]);
                    if n > room {
                        warn!(peer = %self.peer, limit, "response exceeds read limit, truncated");
                        break;
                    }
                }
                Ok(read_buf.freeze())
            }
        }
    }

    /// Shut the stream down (TLS close_notify, then TCP FIN) and release it.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!(peer = %self.peer, error = %e, "shutdown failed");
        }
        debug!(peer = %self.peer, secure = self.secure, "connection closed");
    }
}

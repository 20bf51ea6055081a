/*
 * client.rs
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

//! Client facade: one call per HTTP verb plus FTP/Telnet passthrough.
//!
//! Every call opens its own connection through the `Connector`, does exactly one exchange and
//! closes the connection before returning, whether the exchange succeeded or not.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ProtocolError, Result};
use crate::net::{Connection, Connector, TcpConnector};
use crate::protocol::http::{
    HttpResponse, Method, RequestBuilder, HTTPS_PORT, HTTP_PORT, SECURE_SCHEME,
};
use crate::protocol::RawProtocol;
use crate::uri::{self, Url};

pub struct Client<C = TcpConnector> {
    connector: C,
    config: ClientConfig,
}

impl Client<TcpConnector> {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            connector: TcpConnector::new(config.roots),
            config,
        }
    }
}

impl Default for Client<TcpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> Client<C> {
    pub fn with_connector(connector: C, config: ClientConfig) -> Self {
        Self { connector, config }
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.request(url, Method::Get, None).await
    }

    pub async fn post(&self, url: &str, body: &str) -> Result<HttpResponse> {
        self.request(url, Method::Post, Some(body.as_bytes())).await
    }

    pub async fn put(&self, url: &str, body: &str) -> Result<HttpResponse> {
        self.request(url, Method::Put, Some(body.as_bytes())).await
    }

    pub async fn delete(&self, url: &str) -> Result<HttpResponse> {
        self.request(url, Method::Delete, None).await
    }

    pub async fn update(&self, url: &str, body: &str) -> Result<HttpResponse> {
        self.request(url, Method::Update, Some(body.as_bytes())).await
    }

    pub async fn trace(&self, url: &str) -> Result<HttpResponse> {
        self.request(url, Method::Trace, None).await
    }

    pub async fn head(&self, url: &str) -> Result<HttpResponse> {
        self.request(url, Method::Head, None).await
    }

    pub async fn options(&self, url: &str) -> Result<HttpResponse> {
        self.request(url, Method::Options, None).await
    }

    /// Normalize `url`, connect (TLS for https), send one request and parse the single answer.
    pub async fn request(
        &self,
        url: &str,
        method: Method,
        body: Option<&[u8]>,
    ) -> Result<HttpResponse> {
        let target = Url::parse(&uri::normalize(url));
        let (scheme, host) = target.endpoint().map_err(|e| {
            warn!(url, error = %e, "invalid URL");
            e
        })?;
        warn_on_unusable_port(url);
        let use_tls = scheme.eq_ignore_ascii_case(SECURE_SCHEME);
        let port = target.effective_port(if use_tls { HTTPS_PORT } else { HTTP_PORT });

        let mut request = RequestBuilder::new(method, target.request_path(), host);
        if let Some(body) = body {
            request.body_slice(body);
        }
        let wire = request.build()?;

        let mut conn = self.open(host, port, use_tls).await?;
        let outcome = self.exchange(&mut conn, &wire).await;
        conn.close().await;

        let raw = outcome?;
        if raw.is_empty() {
            return Err(ProtocolError::EmptyResponse.into());
        }
        let response = HttpResponse::parse(&raw);
        debug!(%method, status = response.status_code, bytes = raw.len(), "response parsed");
        Ok(response)
    }

    /// Send an FTP command (CRLF appended) and return the server's reply as the body.
    pub async fn ftp(&self, url: &str, command: &str) -> Result<HttpResponse> {
        self.raw_command(url, RawProtocol::Ftp, command).await
    }

    /// Send `command` verbatim over Telnet and return whatever comes back as the body.
    pub async fn telnet(&self, url: &str, command: &str) -> Result<HttpResponse> {
        self.raw_command(url, RawProtocol::Telnet, command).await
    }

    /// SSH needs a real protocol layer; nothing is sent.
    pub async fn ssh(&self, _url: &str, _command: &str) -> Result<HttpResponse> {
        Err(ClientError::Unsupported("ssh"))
    }

    async fn raw_command(
        &self,
        url: &str,
        protocol: RawProtocol,
        command: &str,
    ) -> Result<HttpResponse> {
        let target = Url::parse(url);
        let (_, host) = target.endpoint().map_err(|e| {
            warn!(url, protocol = protocol.name(), error = %e, "invalid URL");
            e
        })?;
        warn_on_unusable_port(url);
        let port = target.effective_port(protocol.default_port());

        let mut conn = self.open(host, port, false).await?;
        let outcome = self.exchange(&mut conn, &protocol.frame(command)).await;
        conn.close().await;

        Ok(HttpResponse::raw_body(&outcome?))
    }

    async fn open(&self, host: &str, port: u16, use_tls: bool) -> Result<Connection<C::Stream>> {
        let stream = self.connector.connect(host, port).await?;
        let stream = if use_tls {
            self.connector.negotiate_tls(stream, host).await?
        } else {
            stream
        };
        Ok(Connection::new(stream, format!("{host}:{port}"), use_tls))
    }

    async fn exchange<S>(&self, conn: &mut Connection<S>, wire: &[u8]) -> Result<Bytes>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        conn.send(wire).await?;
        conn.receive_response(self.config.read_strategy, self.config.receive_buffer)
            .await
    }
}

/// Normalizing drops a port of 0, so the check runs on the URL as given.
fn warn_on_unusable_port(url: &str) -> bool {
    let unusable = Url::parse(url).has_malformed_port();
    if unusable {
        warn!(url, "unusable port in URL, using the default port");
    }
    unusable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UrlError;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[tokio::test]
    async fn missing_host_is_rejected_before_connecting() {
        let client = Client::new();
        let err = client.get("http:///nothing").await.unwrap_err();
        assert!(matches!(err, ClientError::Url(UrlError::MissingHost)));
    }

    #[tokio::test]
    async fn raw_commands_need_a_scheme() {
        let client = Client::new();
        let err = client.ftp("10.0.0.1/pub", "LIST").await.unwrap_err();
        assert!(matches!(err, ClientError::Url(UrlError::MissingScheme)));
    }

    #[tokio::test]
    async fn ssh_is_unsupported() {
        let err = Client::new().ssh("ssh://10.0.0.1", "ls").await.unwrap_err();
        assert!(matches!(err, ClientError::Unsupported("ssh")));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` on a current-thread runtime with a subscriber writing into the returned log.
    fn capture<F, Fut>(f: F) -> String
    where
        F: FnOnce(Client) -> Fut,
        Fut: std::future::Future,
    {
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(f(Client::new()));
        });
        log.text()
    }

    #[test]
    fn unusable_port_is_checked_before_normalizing() {
        assert!(warn_on_unusable_port("http://10.0.0.1:abc/x"));
        assert!(warn_on_unusable_port("ftp://10.0.0.1:99999/"));
        assert!(!warn_on_unusable_port("http://10.0.0.1:8080/x"));
        assert!(!warn_on_unusable_port("http://10.0.0.1/x"));
    }

    #[test]
    fn unusable_port_is_logged_for_http_requests() {
        // Hostnames are refused before any socket is opened.
        let log = capture(|client| async move {
            let _ = client.get("http://example.com:abc/x").await;
        });
        assert!(log.contains("unusable port"), "log was: {log}");
    }

    #[test]
    fn unusable_port_is_logged_for_raw_commands() {
        let log = capture(|client| async move {
            let _ = client.ftp("ftp://example.com:xyz/", "NOOP").await;
        });
        assert!(log.contains("unusable port"), "log was: {log}");
    }

    #[test]
    fn usable_port_is_not_logged() {
        let log = capture(|client| async move {
            let _ = client.get("http://example.com:8080/x").await;
        });
        assert!(!log.contains("unusable port"), "log was: {log}");
    }

    #[tokio::test]
    async fn hostnames_fail_as_connection_errors() {
        let err = Client::new().get("http://example.com/").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Connection(crate::error::ConnectionError::InvalidAddress(_))
        ));
    }
}

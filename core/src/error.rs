/*
 * error.rs
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

//! Client errors. Every stage of the pipeline reports through `ClientError`; the facade never
//! retries, so the first error is the one the caller sees.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// The URL cannot be resolved to something we can connect to.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL has no scheme")]
    MissingScheme,
    #[error("URL has no host")]
    MissingHost,
}

/// Socket-level failure: address parsing, connect, send or receive.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Host is not a literal IPv4 address (no name resolution is performed).
    #[error("invalid host address {0:?}")]
    InvalidAddress(String),
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("send failed: {0}")]
    Send(#[source] io::Error),
    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),
}

/// TLS context or handshake failure.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("invalid TLS server name {0:?}")]
    InvalidServerName(String),
    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: io::Error,
    },
}

/// Request could not be framed, or the peer's answer could not be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Transport read succeeded but the peer sent nothing before closing.
    #[error("empty response")]
    EmptyResponse,
    /// A request line or header value carries a control character.
    #[error("invalid character in request {field}: {value:?}")]
    InvalidRequestField { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Url(#[from] UrlError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Tls(#[from] TlsError),
    #[error("receive buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, ClientError>;

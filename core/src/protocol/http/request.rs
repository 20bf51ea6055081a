/*
 * request.rs
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

//! HTTP/1.1 request: method, path, host, optional body.
//!
//! Every request carries exactly three headers: Host, `Connection: close` and Content-Length.
//! Nothing is kept alive, so each request gets its own connection.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    /// Non-standard verb, sent as the literal token `UPDATE`.
    Update,
    Trace,
    Head,
    Options,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Update,
        Method::Trace,
        Method::Head,
        Method::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Update => "UPDATE",
            Method::Trace => "TRACE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Methods that carry a request body when one is given.
    pub fn takes_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Update)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown method {s:?}"))
    }
}

/// Request builder: method, path, host, body.
///
/// `build()` serializes to wire bytes and rejects values that would break the request framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    pub method: Method,
    pub path: String,
    pub host: String,
    pub body: Option<Vec<u8>>,
}

impl RequestBuilder {
    pub fn new(method: Method, path: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            host: host.into(),
            body: None,
        }
    }

    /// Set body from a slice (copied).
    pub fn body_slice(&mut self, data: &[u8]) -> &mut Self {
        self.body = Some(data.to_vec());
        self
    }

    pub fn build(&self) -> Result<Vec<u8>, ProtocolError> {
        let path = if self.path.is_empty() { "/" } else { self.path.as_str() };
        check_field("path", path, false)?;
        check_field("host", &self.host, true)?;

        let body = self.body.as_deref().unwrap_or_default();
        let head = format!(
            "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nContent-Length: {}\r\n\r\n",
            self.method.as_str(),
            path,
            self.host,
            body.len()
        );
        let mut req = Vec::with_capacity(head.len() + body.len());
        req.extend_from_slice(head.as_bytes());
        req.extend_from_slice(body);
        Ok(req)
    }
}

/// Reject control characters anywhere, and spaces where they would split the request line.
fn check_field(field: &'static str, value: &str, allow_space: bool) -> Result<(), ProtocolError> {
    let bad = value
        .chars()
        .any(|c| c.is_control() || (!allow_space && c == ' '));
    if bad {
        return Err(ProtocolError::InvalidRequestField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/*
 * uri.rs
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

//! URL parsing for the client: scheme, userinfo, host, port, path, query and fragment are split
//! with one left-to-right cursor. Parsing is best-effort and never fails; callers check the
//! result with `Url::endpoint` before connecting.

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::error::UrlError;

/// Scheme assumed when a URL has none.
pub const DEFAULT_SCHEME: &str = "http";

/// Parsed URL. Every field is an owned copy of its slice of the input; query and fragment are
/// kept raw (not percent-decoded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    pub scheme: Option<String>,
    pub user: Option<String>,
    /// Only ever set together with `user`.
    pub password: Option<String>,
    /// May be empty for a malformed URL.
    pub host: String,
    /// `Some(0)` when the text after ':' does not start with digits.
    pub port: Option<u16>,
    pub path: Option<String>,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl Url {
    pub fn parse(input: &str) -> Url {
        let mut url = Url::default();
        let mut rest = input;

        if let Some(end) = rest.find("://") {
            url.scheme = Some(rest[..end].to_string());
            rest = &rest[end + 3..];
        }

        // Userinfo only counts when '@' sits in the authority, before any '/'.
        if let Some(at) = rest.find('@') {
            if rest.find('/').map_or(true, |slash| at < slash) {
                let userinfo = &rest[..at];
                match userinfo.find(':') {
                    Some(colon) => {
                        url.user = Some(userinfo[..colon].to_string());
                        url.password = Some(userinfo[colon + 1..].to_string());
                    }
                    None => url.user = Some(userinfo.to_string()),
                }
                rest = &rest[at + 1..];
            }
        }

        let path_start = rest.find('/');
        let port_start = rest.find(':');
        match (path_start, port_start) {
            (Some(slash), colon) if colon.map_or(true, |c| slash < c) => {
                url.host = rest[..slash].to_string();
            }
            (_, Some(colon)) => {
                url.host = rest[..colon].to_string();
                url.port = Some(leading_port(&rest[colon + 1..]));
            }
            _ => url.host = rest.to_string(),
        }

        if let Some(slash) = path_start {
            let tail = &rest[slash..];
            let query = tail.find('?');
            let hash = tail.find('#');
            match (query, hash) {
                (Some(q), h) if h.map_or(true, |h| q < h) => {
                    url.path = Some(tail[..q].to_string());
                    match h {
                        Some(h) => {
                            url.query = Some(tail[q + 1..h].to_string());
                            url.fragment = Some(tail[h + 1..].to_string());
                        }
                        None => url.query = Some(tail[q + 1..].to_string()),
                    }
                }
                (_, Some(h)) => {
                    url.path = Some(tail[..h].to_string());
                    url.fragment = Some(tail[h + 1..].to_string());
                }
                _ => url.path = Some(tail.to_string()),
            }
        }

        url
    }

    /// Scheme and host of a connect-capable URL.
    pub fn endpoint(&self) -> Result<(&str, &str), UrlError> {
        let scheme = self.scheme.as_deref().ok_or(UrlError::MissingScheme)?;
        if self.host.is_empty() {
            return Err(UrlError::MissingHost);
        }
        Ok((scheme, &self.host))
    }

    /// Explicit port, or `default` when the URL has none (or the quirky 0).
    pub fn effective_port(&self, default: u16) -> u16 {
        self.port.filter(|p| *p > 0).unwrap_or(default)
    }

    /// True when a ':' was present but no usable port followed it.
    pub fn has_malformed_port(&self) -> bool {
        self.port == Some(0)
    }

    /// Path to put on the request line.
    pub fn request_path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }

    pub fn decoded_path(&self) -> String {
        decode(self.request_path())
    }

    pub fn decoded_query(&self) -> Option<String> {
        self.query.as_deref().map(decode)
    }

    /// Re-serialize without userinfo, filling in defaults: http scheme, "/" path, no port
    /// when absent or 0.
    pub fn normalized(&self) -> String {
        let mut out = String::with_capacity(self.host.len() + 16);
        out.push_str(self.scheme.as_deref().unwrap_or(DEFAULT_SCHEME));
        out.push_str("://");
        self.write_location(&mut out);
        out
    }

    fn write_location(&self, out: &mut String) {
        out.push_str(&self.host);
        if let Some(port) = self.port.filter(|p| *p > 0) {
            out.push(':');
            out.push_str(&port.to_string());
        }
        out.push_str(self.request_path());
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
    }
}

impl fmt::Display for Url {
    /// Full serialization including userinfo, with the same defaults as `normalized`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        out.push_str(self.scheme.as_deref().unwrap_or(DEFAULT_SCHEME));
        out.push_str("://");
        if let Some(user) = &self.user {
            out.push_str(user);
            if let Some(password) = &self.password {
                out.push(':');
                out.push_str(password);
            }
            out.push('@');
        }
        self.write_location(&mut out);
        f.write_str(&out)
    }
}

/// Parse then re-serialize `input` (see `Url::normalized`).
pub fn normalize(input: &str) -> String {
    Url::parse(input).normalized()
}

/// Decode %XY escapes. A '%' not followed by two hex digits is kept as is; decoded bytes that
/// are not valid UTF-8 become U+FFFD.
pub fn decode(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}

/// Leading decimal digits as a port; 0 when there are none or the value does not fit.
fn leading_port(s: &str) -> u16 {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    s[..end].parse().unwrap_or(0)
}

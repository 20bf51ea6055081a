/*
 * response.rs
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

//! HTTP response: single-shot split of the received bytes into status code, raw header block
//! and body. There is no chunked decoding and no Content-Length reassembly; whatever the
//! transport returned is what gets parsed.

const STATUS_MARKER: &[u8] = b"HTTP/";
const HEADERS_END: &[u8] = b"\r\n\r\n";

/// Parsed response. `headers` is the raw block up to (not including) the blank line, status
/// line included; `body` is everything after it. Both are absent when no blank line was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// 0 when no status line could be read, or the code does not fit an `i32`.
    pub status_code: i32,
    pub headers: Option<String>,
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn parse(raw: &[u8]) -> Self {
        let status_code = find(raw, STATUS_MARKER)
            .and_then(|at| status_after_marker(&raw[at + STATUS_MARKER.len()..]))
            .unwrap_or(0);
        let mut response = Self {
            status_code,
            ..Self::default()
        };
        if let Some(end) = find(raw, HEADERS_END) {
            response.headers = Some(String::from_utf8_lossy(&raw[..end]).into_owned());
            response.body =
                Some(String::from_utf8_lossy(&raw[end + HEADERS_END.len()..]).into_owned());
        }
        response
    }

    /// Wrap unframed bytes (FTP, Telnet): no status, no headers.
    pub fn raw_body(raw: &[u8]) -> Self {
        Self {
            status_code: 0,
            headers: None,
            body: Some(String::from_utf8_lossy(raw).into_owned()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// First value of header `name` (case-insensitive), trimmed. The status line is skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_deref()?
            .split("\r\n")
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim())
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// `<major>.<minor> <code>` after "HTTP/". Whitespace before the code is optional.
fn status_after_marker(s: &[u8]) -> Option<i32> {
    let s = skip_digits(s)?;
    let s = s.strip_prefix(b".")?;
    let s = skip_digits(s)?;
    let start = s.iter().take_while(|b| b.is_ascii_whitespace()).count();
    let s = &s[start..];
    let len = s.iter().take_while(|b| b.is_ascii_digit()).count();
    std::str::from_utf8(&s[..len]).ok()?.parse().ok()
}

/// Skip one or more digits; None if there are none.
fn skip_digits(s: &[u8]) -> Option<&[u8]> {
    let n = s.iter().take_while(|b| b.is_ascii_digit()).count();
    if n == 0 {
        None
    } else {
        Some(&s[n..])
    }
}

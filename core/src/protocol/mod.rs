/*
 * mod.rs
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

//! Wire protocols spoken by the client. HTTP gets request framing and response parsing; FTP and
//! Telnet commands are passed through as raw bytes.

pub mod http;

/// Unframed command protocols: the command goes out as-is (plus a line terminator for FTP) and
/// the reply comes back as an opaque body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawProtocol {
    Ftp,
    Telnet,
}

impl RawProtocol {
    pub fn name(&self) -> &'static str {
        match self {
            RawProtocol::Ftp => "ftp",
            RawProtocol::Telnet => "telnet",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            RawProtocol::Ftp => 21,
            RawProtocol::Telnet => 23,
        }
    }

    /// Bytes to put on the wire for `command`.
    pub fn frame(&self, command: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(command.len() + 2);
        out.extend_from_slice(command.as_bytes());
        if *self == RawProtocol::Ftp {
            out.extend_from_slice(b"\r\n");
        }
        out
    }
}

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

//! HTTP/1.1 framing: request serialization and single-shot response parsing. Connecting and
//! moving bytes is the transport's job (`crate::net`); putting the two together is the client's
//! (`crate::client`).

mod request;
mod response;

pub use request::{Method, RequestBuilder};
pub use response::HttpResponse;

/// Default port for plain HTTP.
pub const HTTP_PORT: u16 = 80;
/// Default port for HTTPS.
pub const HTTPS_PORT: u16 = 443;
/// Scheme that selects TLS.
pub const SECURE_SCHEME: &str = "https";

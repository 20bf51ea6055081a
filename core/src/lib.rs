/*
 * lib.rs
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

//! newcurl core: URL parsing, plain/TLS transport, HTTP/1.1 request building and response
//! parsing, and a client facade tying them together. FTP and Telnet commands go over the same
//! transport without HTTP framing.

pub mod client;
pub mod config;
pub mod error;
pub mod net;
pub mod protocol;
pub mod uri;

pub use client::Client;
pub use config::{ClientConfig, ReadStrategy, RootSource};
pub use error::{ClientError, ConnectionError, ProtocolError, TlsError, UrlError};
pub use protocol::http::{HttpResponse, Method, RequestBuilder};
pub use uri::Url;

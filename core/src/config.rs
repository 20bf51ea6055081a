/*
 * config.rs
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

//! Client configuration: receive buffer size, how much of the response to read, and where TLS
//! trust anchors come from. Defaults reproduce the classic single-read behaviour; the
//! environment (`ClientConfig::from_env`) and the CLI can override them.

use std::env;

/// Capacity of the receive buffer for one `receive` call.
pub const DEFAULT_RECEIVE_BUFFER: usize = 8192;

/// Upper bound on bytes accumulated by `ReadStrategy::UntilClose` unless configured otherwise.
pub const DEFAULT_READ_LIMIT: usize = 8 * 1024 * 1024;

pub const ENV_RECEIVE_BUFFER: &str = "NEWCURL_RECEIVE_BUFFER";
pub const ENV_READ_TO_CLOSE: &str = "NEWCURL_READ_TO_CLOSE";
pub const ENV_WEBPKI_ONLY: &str = "NEWCURL_WEBPKI_ONLY";

/// How the response is collected from the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// One receive into a buffer of `receive_buffer` bytes. Longer responses are truncated.
    Single,
    /// Receive until the peer closes, keeping at most `limit` bytes.
    UntilClose { limit: usize },
}

/// Source of TLS root certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    /// Platform native certs; Mozilla roots (webpki-roots) when none load.
    NativeThenWebpki,
    /// Mozilla roots only.
    Webpki,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub receive_buffer: usize,
    pub read_strategy: ReadStrategy,
    pub roots: RootSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            receive_buffer: DEFAULT_RECEIVE_BUFFER,
            read_strategy: ReadStrategy::Single,
            roots: RootSource::NativeThenWebpki,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `NEWCURL_*` environment variables. Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(size) = lookup(ENV_RECEIVE_BUFFER).and_then(|v| v.trim().parse::<usize>().ok()) {
            if size > 0 {
                config.receive_buffer = size;
            }
        }
        if lookup(ENV_READ_TO_CLOSE).is_some_and(|v| is_truthy(&v)) {
            config.read_strategy = ReadStrategy::UntilClose {
                limit: DEFAULT_READ_LIMIT,
            };
        }
        if lookup(ENV_WEBPKI_ONLY).is_some_and(|v| is_truthy(&v)) {
            config.roots = RootSource::Webpki;
        }
        config
    }

    pub fn with_receive_buffer(mut self, size: usize) -> Self {
        self.receive_buffer = size.max(1);
        self
    }

    pub fn with_read_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.read_strategy = strategy;
        self
    }

    pub fn with_roots(mut self, roots: RootSource) -> Self {
        self.roots = roots;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

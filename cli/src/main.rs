/*
 * main.rs
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

//! newcurl command-line driver: runs every HTTP verb against one URL and prints each response,
//! or sends a single FTP/Telnet command. A failed verb is reported and the next one still runs.

use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::error;
use tracing_subscriber::EnvFilter;

use newcurl_core::{Client, ClientConfig, HttpResponse, Method, ReadStrategy, RootSource};

/// Body sent with POST, PUT and UPDATE unless --data says otherwise.
const DEFAULT_BODY: &str = "key=value&param=123";

#[derive(Debug, Parser)]
#[command(name = "newcurl", version, about = "Minimal HTTP(S), FTP and Telnet client")]
struct Cli {
    /// Target URL; the host must be a literal IPv4 address.
    url: String,

    /// Run only this verb (GET, POST, PUT, DELETE, UPDATE, TRACE, HEAD, OPTIONS).
    #[arg(short = 'X', long)]
    verb: Option<Method>,

    /// Request body for POST, PUT and UPDATE.
    #[arg(short, long, default_value = DEFAULT_BODY)]
    data: String,

    /// Send a raw FTP command instead of HTTP requests.
    #[arg(long, value_name = "COMMAND", conflicts_with = "telnet")]
    ftp: Option<String>,

    /// Send a raw Telnet command instead of HTTP requests.
    #[arg(long, value_name = "COMMAND")]
    telnet: Option<String>,

    /// Keep reading until the server closes instead of a single receive.
    #[arg(long)]
    read_to_close: bool,

    /// Receive buffer size in bytes.
    #[arg(long, value_name = "BYTES")]
    receive_buffer: Option<usize>,

    /// Trust only the bundled Mozilla roots, not the platform store.
    #[arg(long)]
    webpki_only: bool,

    /// More logging on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(size) = self.receive_buffer {
            config = config.with_receive_buffer(size);
        }
        if self.read_to_close {
            config = config.with_read_strategy(ReadStrategy::UntilClose {
                limit: newcurl_core::config::DEFAULT_READ_LIMIT,
            });
        }
        if self.webpki_only {
            config = config.with_roots(RootSource::Webpki);
        }
        config
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_response(label: &str, response: &HttpResponse) {
    println!(
        "{} Response:\nStatus: {}\nHeaders:\n{}\nBody:\n{}",
        label,
        response.status_code,
        response.headers.as_deref().unwrap_or("(null)"),
        response.body.as_deref().unwrap_or("(null)")
    );
}

async fn run(cli: &Cli) {
    let client = Client::with_config(cli.client_config());

    if let Some(command) = &cli.ftp {
        match client.ftp(&cli.url, command).await {
            Ok(response) => print_response("FTP", &response),
            Err(e) => error!("FTP request failed: {}", e),
        }
        return;
    }
    if let Some(command) = &cli.telnet {
        match client.telnet(&cli.url, command).await {
            Ok(response) => print_response("TELNET", &response),
            Err(e) => error!("Telnet request failed: {}", e),
        }
        return;
    }

    let verbs: Vec<Method> = match cli.verb {
        Some(verb) => vec![verb],
        None => Method::ALL.to_vec(),
    };
    for method in verbs {
        let body = method.takes_body().then(|| cli.data.as_bytes());
        match client.request(&cli.url, method, body).await {
            Ok(response) => print_response(method.as_str(), &response),
            Err(e) => error!("{} request failed: {}", method, e),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);
    run(&cli).await;
    ExitCode::SUCCESS
}

//! Reverse proxy to the backing server.
//!
//! Every inbound `GET` is first offered to the backing server. A `200` with a
//! non-empty body is relayed verbatim and the request is done; anything else
//! falls through to the downstream chain untouched.
//!
//! Header values and order are relayed as received. Names arrive lowercased
//! from the HTTP client (`Content-Type` becomes `content-type`); HTTP header
//! names are case-insensitive, so this is the only rewrite.
//!
//! ```text
//! GET /app/app.nocache.js ──► http://127.0.0.1:9876/app/app.nocache.js
//!                              200 + body  → relay status, headers, body
//!                              otherwise   → Continue
//! ```

use crate::{
    backend::{http_agent, loopback_if_wildcard},
    debug,
};
use rustc_hash::FxHashSet;
use std::{io::Read, time::Duration};
use thiserror::Error;
use tiny_http::Method;

/// Backing server port used when none (or garbage) is configured.
pub const DEFAULT_PORT: u16 = 9876;
const DEFAULT_ADDRESS: &str = "127.0.0.1";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("proxy request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    #[error("failed to read proxied body from {url}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Initialization parameters, read once.
#[derive(Debug, Clone)]
pub struct InitParams<'a> {
    pub bind_address: &'a str,
    /// Textual port; unparseable values keep [`DEFAULT_PORT`].
    pub bind_port: &'a str,
    pub timeout: Duration,
    pub max_idle_connections: usize,
}

/// A fully buffered backing-server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedResponse {
    pub status: u16,
    /// Every response header, in order, duplicates included. Names are lowercase.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Handled; write this response and skip the downstream chain.
    Proxied(ProxiedResponse),
    /// Not handled; run the downstream chain.
    Continue,
}

pub struct ProxyFilter {
    address: String,
    port: u16,
    agent: ureq::Agent,
}

impl ProxyFilter {
    pub fn init(params: InitParams<'_>) -> Self {
        let address = match params.bind_address.trim() {
            "" => DEFAULT_ADDRESS,
            address => loopback_if_wildcard(address),
        };
        let port = params.bind_port.trim().parse().unwrap_or(DEFAULT_PORT);

        Self {
            address: address.to_string(),
            port,
            agent: http_agent(params.timeout, params.max_idle_connections),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Outbound URL for an inbound request target. The query string is dropped.
    pub fn target_url(&self, request_url: &str) -> String {
        let path = request_url
            .split_once(['?', '#'])
            .map_or(request_url, |(path, _)| path);
        let path = if path.starts_with('/') { path } else { "/" };
        format!("http://{}:{}{}", self.address, self.port, path)
    }

    /// Offer one inbound request to the backing server.
    ///
    /// Non-`GET` requests never leave the process. A backend that answers
    /// with anything but a non-empty `200` yields [`Outcome::Continue`];
    /// failing to reach it at all is an error.
    pub fn filter(&self, method: &Method, request_url: &str) -> Result<Outcome, ProxyError> {
        if *method != Method::Get {
            return Ok(Outcome::Continue);
        }

        let url = self.target_url(request_url);
        debug!("proxy"; "GET {}", url);

        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                debug!("proxy"; "{} answered {}", url, status);
                return Ok(Outcome::Continue);
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ProxyError::Transport {
                    url,
                    source: Box::new(transport),
                });
            }
        };

        if response.status() != 200 {
            return Ok(Outcome::Continue);
        }

        let headers = collect_headers(&response);
        let status = response.status();
        let mut body = Vec::new();
        if let Err(source) = response.into_reader().read_to_end(&mut body) {
            return Err(ProxyError::Body { url, source });
        }

        if body.is_empty() {
            return Ok(Outcome::Continue);
        }

        Ok(Outcome::Proxied(ProxiedResponse {
            status,
            headers,
            body,
        }))
    }
}

fn collect_headers(response: &ureq::Response) -> Vec<(String, String)> {
    let mut seen = FxHashSet::default();
    let mut headers = Vec::new();
    for name in response.headers_names() {
        if !seen.insert(name.to_ascii_lowercase()) {
            continue;
        }
        for value in response.all(&name) {
            headers.push((name.clone(), value.to_string()));
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use tiny_http::{Header, Response, Server};

    fn filter_for(port: u16) -> ProxyFilter {
        ProxyFilter::init(InitParams {
            bind_address: "0.0.0.0",
            bind_port: &port.to_string(),
            timeout: Duration::from_secs(5),
            max_idle_connections: 2,
        })
    }

    /// Backing server answering one request, recording the request URL.
    fn backing(
        status: u16,
        body: &'static [u8],
        headers: Vec<Header>,
    ) -> (u16, Arc<Mutex<Vec<String>>>, thread::JoinHandle<()>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            recorded.lock().unwrap().push(request.url().to_string());
            let mut response = Response::from_data(body).with_status_code(status);
            for header in headers {
                response.add_header(header);
            }
            request.respond(response).unwrap();
        });
        (port, seen, handle)
    }

    /// A port with nothing listening.
    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_init_params() {
        let filter = ProxyFilter::init(InitParams {
            bind_address: "0.0.0.0",
            bind_port: "not-a-port",
            timeout: Duration::from_secs(1),
            max_idle_connections: 1,
        });
        assert_eq!(filter.address(), "127.0.0.1");
        assert_eq!(filter.port(), DEFAULT_PORT);

        let filter = ProxyFilter::init(InitParams {
            bind_address: "10.0.0.2",
            bind_port: "9000",
            timeout: Duration::from_secs(1),
            max_idle_connections: 1,
        });
        assert_eq!(filter.address(), "10.0.0.2");
        assert_eq!(filter.port(), 9000);
    }

    #[test]
    fn test_target_url_drops_query() {
        let filter = filter_for(9876);
        assert_eq!(
            filter.target_url("/app/app.nocache.js?v=3"),
            "http://127.0.0.1:9876/app/app.nocache.js"
        );
        assert_eq!(filter.target_url("/"), "http://127.0.0.1:9876/");
    }

    #[test]
    fn test_proxies_successful_get() {
        let body_37: &'static [u8] = b"console.log('hello from backing!!!');";
        assert_eq!(body_37.len(), 37);

        let headers = vec![
            Header::from_bytes("Content-Type", "application/javascript").unwrap(),
            Header::from_bytes("X-Module", "app").unwrap(),
            Header::from_bytes("X-Module", "lib").unwrap(),
        ];
        let (port, seen, handle) = backing(200, body_37, headers);

        let outcome = filter_for(port).filter(&Method::Get, "/app.js").unwrap();
        handle.join().unwrap();

        let Outcome::Proxied(response) = outcome else {
            panic!("expected proxied response");
        };
        assert_eq!(response.status, 200);
        assert_eq!(response.body, body_37);

        let date = response
            .headers
            .iter()
            .find(|(name, _)| name == "date")
            .map(|(_, value)| value.clone())
            .unwrap();
        let expected: Vec<(String, String)> = [
            ("server", "tiny-http (Rust)"),
            ("date", date.as_str()),
            ("content-type", "application/javascript"),
            ("x-module", "app"),
            ("x-module", "lib"),
            ("content-length", "37"),
        ]
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
        assert_eq!(response.headers, expected);
        assert_eq!(*seen.lock().unwrap(), vec!["/app.js"]);
    }

    #[test]
    fn test_not_found_continues() {
        let (port, _seen, handle) = backing(404, b"missing", vec![]);
        let outcome = filter_for(port).filter(&Method::Get, "/app.js").unwrap();
        handle.join().unwrap();
        assert_eq!(outcome, Outcome::Continue);
    }

    #[test]
    fn test_empty_body_continues() {
        let (port, _seen, handle) = backing(200, b"", vec![]);
        let outcome = filter_for(port).filter(&Method::Get, "/empty").unwrap();
        handle.join().unwrap();
        assert_eq!(outcome, Outcome::Continue);
    }

    #[test]
    fn test_post_never_contacts_backend() {
        let filter = filter_for(closed_port());
        assert_eq!(filter.filter(&Method::Post, "/app.js").unwrap(), Outcome::Continue);
        assert_eq!(filter.filter(&Method::Head, "/app.js").unwrap(), Outcome::Continue);
    }

    #[test]
    fn test_unreachable_backend_is_error() {
        let filter = filter_for(closed_port());
        assert!(matches!(
            filter.filter(&Method::Get, "/app.js"),
            Err(ProxyError::Transport { .. })
        ));
    }
}

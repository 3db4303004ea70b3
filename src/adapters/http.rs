//! HTTP client adapter.
//!
//! Implements [`HttpPort`] over the ESP-IDF HTTP client. A fresh
//! connection is opened per request; bodies are read fully into memory,
//! capped at [`MAX_BODY_BYTES`].
//!
//! On non-espidf targets every request fails with
//! [`Error::EndpointUnreachable`]; host tests use scripted network fakes.

use log::{debug, warn};

use crate::app::ports::{HttpPort, HttpResponse};
use crate::error::{Error, Result};

/// Upper bound on a response body kept in memory.
pub const MAX_BODY_BYTES: usize = 4096;
/// Per-request network timeout.
pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

/// Append `chunk` to `body` up to [`MAX_BODY_BYTES`]. Returns `false` once
/// the cap cut the chunk short; the caller stops reading.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn append_capped(body: &mut Vec<u8>, chunk: &[u8], url: &str) -> bool {
    let room = MAX_BODY_BYTES.saturating_sub(body.len());
    body.extend_from_slice(&chunk[..chunk.len().min(room)]);
    if chunk.len() > room {
        warn!("HTTP: {} body truncated at {} bytes", url, MAX_BODY_BYTES);
        return false;
    }
    true
}

pub struct HttpAdapter {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    timeout_ms: u32,
}

impl Default for HttpAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl HttpAdapter {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }

    #[cfg(target_os = "espidf")]
    fn platform_request(&mut self, url: &str, body: Option<&[u8]>) -> Result<HttpResponse> {
        use embedded_svc::http::client::Client;
        use embedded_svc::io::{Read, Write};
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let config = Configuration {
            timeout: Some(core::time::Duration::from_millis(u64::from(self.timeout_ms))),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&config).map_err(|_| Error::EndpointUnreachable)?;
        let mut client = Client::wrap(conn);

        let mut response = match body {
            Some(body) => {
                let len = body.len().to_string();
                let headers = [("Content-Type", "application/json"), ("Content-Length", len.as_str())];
                let mut request = client.post(url, &headers).map_err(|_| Error::EndpointUnreachable)?;
                request.write_all(body).map_err(|_| Error::EndpointUnreachable)?;
                request.flush().map_err(|_| Error::EndpointUnreachable)?;
                request.submit().map_err(|_| Error::EndpointUnreachable)?
            }
            None => client
                .get(url)
                .map_err(|_| Error::EndpointUnreachable)?
                .submit()
                .map_err(|_| Error::EndpointUnreachable)?,
        };

        let status = response.status();
        let mut out = Vec::new();
        let mut buf = [0u8; 512];
        loop {
            let n = response.read(&mut buf).map_err(|_| Error::EndpointUnreachable)?;
            if n == 0 {
                break;
            }
            if !append_capped(&mut out, &buf[..n], url) {
                break;
            }
        }
        Ok(HttpResponse { status, body: out })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_request(&mut self, url: &str, _body: Option<&[u8]>) -> Result<HttpResponse> {
        debug!("HTTP(sim): no transport for {}", url);
        Err(Error::EndpointUnreachable)
    }
}

impl HttpPort for HttpAdapter {
    fn get(&mut self, url: &str) -> Result<HttpResponse> {
        debug!("HTTP: GET {}", url);
        self.platform_request(url, None)
    }

    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse> {
        debug!("HTTP: POST {} ({} bytes)", url, body.len());
        self.platform_request(url, Some(body))
    }
}

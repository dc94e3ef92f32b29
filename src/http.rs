//! Blocking HTTP plumbing shared by both jobs
//!
//! One `ureq` agent per run with a fixed whole-request timeout. No retries:
//! a transport failure or non-2xx status is returned to the caller as-is.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{log_error, log_fetch};

pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build();
        Self { agent }
    }

    pub fn get(&self, url: &str) -> ureq::Request {
        self.agent.get(url)
    }

    pub fn post(&self, url: &str) -> ureq::Request {
        self.agent.post(url)
    }

    /// Send a request. Any HTTP status is returned as a response; only
    /// transport failures are errors, so callers can inspect headers first.
    pub fn call(&self, request: ureq::Request) -> Result<ureq::Response> {
        let url = request.url().to_string();
        log_fetch(&format!("{} {}", request.method(), url));
        map_outcome(&url, request.call())
    }

    /// Like [`HttpClient::call`] but with a JSON body.
    pub fn call_json(
        &self,
        request: ureq::Request,
        body: &impl Serialize,
    ) -> Result<ureq::Response> {
        let url = request.url().to_string();
        log_fetch(&format!("{} {}", request.method(), url));
        map_outcome(&url, request.send_json(body))
    }

    /// GET and require 2xx.
    pub fn fetch(&self, url: &str) -> Result<ureq::Response> {
        let response = self.call(self.get(url))?;
        ensure_success(url, response)
    }

    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        read_json(url, self.fetch(url)?)
    }

    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        read_bytes(url, self.fetch(url)?)
    }
}

fn map_outcome(
    url: &str,
    outcome: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response> {
    match outcome {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(_, response)) => Ok(response),
        Err(ureq::Error::Transport(transport)) => {
            let message = transport.to_string();
            log_error(&format!("Network error for {}: {}", url, message));
            Err(Error::Transport {
                url: url.to_string(),
                message,
            })
        }
    }
}

/// Turn a non-2xx response into [`Error::Status`], capturing the body.
pub fn ensure_success(url: &str, response: ureq::Response) -> Result<ureq::Response> {
    let status = response.status();
    if (200..300).contains(&status) {
        return Ok(response);
    }
    let body = response.into_string().unwrap_or_default();
    log_error(&format!("HTTP {} from {}: {}", status, url, body));
    Err(Error::Status {
        url: url.to_string(),
        status,
        body,
    })
}

pub fn read_bytes(url: &str, response: ureq::Response) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut buf)
        .map_err(|e| Error::Transport {
            url: url.to_string(),
            message: format!("failed reading body: {}", e),
        })?;
    Ok(buf)
}

pub fn read_json<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T> {
    let bytes = read_bytes(url, response)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

// src/http.rs
//! HTTP transport for probes.
//!
//! reqwest fixes the redirect policy per client, so two pooled clients are
//! kept: one that follows redirects (SQLi probes) and one that does not
//! (XSS reflection probes). Both live for the whole scan.

use crate::config::ScanConfig;
use crate::error::{ProbeError, TransportError};
use crate::types::{HttpMethod, ProbeRequest, ProbeResponse};
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;

#[derive(Clone)]
pub struct HttpClient {
    following: Client,
    direct: Client,
}

impl HttpClient {
    pub fn new(config: &ScanConfig) -> Result<Self, ProbeError> {
        let build = |policy: Policy| {
            Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(config.user_agent.as_str())
                .redirect(policy)
                .build()
        };

        Ok(Self {
            following: build(Policy::limited(MAX_REDIRECTS))?,
            direct: build(Policy::none())?,
        })
    }

    /// Send one probe. Any status code, 4xx/5xx included, is a response.
    pub async fn send(&self, request: &ProbeRequest) -> Result<ProbeResponse, TransportError> {
        let client = if request.follow_redirects {
            &self.following
        } else {
            &self.direct
        };

        let builder = match request.method {
            HttpMethod::GET => client.get(request.url.clone()),
            HttpMethod::POST => {
                let fields: &[(String, String)] = request.form.as_deref().unwrap_or(&[]);
                client.post(request.url.clone()).form(fields)
            }
        };

        let response = builder.send().await?;
        let status_code = response.status().as_u16();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.to_string(),
                value.to_str().unwrap_or_default().to_string(),
            );
        }

        let body = response.text().await?;

        Ok(ProbeResponse {
            status_code,
            headers,
            body,
        })
    }
}

use anyhow::{Context, Result};
use base64::Engine as _;
use reqwest::blocking::Client;
use reqwest::Method;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{HttpExecutor, SecretStore};
use crate::core::request::{HttpResponse, Request};
use crate::core::syntax::is_likely_json;

/// Everything needed to put a [`Request`] on the wire, with auth resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Option<(String, String)>,
    pub body: Option<String>,
}

impl Prepared {
    fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value));
    }
}

/// Resolve auth and default headers. A secret that cannot be read is
/// treated as absent and the request goes out without credentials.
pub fn prepare(request: &Request, secrets: &dyn SecretStore) -> Prepared {
    let mut out = Prepared {
        method: request.method.clone(),
        url: request.url.clone(),
        headers: Vec::new(),
        query: None,
        body: None,
    };
    if !request.header_key.is_empty() {
        out.set_header(&request.header_key, request.header_value.clone());
    }

    let secret = || -> Option<String> {
        if request.auth_secret_ref.is_empty() {
            return None;
        }
        match secrets.get(&request.auth_secret_ref) {
            Ok(secret) => secret,
            Err(e) => {
                tracing::warn!("secret lookup for '{}' failed: {e:#}", request.auth_secret_ref);
                None
            }
        }
    };

    match request.auth_type.as_str() {
        "bearer" | "jwt" => {
            if let Some(token) = secret().filter(|s| !s.is_empty()) {
                out.set_header("Authorization", format!("Bearer {token}"));
            }
        }
        "api_key" => {
            if let Some(key) = secret().filter(|s| !s.is_empty()) {
                let name = if request.auth_key_name.is_empty() {
                    "X-API-Key"
                } else {
                    &request.auth_key_name
                };
                if request.auth_location == "query" {
                    out.query = Some((name.to_string(), key));
                } else {
                    out.set_header(name, key);
                }
            }
        }
        "basic" => {
            if let Some(password) = secret() {
                let userpass = format!("{}:{}", request.auth_username, password);
                let encoded = base64::engine::general_purpose::STANDARD.encode(userpass);
                out.set_header("Authorization", format!("Basic {encoded}"));
            }
        }
        _ => {}
    }

    if !request.body.is_empty()
        && is_likely_json(&request.body)
        && !request.header_key.eq_ignore_ascii_case("content-type")
    {
        out.set_header("Content-Type", "application/json".to_string());
        out.set_header("Accept", "application/json".to_string());
    }
    if !request.body.is_empty() {
        out.body = Some(request.body.clone());
    }
    out
}

/// Blocking HTTP executor backed by reqwest.
pub struct HttpClient {
    client: Client,
    secrets: Arc<dyn SecretStore>,
}

impl HttpClient {
    pub fn new(timeout_secs: u64, secrets: Arc<dyn SecretStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, secrets })
    }

    fn send(&self, prepared: Prepared) -> Result<(u16, String)> {
        let method = Method::from_bytes(prepared.method.as_bytes())
            .with_context(|| format!("invalid method {}", prepared.method))?;
        let mut builder = self.client.request(method, &prepared.url);
        if let Some(pair) = &prepared.query {
            builder = builder.query(&[pair]);
        }
        for (name, value) in &prepared.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }
        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok((status, body))
    }
}

impl HttpExecutor for HttpClient {
    fn execute(&self, request: &Request) -> HttpResponse {
        let started = Instant::now();
        let prepared = prepare(request, self.secrets.as_ref());
        let result = self.send(prepared);
        let duration_ms = started.elapsed().as_millis() as i64;
        match result {
            Ok((status, body)) => {
                let error = if (200..300).contains(&status) {
                    String::new()
                } else {
                    format!("HTTP status {status}")
                };
                HttpResponse {
                    status_code: i64::from(status),
                    duration_ms,
                    body,
                    error,
                }
            }
            Err(e) => {
                tracing::warn!("{} {} failed: {e:#}", request.method, request.url);
                HttpResponse::transport_error(format!("{e:#}"), duration_ms)
            }
        }
    }
}

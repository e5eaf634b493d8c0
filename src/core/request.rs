//! Saved requests, recorded runs, and the text forms derived from them.

use serde::{Deserialize, Serialize};

pub const METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];
pub const DEFAULT_NAME: &str = "New Request";
const SNAPSHOT_BODY_SPLIT: &str = "\nbody:\n";

/// A saved HTTP request, stored as one JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub id: String,
    pub name: String,
    pub method: String,
    pub url: String,
    pub header_key: String,
    pub header_value: String,
    pub body: String,
    /// `none`, `bearer`, `jwt`, `api_key` or `basic`.
    pub auth_type: String,
    /// Keychain account holding the credential; never the credential itself.
    pub auth_secret_ref: String,
    pub auth_key_name: String,
    /// `header` or `query` (api_key only).
    pub auth_location: String,
    pub auth_username: String,
    pub updated_at: String,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: DEFAULT_NAME.to_string(),
            method: "GET".to_string(),
            url: String::new(),
            header_key: String::new(),
            header_value: String::new(),
            body: String::new(),
            auth_type: "none".to_string(),
            auth_secret_ref: String::new(),
            auth_key_name: String::new(),
            auth_location: String::new(),
            auth_username: String::new(),
            updated_at: String::new(),
        }
    }
}

impl Request {
    pub fn new(method: &str, url: &str) -> Self {
        let mut req = Self {
            method: method.to_string(),
            url: url.to_string(),
            ..Self::default()
        };
        req.normalize();
        req
    }

    /// Fill blank required fields with their defaults.
    pub fn normalize(&mut self) {
        if self.name.trim().is_empty() {
            self.name = DEFAULT_NAME.to_string();
        }
        self.method = self.method.trim().to_uppercase();
        if self.method.is_empty() {
            self.method = "GET".to_string();
        }
        if self.auth_type.trim().is_empty() {
            self.auth_type = "none".to_string();
        }
    }

    /// Case-insensitive match of `needle` (already lowercased) against
    /// name, method and URL.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        format!("{} {} {}", self.name, self.method, self.url)
            .to_lowercase()
            .contains(needle)
    }

    pub fn field(&self, field: EditorField) -> &str {
        match field {
            EditorField::Name => &self.name,
            EditorField::Method => &self.method,
            EditorField::Url => &self.url,
            EditorField::HeaderKey => &self.header_key,
            EditorField::HeaderValue => &self.header_value,
            EditorField::AuthType => &self.auth_type,
            EditorField::AuthSecretRef => &self.auth_secret_ref,
            EditorField::AuthKeyName => &self.auth_key_name,
            EditorField::AuthLocation => &self.auth_location,
            EditorField::AuthUsername => &self.auth_username,
        }
    }

    pub fn set_field(&mut self, field: EditorField, value: String) {
        let slot = match field {
            EditorField::Name => &mut self.name,
            EditorField::Method => &mut self.method,
            EditorField::Url => &mut self.url,
            EditorField::HeaderKey => &mut self.header_key,
            EditorField::HeaderValue => &mut self.header_value,
            EditorField::AuthType => &mut self.auth_type,
            EditorField::AuthSecretRef => &mut self.auth_secret_ref,
            EditorField::AuthKeyName => &mut self.auth_key_name,
            EditorField::AuthLocation => &mut self.auth_location,
            EditorField::AuthUsername => &mut self.auth_username,
        };
        *slot = value;
    }

    /// Plain-text record of this request, stored alongside each run.
    pub fn snapshot(&self) -> String {
        let or_none = |s: &str| {
            if s.is_empty() {
                "(none)".to_string()
            } else {
                s.to_string()
            }
        };
        let header = if self.header_key.is_empty() && self.header_value.is_empty() {
            "header: none".to_string()
        } else {
            format!("header: {}: {}", self.header_key, self.header_value)
        };
        let name = if self.name.is_empty() { "(unnamed)" } else { &self.name };
        let auth = if self.auth_type.is_empty() { "none" } else { &self.auth_type };
        let body = if self.body.is_empty() { "(empty)" } else { &self.body };
        [
            format!("name: {name}"),
            format!("method: {}", self.method),
            format!("url: {}", self.url),
            format!("auth: {auth}"),
            format!("secret_ref: {}", or_none(&self.auth_secret_ref)),
            format!("auth_key_name: {}", or_none(&self.auth_key_name)),
            format!("auth_location: {}", or_none(&self.auth_location)),
            format!("auth_username: {}", or_none(&self.auth_username)),
            header,
            "body:".to_string(),
            body.to_string(),
        ]
        .join("\n")
    }

    /// Check the draft can be saved and return it with its body prettified.
    pub fn validated(&self) -> Result<Request, String> {
        if self.url.trim().is_empty() {
            return Err("URL is required before save.".to_string());
        }
        let body = prettify_body(&self.body).map_err(|e| format!("Body JSON invalid: {e}"))?;
        let mut out = self.clone();
        out.body = body;
        out.normalize();
        Ok(out)
    }
}

/// Step through [`METHODS`] with wraparound. Unknown methods count as GET.
pub fn cycle_method(method: &str, delta: i32) -> &'static str {
    let upper = method.to_uppercase();
    let current = METHODS.iter().position(|m| *m == upper).unwrap_or(0) as i32;
    let len = METHODS.len() as i32;
    METHODS[(current + delta).rem_euclid(len) as usize]
}

/// Re-indent a JSON-looking body with two spaces; other bodies pass through.
pub fn prettify_body(body: &str) -> Result<String, serde_json::Error> {
    if !super::syntax::is_likely_json(body) {
        return Ok(body.to_string());
    }
    let value: serde_json::Value = serde_json::from_str(body)?;
    serde_json::to_string_pretty(&value)
}

// ─── Editor fields ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Name,
    Method,
    Url,
    HeaderKey,
    HeaderValue,
    AuthType,
    AuthSecretRef,
    AuthKeyName,
    AuthLocation,
    AuthUsername,
}

pub const EDITOR_FIELDS: [EditorField; 10] = [
    EditorField::Name,
    EditorField::Method,
    EditorField::Url,
    EditorField::HeaderKey,
    EditorField::HeaderValue,
    EditorField::AuthType,
    EditorField::AuthSecretRef,
    EditorField::AuthKeyName,
    EditorField::AuthLocation,
    EditorField::AuthUsername,
];

pub const NAME_FIELD_INDEX: usize = 0;
pub const URL_FIELD_INDEX: usize = 2;
pub const AUTH_FIELD_INDEX: usize = 5;

impl EditorField {
    pub fn label(self) -> &'static str {
        match self {
            EditorField::Name => "Name",
            EditorField::Method => "Method",
            EditorField::Url => "URL",
            EditorField::HeaderKey => "Header Key",
            EditorField::HeaderValue => "Header Value",
            EditorField::AuthType => "Auth Type",
            EditorField::AuthSecretRef => "Secret Ref",
            EditorField::AuthKeyName => "Auth Key Name",
            EditorField::AuthLocation => "Auth Location",
            EditorField::AuthUsername => "Auth Username",
        }
    }

    /// The method is only changed by cycling, never typed.
    pub fn editable(self) -> bool {
        self != EditorField::Method
    }
}

// ─── Runs ─────────────────────────────────────────────────────────────────────

/// One recorded execution of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunEntry {
    pub id: i64,
    pub request_id: String,
    pub request_name: String,
    pub method: String,
    pub url: String,
    pub status_code: i64,
    pub duration_ms: i64,
    pub error: String,
    pub created_at: String,
    pub request_snapshot: String,
    pub response_body: String,
}

impl RunEntry {
    pub fn from_response(req: &Request, response: &HttpResponse) -> Self {
        Self {
            id: 0,
            request_id: req.id.clone(),
            request_name: req.name.clone(),
            method: req.method.clone(),
            url: req.url.clone(),
            status_code: response.status_code,
            duration_ms: response.duration_ms,
            error: response.error.clone(),
            created_at: String::new(),
            request_snapshot: req.snapshot(),
            response_body: response.body.clone(),
        }
    }

    /// A run that never got an HTTP status back.
    pub fn is_transport_failure(&self) -> bool {
        self.status_code <= 0
    }

    pub fn status_label(&self) -> String {
        if self.is_transport_failure() {
            "ERR".to_string()
        } else {
            format!("[{}]", self.status_code)
        }
    }

    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        format!(
            "{} {} {} {} {} {}",
            self.request_name,
            self.id,
            self.method,
            self.url,
            self.status_label(),
            self.error
        )
        .to_lowercase()
        .contains(needle)
    }
}

/// Result of executing a request. Transport failures carry `status_code == 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: i64,
    pub duration_ms: i64,
    pub body: String,
    pub error: String,
}

impl HttpResponse {
    pub fn transport_error(message: impl Into<String>, duration_ms: i64) -> Self {
        Self {
            status_code: 0,
            duration_ms,
            body: String::new(),
            error: message.into(),
        }
    }
}

/// The most recent response, shown under the request list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePreview {
    pub request_id: String,
    pub request_name: String,
    pub method: String,
    pub url: String,
    pub at: String,
    pub status_code: i64,
    pub duration_ms: i64,
    pub body: String,
    pub error: String,
}

impl ResponsePreview {
    pub fn new(req: &Request, response: &HttpResponse, at: String) -> Self {
        Self {
            request_id: req.id.clone(),
            request_name: req.name.clone(),
            method: req.method.clone(),
            url: req.url.clone(),
            at,
            status_code: response.status_code,
            duration_ms: response.duration_ms,
            body: response.body.clone(),
            error: response.error.clone(),
        }
    }
}

/// A stored snapshot split back into `key: value` pairs and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotView {
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl SnapshotView {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub fn parse_snapshot(snapshot: &str) -> SnapshotView {
    let (meta, body) = match snapshot.find(SNAPSHOT_BODY_SPLIT) {
        Some(idx) => (&snapshot[..idx], &snapshot[idx + SNAPSHOT_BODY_SPLIT.len()..]),
        None => (snapshot, ""),
    };
    let fields = meta
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once(':')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect();
    SnapshotView {
        fields,
        body: if body.is_empty() {
            "(empty)".to_string()
        } else {
            body.to_string()
        },
    }
}

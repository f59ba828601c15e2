use std::io::Read;

use anyhow::Result;
use axum::http::HeaderMap;
use flate2::read::GzDecoder;
use serde_json::Value;

use backend_domain::{IngestPayload, RuntimeConfig};

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

/// Raw census payloads from a JSON array or `{events: [...]}`; full
/// `serviceMessage` envelopes are unwrapped to their payload.
pub fn parse_payloads(headers: &HeaderMap, body: &[u8]) -> Result<Vec<Value>> {
    let content = maybe_gunzip(headers, body)?;
    let payload: IngestPayload = serde_json::from_str(&content)?;
    Ok(payload
        .into_events()
        .into_iter()
        .map(unwrap_service_message)
        .collect())
}

fn unwrap_service_message(mut value: Value) -> Value {
    let is_envelope = value.get("type").and_then(Value::as_str) == Some("serviceMessage");
    match value.get_mut("payload") {
        Some(payload) if is_envelope => payload.take(),
        _ => value,
    }
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

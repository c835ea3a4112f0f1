//! API key authentication.
//!
//! Read endpoints take a signed request: the shared key, an RFC 3339
//! timestamp, and `hex(HMAC-SHA256(key, timestamp))`. The sync trigger only
//! takes the key.

use std::sync::Arc;

use axum::{
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Oldest signed timestamp still accepted.
pub const SIGNATURE_MAX_AGE: Duration = Duration::minutes(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid API key")]
    InvalidApiKey,
    #[error("missing timestamp or signature")]
    MissingSignature,
    #[error("timestamp is malformed or expired")]
    ExpiredTimestamp,
    #[error("signature mismatch")]
    InvalidSignature,
}

/// Hex HMAC-SHA256 of `timestamp` under `secret`, as clients send it.
pub fn sign_timestamp(secret: &str, timestamp: &str) -> String {
    hex::encode(mac_for(secret, timestamp).finalize().into_bytes())
}

fn mac_for(secret: &str, timestamp: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC takes keys of any size"));
    mac.update(timestamp.as_bytes());
    mac
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// The presented key: `X-API-Key`, falling back to the `api_key` query parameter.
pub fn presented_api_key(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    if let Some(key) = header(headers, API_KEY_HEADER) {
        return Some(key.to_string());
    }
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(name, _)| name == "api_key")
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.is_empty())
}

/// Check the presented key against `secret`.
pub fn verify_api_key(
    headers: &HeaderMap,
    query: Option<&str>,
    secret: &str,
) -> Result<(), AuthError> {
    let presented = presented_api_key(headers, query).unwrap_or_default();
    if constant_time_eq(presented.as_bytes(), secret.as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::InvalidApiKey)
    }
}

/// Full signed-request check as of `now`.
pub fn verify_signed_request(
    headers: &HeaderMap,
    query: Option<&str>,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    verify_api_key(headers, query, secret)?;

    let (Some(timestamp), Some(signature)) = (
        header(headers, TIMESTAMP_HEADER),
        header(headers, SIGNATURE_HEADER),
    ) else {
        return Err(AuthError::MissingSignature);
    };

    let signed_at = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| AuthError::ExpiredTimestamp)?
        .with_timezone(&Utc);
    if now - signed_at > SIGNATURE_MAX_AGE {
        return Err(AuthError::ExpiredTimestamp);
    }

    let signature = hex::decode(signature).map_err(|_| AuthError::InvalidSignature)?;
    mac_for(secret, timestamp)
        .verify_slice(&signature)
        .map_err(|_| AuthError::InvalidSignature)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

/// Reject requests that are not signed with `secret`.
pub async fn signed_request_middleware(
    secret: Arc<str>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let query = request.uri().query();
    match verify_signed_request(request.headers(), query, &secret, Utc::now()) {
        Ok(()) => {
            debug!(%method, %path, "Signed request accepted");
            next.run(request).await
        }
        Err(e) => {
            warn!(%method, %path, reason = %e, "Rejected signed request");
            unauthorized()
        }
    }
}

/// Reject requests that do not carry `secret` as their API key.
pub async fn api_key_middleware(
    secret: Arc<str>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match verify_api_key(request.headers(), request.uri().query(), &secret) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            warn!(path = %request.uri().path(), reason = %e, "Rejected API key");
            unauthorized()
        }
    }
}

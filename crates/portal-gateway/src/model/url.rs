use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub original_url: String,
    pub custom_alias: Option<String>,
    /// Lifetime in seconds, counted from the moment of creation.
    pub ttl_seconds: Option<u64>,
    /// Absolute expiration (RFC 3339). Mutually exclusive with `ttl_seconds`.
    pub expire_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct CreateUrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub expire_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use portal_core::ShortCode;
use portal_redirector::Resolution;
use portal_shortener::{ExpirationPolicy, ShortenParams, ShortenerError};
use std::time::Duration;

/// Aliases that would be shadowed by a fixed route.
pub const RESERVED_ALIASES: &[&str] = &["health", "v1"];

pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>)> {
    let expiration = match (request.ttl_seconds, request.expire_at) {
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "ttl_seconds and expire_at are mutually exclusive".to_string(),
            ))
        }
        (Some(ttl), None) => ExpirationPolicy::AfterDuration(Duration::from_secs(ttl)),
        (None, Some(expire_at)) => ExpirationPolicy::AtTimestamp(expire_at),
        (None, None) => ExpirationPolicy::Never,
    };

    let mut params = ShortenParams::new(request.original_url).expiring(expiration);
    if let Some(alias) = request.custom_alias {
        if RESERVED_ALIASES.contains(&alias.as_str()) {
            return Err(AppError::BadRequest(format!(
                "custom alias is reserved: {}",
                alias
            )));
        }
        params = params.with_alias(ShortCode::new(alias).map_err(ShortenerError::from)?);
    }

    let mapping = state.shortener().shorten(params).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUrlResponse {
            short_code: mapping.code().to_string(),
            short_url: mapping.code().to_url(state.base_url()),
            original_url: mapping.original_url().to_string(),
            expire_at: mapping.expire_at(),
        }),
    ))
}

pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    // a malformed code can never have been stored
    let Ok(code) = ShortCode::new(short_code.as_str()) else {
        return Err(AppError::NotFound(format!(
            "short code not found: {}",
            short_code
        )));
    };

    match state.redirector().resolve(&code).await? {
        Resolution::Live { original_url } => Ok(Redirect::temporary(&original_url)),
        Resolution::Expired { expired_at } => Err(AppError::Gone(format!(
            "short code {} expired at {}",
            code, expired_at
        ))),
        Resolution::NotFound => Err(AppError::NotFound(format!(
            "short code not found: {}",
            code
        ))),
    }
}

pub async fn delete_url_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let code = ShortCode::new(short_code).map_err(ShortenerError::from)?;

    if state.shortener().delete(&code).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("short code not found: {}", code)))
    }
}

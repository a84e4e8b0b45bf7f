use std::net::SocketAddr;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use futures::StreamExt;
use secrecy::ExposeSecret;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppError,
    application::use_cases::notification::Notification,
    infra::webhook_signer::verify_signature,
};

pub const SIGNATURE_HEADER: &str = "x-signature";

/// Authenticates a webhook by the HMAC of its raw body. The body is buffered
/// and handed back to the request so the handler can read it again.
pub async fn verify_signature_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let origin = caller_origin(&request, app_state.config.trust_proxy);
    let limit = app_state.config.max_body_bytes;

    if let Some(len) = request.headers().get(CONTENT_LENGTH)
        && let Ok(len) = len.to_str()
        && let Ok(len) = len.parse::<usize>()
        && len > limit
    {
        return Err(AppError::PayloadTooLarge);
    }

    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let (parts, body) = request.into_parts();
    let bytes = buffer_body(body, limit).await?;

    let secret = app_state.config.webhook_secret.expose_secret().as_bytes();
    if let Err(reason) = verify_signature(secret, &bytes, signature.as_deref()) {
        tracing::warn!(
            origin = %origin,
            path = %parts.uri.path(),
            reason = %reason,
            "Unauthorized webhook request"
        );
        app_state
            .dispatcher
            .dispatch(Notification::unauthorized(&origin));
        return Err(AppError::AuthenticationFailure);
    }

    Ok(next
        .run(Request::from_parts(parts, Body::from(bytes)))
        .await)
}

/// Reads the whole body. Chunked bodies without a Content-Length are held to
/// the same limit; a broken stream is reported as an unreadable body.
async fn buffer_body(body: Body, limit: usize) -> Result<Bytes, AppError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AppError::InvalidBody(e.to_string()))?;
        if buf.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// Socket peer, or the first forwarded hop when running behind a trusted
/// proxy. Requests served without connect info (tests) report `unknown`.
fn caller_origin(req: &Request, trust_proxy: bool) -> String {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    // Only trust forwarded headers if explicitly configured (when behind a reverse proxy)
    let forwarded = if trust_proxy { forwarded_ip(req) } else { None };

    forwarded
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(req: &Request) -> Option<String> {
    // Extract IP from X-Forwarded-For or X-Real-IP headers
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(real) = req.headers().get("x-real-ip")
        && let Ok(val) = real.to_str()
        && !val.trim().is_empty()
    {
        return Some(val.trim().to_string());
    }
    None
}

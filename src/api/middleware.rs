//! Request guards for the wallet API
//!
//! - API key authentication (`x-api-key` or `Authorization: Bearer`)
//! - Fixed-window rate limiting per client IP
//! - Request body size limit
//! - Security response headers
//! - Optional request logging with masked client IPs
//!
//! Rejections use the same `{ "error", "success": false }` envelope as the
//! handlers.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::api::response::ApiError;
use crate::config::ServiceConfig;

/// Settings consumed by the guards
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub enable_auth: bool,
    pub api_keys: Vec<String>,
    /// Requests per minute per client IP
    pub rate_limit_per_minute: u32,
    /// Largest accepted `Content-Length`, in bytes
    pub max_request_size: usize,
    pub log_requests: bool,
    pub sanitize_logs: bool,
    /// Path prefixes reachable without an API key
    pub public_paths: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enable_auth: true,
            api_keys: Vec::new(),
            rate_limit_per_minute: 120,
            max_request_size: 64 * 1024,
            log_requests: false,
            sanitize_logs: true,
            public_paths: vec!["/health".to_string()],
        }
    }
}

impl From<&ServiceConfig> for GuardConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            enable_auth: config.security.enable_auth,
            api_keys: config.security.api_keys.clone(),
            rate_limit_per_minute: config.security.rate_limit_per_minute,
            max_request_size: config.security.max_request_size,
            log_requests: config.logging.log_requests,
            sanitize_logs: config.logging.sanitize_logs,
            ..Self::default()
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Seconds until the client's window resets
    pub reset_after: u64,
}

/// Fixed-window request counter keyed by client IP
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, (u32, Instant)>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self::with_window(requests_per_minute, Duration::from_secs(60))
    }

    pub fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count a request from `client` and decide whether it may proceed
    pub fn check(&self, client: &str) -> RateDecision {
        let now = Instant::now();
        let mut entry = self.windows.entry(client.to_string()).or_insert((0, now));
        let (count, started) = entry.value_mut();

        if now.duration_since(*started) >= self.window {
            *count = 0;
            *started = now;
        }

        let reset_after = self
            .window
            .saturating_sub(now.duration_since(*started))
            .as_secs();

        if *count >= self.limit {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_after,
            };
        }

        *count += 1;
        RateDecision {
            allowed: true,
            remaining: self.limit - *count,
            reset_after,
        }
    }

    /// Drop windows that expired long ago
    pub fn prune(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, (_, started)| now.duration_since(*started) < self.window * 2);
    }
}

/// Shared state of the guard layers
#[derive(Clone)]
pub struct GuardState {
    pub config: GuardConfig,
    pub rate_limiter: Arc<RateLimiter>,
}

impl GuardState {
    pub fn new(config: GuardConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_per_minute));
        Self {
            config,
            rate_limiter,
        }
    }
}

/// Client IP, preferring proxy headers over the socket address
fn client_ip(headers: &HeaderMap, addr: Option<&SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_string)
        .or_else(|| addr.map(|a| a.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Keep the first and last four characters of a value, mask short ones fully
pub fn mask_for_log(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn is_public_path(path: &str, public_paths: &[String]) -> bool {
    public_paths.iter().any(|p| path.starts_with(p.as_str()))
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(key.trim());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

pub async fn auth_middleware(
    State(state): State<GuardState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();

    if !state.config.enable_auth || is_public_path(&path, &state.config.public_paths) {
        return Ok(next.run(request).await);
    }

    match presented_key(&headers) {
        Some(key) if state.config.api_keys.iter().any(|k| k == key) => {
            debug!(path = %path, "API key accepted");
            Ok(next.run(request).await)
        }
        Some(_) => {
            warn!(path = %path, "Rejected invalid API key");
            Err(ApiError::unauthorized("Invalid API key"))
        }
        None => {
            warn!(path = %path, "Rejected request without API key");
            Err(ApiError::unauthorized("Missing API key"))
        }
    }
}

fn rate_headers(headers: &mut HeaderMap, limit: u32, decision: RateDecision) {
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(decision.reset_after));
}

pub async fn rate_limit_middleware(
    State(state): State<GuardState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&headers, Some(&addr));
    let decision = state.rate_limiter.check(&client);
    let limit = state.rate_limiter.limit();

    if !decision.allowed {
        warn!(path = %request.uri().path(), "Rate limit exceeded");

        let mut response = ApiError::too_many_requests("Rate limit exceeded").into_response();
        rate_headers(response.headers_mut(), limit, decision);
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(decision.reset_after));
        return response;
    }

    let mut response = next.run(request).await;
    rate_headers(response.headers_mut(), limit, decision);
    response
}

pub async fn body_size_middleware(
    State(state): State<GuardState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Some(length) = declared
        && length > state.config.max_request_size
    {
        warn!(
            length = length,
            max = state.config.max_request_size,
            "Request body too large"
        );
        return Err(ApiError::payload_too_large("Request body too large"));
    }

    Ok(next.run(request).await)
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    // Balances must never be served from a cache
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.remove(header::SERVER);

    response
}

pub async fn logging_middleware(
    State(state): State<GuardState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.log_requests {
        return next.run(request).await;
    }

    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = client_ip(&headers, Some(&addr));
    let client = if state.config.sanitize_logs {
        mask_for_log(&client)
    } else {
        client
    };

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let duration_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        error!(%method, %path, status, duration_ms, client_ip = %client, "Request failed");
    } else if response.status().is_client_error() {
        warn!(%method, %path, status, duration_ms, client_ip = %client, "Request rejected");
    } else {
        info!(%method, %path, status, duration_ms, client_ip = %client, "Request completed");
    }

    response
}

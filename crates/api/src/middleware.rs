use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::RateLimitConfig;
use crate::context::RequestTime;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again in an hour!";

/// Per-client-IP request limiter.
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl RateLimitState {
    /// `config.max` requests per `config.window`, refilled evenly across the window.
    pub fn new(config: &RateLimitConfig) -> Self {
        let max = NonZeroU32::new(config.max).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(config.window / max.get())
            .unwrap_or_else(|| Quota::per_hour(max))
            .allow_burst(max);
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }
}

pub async fn rate_limit(
    State(state): State<RateLimitState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);

    if state.limiter.check_key(&ip).is_err() {
        tracing::warn!(%ip, "rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE).into_response();
    }

    next.run(req).await
}

/// Peer address when the server was started with connect info; in-process
/// callers (tests) share one unspecified bucket.
fn client_ip(req: &axum::http::Request<axum::body::Body>) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn stamp_request_time(mut req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    req.extensions_mut().insert(RequestTime::now());
    next.run(req).await
}

/// Hardening headers added to every response unless a handler already set them.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-dns-prefetch-control", "off"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-xss-protection", "0"),
    ("cross-origin-opener-policy", "same-origin"),
];

pub fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS.iter().fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

//! Per-request client metadata.

use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Who sent the request, as far as we can tell.
///
/// `x-forwarded-for` is taken verbatim when present and non-empty, otherwise
/// the socket peer. The header is not validated: this is attribution, not a
/// security control.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub remote: String,
    pub user_agent: Option<String>,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self {
            remote: resolve_remote(&parts.headers, peer),
            user_agent: header_str(&parts.headers, header::USER_AGENT.as_str()).map(str::to_owned),
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Forwarded-for header if usable, else the peer address, else empty.
pub fn resolve_remote(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    match header_str(headers, FORWARDED_FOR) {
        Some(fwd) => fwd.to_owned(),
        None => peer.map(|p| p.to_string()).unwrap_or_default(),
    }
}

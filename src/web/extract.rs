use std::{convert::Infallible, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, HeaderMap},
};

use crate::collector::RequestContext;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Pulls the caller's address and user agent out of the request.
/// The address prefers the `X-Forwarded-For` header as sent and falls back to the peer address,
/// which is only known when the router is served with connect info.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = header_value(&parts.headers, FORWARDED_FOR_HEADER).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });
        let user_agent = header_value(&parts.headers, USER_AGENT.as_str());

        Ok(RequestContext { ip, user_agent })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

//! HTTP verb override for HTML forms.
//!
//! Browsers can only submit forms as GET or POST. A POST carrying
//! `?_method=PUT` (or an `X-HTTP-Method-Override: PUT` header) is rewritten
//! to that verb *before* routing, so the router sees the intended method.
//! Only PUT, PATCH and DELETE can be requested; anything else is ignored.

use axum::extract::Query;
use axum::http::{HeaderName, Method, Request};
use serde::Deserialize;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Header carrying the intended verb
pub const OVERRIDE_HEADER: HeaderName = HeaderName::from_static("x-http-method-override");

#[derive(Debug, Deserialize)]
struct OverrideQuery {
    #[serde(rename = "_method")]
    method: Option<String>,
}

fn parse_override(value: &str) -> Option<Method> {
    match value.trim().to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

/// The verb a request asks to be treated as, if any
///
/// The query parameter takes precedence over the header.
pub fn requested_method<B>(req: &Request<B>) -> Option<Method> {
    if req.method() != Method::POST {
        return None;
    }

    let from_query = Query::<OverrideQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.method)
        .and_then(|m| parse_override(&m));

    from_query.or_else(|| {
        req.headers()
            .get(&OVERRIDE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_override)
    })
}

/// Rewrite the request method in place when an override is present
pub fn apply<B>(req: &mut Request<B>) {
    if let Some(method) = requested_method(req) {
        tracing::debug!(path = %req.uri().path(), %method, "Method override");
        *req.method_mut() = method;
    }
}

/// Layer installing [`MethodOverride`] in front of a service
#[derive(Clone, Copy, Debug, Default)]
pub struct MethodOverrideLayer;

impl<S> Layer<S> for MethodOverrideLayer {
    type Service = MethodOverride<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MethodOverride { inner }
    }
}

/// Service applying the override before delegating to `inner`
#[derive(Clone, Debug)]
pub struct MethodOverride<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for MethodOverride<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        apply(&mut req);
        self.inner.call(req)
    }
}

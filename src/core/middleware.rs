use axum::{
    extract::{Query, Request},
    http::{HeaderValue, Method, Uri},
    middleware::{from_fn, Next},
    response::Response,
    Router,
};
use serde::Deserialize;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

/// Wrap `router` so [`method_override`] runs before its routes are matched.
///
/// A layer added with `Router::layer` only runs after a route was picked, so
/// the inner router becomes the fallback of an outer one carrying the layer.
pub fn with_method_override(router: Router) -> Router {
    Router::new()
        .fallback_service(router)
        .layer(from_fn(method_override))
}

/// Rewrite `POST ...?_method=PUT|PATCH|DELETE` into the named method.
///
/// Browsers can only submit forms with GET or POST.
pub async fn method_override(mut req: Request, next: Next) -> Response {
    if let Some(method) = overridden_method(req.method(), req.uri()) {
        tracing::debug!("Overriding POST {} as {}", req.uri().path(), method);
        *req.method_mut() = method;
    }
    next.run(req).await
}

#[derive(Debug, Deserialize)]
struct MethodOverride {
    #[serde(rename = "_method")]
    method: Option<String>,
}

fn overridden_method(method: &Method, uri: &Uri) -> Option<Method> {
    if method != Method::POST {
        return None;
    }

    let Query(params) = Query::<MethodOverride>::try_from_uri(uri).ok()?;

    match params.method?.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

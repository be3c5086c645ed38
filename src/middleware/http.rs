//! Transport-level layers wrapped around the whole app, outside tenant resolution.
//!
//! Order (outermost first):
//! error mapping → x-request-id set/propagate → body limit → timeout → access log
//!
//! Limits come from `Config` (`REQUEST_TIMEOUT_SECONDS`, `REQUEST_BODY_LIMIT_BYTES`).

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wrap the router with the transport layers.
///
/// Tenant rejections travel back out through these too, so a 400 still
/// carries a request id and gets an access-log line.
pub fn apply(router: Router, config: &Config) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(layer_error_status))
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(RequestBodyLimitLayer::new(config.request_body_limit_bytes))
            .layer(TimeoutLayer::new(config.request_timeout))
            .layer(TraceLayer::new_for_http()),
    )
}

// timeout だけは 408、それ以外は想定外なので 500 + ログ
async fn layer_error_status(err: BoxError) -> StatusCode {
    if err.is::<Elapsed>() {
        return StatusCode::REQUEST_TIMEOUT;
    }
    tracing::error!(error = %err, "unhandled middleware error");
    StatusCode::INTERNAL_SERVER_ERROR
}

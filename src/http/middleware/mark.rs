//! Request marking middleware.
//!
//! Evaluates the active rules and writes the winning mark header before
//! handing the request to the next stage. The request is forwarded exactly
//! once whether or not a rule matched.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::observability::metrics;
use crate::rules::MarkEngine;

pub async fn mark_middleware(
    State(engine): State<Arc<MarkEngine>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match engine.apply(&mut req) {
        Some(mark) => {
            tracing::debug!(rule = %mark.rule, mark = %mark.value, path = %req.uri().path(), "Marked request");
            metrics::record_request(true);
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "Unmarked request");
            metrics::record_request(false);
        }
    }

    next.run(req).await
}

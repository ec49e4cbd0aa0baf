use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::{analytics, App, AppState, Result};

use super::{midware, routes::routes, REQUEST_ID_HEADER};

/// The core async function returning a future that will serve this application.
///
/// Accepts an `App` (the `AppState` and a bound `TcpListener`) and sets up a TraceLayer that provides console logging.
///
/// Current implementation might return an IO error from `axum::serve`
pub async fn serve(app: App) -> Result<()> {
    let App {
        app_state,
        listener,
    } = app;

    axum::serve(listener, app_router(app_state)).await?;

    Ok(())
}

/// All the routes wrapped in the middleware stack.
pub fn app_router(app_state: AppState) -> Router {
    let x_request_id: HeaderName = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace_layer = build_trace_layer();

    Router::new()
        .merge(routes(app_state.clone()))
        .layer(middleware::from_fn_with_state(
            app_state,
            analytics::inject_analytics,
        ))
        .layer(
            ServiceBuilder::new()
                // Set UUID per request
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(trace_layer)
                // The response goes through the stack from the bottom up, so the mapper
                // sees the request id header put on the response by the propagation layer.
                .layer(middleware::map_response(midware::response_mapper))
                // Propagate UUID to response, keep it last so it processes the response first!
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
}

/// A helper function that sets up the `tower_http::TraceLayer` - tracing configuration.
fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let uuid = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .map(|uuid| uuid.to_str().unwrap_or("").to_string());

            tracing::error_span!(
                "serve",
                id = uuid,
                method = req.method().to_string(),
                path = req.uri().path()
            )
        })
        .on_request(|req: &Request<Body>, _s: &Span| tracing::info!("START @ {}", req.uri()))
        .on_response(|res: &Response<Body>, latency: Duration, _s: &Span| {
            let st_code = res.status().as_u16();

            if (400..=599).contains(&st_code) {
                tracing::error!("END in: {:?} - STATUS: {st_code}", latency)
            } else {
                tracing::info!("END in: {:?} - STATUS: {st_code}", latency)
            }
        })
}

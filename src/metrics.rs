use axum::{extract::MatchedPath, extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static HTTP_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("http_requests_total", "HTTP requests processed"),
        &["method", "route", "status"],
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "HTTP request latency"),
        &["method", "route"],
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric registers once");
    histogram
});

pub static REVIEWS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new("reviews_submitted_total", "Product reviews submitted")
        .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

pub static ORDERS_PLACED: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new("orders_placed_total", "Orders placed via fast checkout")
        .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

pub static CARTS_ABANDONED: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new("carts_abandoned_total", "Carts marked abandoned by the sweeper")
        .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

pub static TRADE_IN_REQUESTS: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new("trade_in_requests_total", "Trade-in requests created")
        .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

/// Records request count and latency per matched route.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let timer = HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &route])
        .start_timer();
    let response = next.run(request).await;
    timer.observe_duration();

    HTTP_REQUESTS
        .with_label_values(&[&method, &route, response.status().as_str()])
        .inc();

    response
}

/// Prometheus text exposition of all registered metrics.
pub fn metrics_handler() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("metrics are not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposition_includes_registered_counters() {
        REVIEWS_SUBMITTED.inc();
        ORDERS_PLACED.inc();

        let body = metrics_handler().expect("encode");
        assert!(body.contains("reviews_submitted_total"));
        assert!(body.contains("orders_placed_total"));
    }
}

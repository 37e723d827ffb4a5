use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static CAPTION_READS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "caption_store_reads_total",
        "Successful caption list requests"
    )
    .expect("register reads_total")
});

pub static CAPTION_WRITES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "caption_store_writes_total",
        "Captions persisted"
    )
    .expect("register writes_total")
});

pub static VALIDATION_REJECTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "caption_store_validation_rejects_total",
        "Write requests rejected for an invalid key"
    )
    .expect("register validation_rejects_total")
});

pub static STORAGE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "caption_store_storage_errors_total",
        "Requests failed by a storage error"
    )
    .expect("register storage_errors_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

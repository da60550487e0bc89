use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram, IntCounter,
    IntCounterVec, TextEncoder,
};

pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("uploads_total", "File uploads by outcome", &["outcome"])
        .expect("uploads_total registers once")
});

pub static INVOICES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("invoices_total", "Invoice generations by outcome", &["outcome"])
        .expect("invoices_total registers once")
});

pub static STORED_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("stored_bytes_total", "Bytes written to the object store")
        .expect("stored_bytes_total registers once")
});

pub static RENDER_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!("invoice_render_seconds", "Time spent laying out and serializing invoices")
        .expect("invoice_render_seconds registers once")
});

pub async fn metrics_endpoint() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

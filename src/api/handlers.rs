use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use serde_json::json;

use super::error::{ApiError, ApiResult};
use super::metrics::{INVOICES_TOTAL, RENDER_SECONDS, STORED_BYTES, UPLOADS_TOTAL};
use super::state::ApiState;
use crate::models::{InvoicePayload, UploadBlob, UploadResponse};

pub const TOKEN_HEADER: &str = "x-upload-token";

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy"
    }))
}

/// Host to hand to the store for URL construction, if the policy allows it.
fn public_host(req: &HttpRequest, state: &ApiState) -> Option<String> {
    if !state.config.prefer_request_host {
        return None;
    }
    req.headers()
        .get(actix_web::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.to_string())
}

/// Everything read out of an upload form.
#[derive(Default)]
struct UploadForm {
    file: Option<UploadBlob>,
    token: Option<String>,
}

async fn read_upload_form(mut payload: Multipart, max_size: usize) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let disposition = field.content_disposition().clone();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let declared_size = field
            .headers()
            .get(actix_web::http::header::CONTENT_LENGTH)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let mut data = web::BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if data.len() + chunk.len() > max_size {
                return Err(ApiError::payload_too_large(format!(
                    "File too large, limit is {} bytes",
                    max_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" if form.file.is_none() => {
                let file_name = disposition.get_filename().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let mut blob = UploadBlob::new(file_name, content_type, data.freeze());
                if let Some(size) = declared_size {
                    blob = blob.with_declared_size(size);
                }
                form.file = Some(blob);
            }
            "token" => {
                form.token = String::from_utf8(data.to_vec()).ok();
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Accept a multipart upload and forward it to the object store.
pub async fn upload_file(
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let form = read_upload_form(payload, state.config.max_upload_size_bytes).await?;

    // An empty header falls back to the form field.
    let header_token = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let Some(blob) = form.file else {
        UPLOADS_TOTAL.with_label_values(&["rejected"]).inc();
        return Err(ApiError::bad_request("No file uploaded"));
    };
    let Some(token) = header_token.or(form.token.filter(|t| !t.is_empty())) else {
        UPLOADS_TOTAL.with_label_values(&["unauthorized"]).inc();
        return Err(ApiError::unauthorized("Missing or invalid token"));
    };

    let host = public_host(&req, &state);
    match state.storage.store(&blob, &token, host.as_deref()).await {
        Ok(stored) => {
            UPLOADS_TOTAL.with_label_values(&["stored"]).inc();
            STORED_BYTES.inc_by(blob.len() as u64);
            Ok(HttpResponse::Ok().json(UploadResponse::from(stored)))
        }
        Err(e) => {
            let outcome = if e.is_auth() { "unauthorized" } else { "failed" };
            UPLOADS_TOTAL.with_label_values(&[outcome]).inc();
            tracing::warn!(file_name = %blob.file_name, "Upload failed: {}", e);
            Err(e.into())
        }
    }
}

/// Render an invoice to PDF and store it with the server's own token.
pub async fn generate_invoice(
    req: HttpRequest,
    payload: web::Json<InvoicePayload>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let invoice = match payload.into_inner().validate() {
        Ok(invoice) => invoice,
        Err(e) => {
            INVOICES_TOTAL.with_label_values(&["rejected"]).inc();
            return Err(ApiError::bad_request(e.to_string()));
        }
    };

    let invoice_number = invoice.invoice_number.clone();
    let file_name = invoice.file_name();
    let timer = RENDER_SECONDS.start_timer();
    let rendered = state.renderer.clone().render_blocking(invoice).await;
    timer.observe_duration();

    let pdf = rendered.map_err(|e| {
        INVOICES_TOTAL.with_label_values(&["failed"]).inc();
        tracing::error!(invoice = %invoice_number, "Failed to render invoice: {}", e);
        ApiError::internal_server_error(e.to_string())
    })?;

    let blob = UploadBlob::new(file_name, "application/pdf", pdf);
    let host = public_host(&req, &state);
    let stored = state
        .storage
        .store(&blob, state.storage.server_token(), host.as_deref())
        .await
        .map_err(|e| {
            INVOICES_TOTAL.with_label_values(&["failed"]).inc();
            tracing::error!(invoice = %invoice_number, "Failed to store invoice: {}", e);
            ApiError::internal_server_error(e.to_string())
        })?;

    INVOICES_TOTAL.with_label_values(&["stored"]).inc();
    STORED_BYTES.inc_by(blob.len() as u64);
    tracing::info!(invoice = %invoice_number, object_key = %stored.object_key, "Invoice generated");

    Ok(HttpResponse::Ok().json(stored))
}

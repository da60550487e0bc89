use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use invoice_upload_service::api::{configure_file_route, configure_routes, json_config, ApiState, AppConfig};
use serde_json::{json, Value};

const TOKEN: &str = "test-token";
const SERVER_URL: &str = "http://localhost:8001";
const BOUNDARY: &str = "----invoice-upload-test";

struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    content_type: Option<&'a str>,
    content_length: Option<usize>,
    data: &'a [u8],
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
            ),
        }
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        if let Some(length) = part.content_length {
            body.extend_from_slice(format!("Content-Length: {}\r\n", length).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn file_part(data: &[u8]) -> Part<'_> {
    Part {
        name: "file",
        file_name: Some("hello.txt"),
        content_type: Some("text/plain"),
        content_length: None,
        data,
    }
}

fn upload_request(parts: &[Part<'_>]) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(parts))
}

fn invoice_json() -> Value {
    json!({
        "invoiceNumber": "INV-1",
        "shopName": "Corner Shop",
        "shopAddress": "1 Main St",
        "shopEmail": "shop@example.com",
        "shopPhone": "555-0100",
        "billingDetails": { "name": "Ada", "email": "ada@example.com", "phone": "555-0101", "address": "2 High St" },
        "shippingDetails": { "name": "Ada", "phone": "555-0101", "address": "2 High St", "country": "UK" },
        "items": [{ "product": "Mug", "quantity": 1, "price": 100.0, "total": 100.0 }],
        "subtotal": 100.0,
        "shipping": 0,
        "total": 100.00,
        "paymentMethod": "Card",
        "transactionId": "tx-1",
        "footerNote": "Thank you!"
    })
}

fn stored_files(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

macro_rules! app {
    ($dir:expr) => {
        app!(config: AppConfig::local($dir, SERVER_URL, TOKEN))
    };
    (config: $config:expr) => {{
        let config = $config;
        let storage = config.storage.clone();
        let limit = config.max_upload_size_bytes;
        let state = ApiState::new(config).await.unwrap();
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(json_config(limit))
                .configure(configure_routes)
                .configure(move |cfg| configure_file_route(cfg, &storage)),
        )
        .await
    }};
}

#[actix_web::test]
async fn upload_round_trips_through_file_route() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(tmp.path().join("uploads"));
    let data = b"0123456789";

    let req = upload_request(&[file_part(data)])
        .insert_header(("x-upload-token", TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with(SERVER_URL));
    assert!(body["objectKey"].as_str().unwrap().ends_with("-hello.txt"));

    let path = url.trim_start_matches(SERVER_URL);
    let req = test::TestRequest::get().uri(path).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await.as_ref(), data);
}

#[actix_web::test]
async fn token_can_come_from_form_field() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(tmp.path().join("uploads"));

    let parts = [
        Part {
            name: "token",
            file_name: None,
            content_type: None,
            content_length: None,
            data: TOKEN.as_bytes(),
        },
        file_part(b"abc"),
    ];
    let resp = test::call_service(&app, upload_request(&parts).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn empty_token_header_falls_back_to_form_field() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(tmp.path().join("uploads"));

    let parts = [
        Part {
            name: "token",
            file_name: None,
            content_type: None,
            content_length: None,
            data: TOKEN.as_bytes(),
        },
        file_part(b"abc"),
    ];
    let req = upload_request(&parts)
        .insert_header(("x-upload-token", ""))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn oversize_upload_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("uploads");
    let mut config = AppConfig::local(dir.clone(), SERVER_URL, TOKEN);
    config.max_upload_size_bytes = 8;
    let app = app!(config: config);

    let req = upload_request(&[file_part(b"0123456789")])
        .insert_header(("x-upload-token", TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("limit is 8 bytes"));
    assert!(stored_files(&dir).is_empty());
}

#[actix_web::test]
async fn part_length_beyond_received_bytes_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("uploads");
    let app = app!(dir.clone());

    let mut part = file_part(b"0123456789");
    part.content_length = Some(500);
    let req = upload_request(&[part])
        .insert_header(("x-upload-token", TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(stored_files(&dir).is_empty());
}

#[actix_web::test]
async fn wrong_token_is_rejected_and_nothing_is_stored() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("uploads");
    let app = app!(dir.clone());

    let req = upload_request(&[file_part(b"abc")])
        .insert_header(("x-upload-token", "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid upload token");
    assert!(stored_files(&dir).is_empty());
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(tmp.path().join("uploads"));

    let resp = test::call_service(&app, upload_request(&[file_part(b"abc")]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Missing or invalid token");
}

#[actix_web::test]
async fn missing_file_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(tmp.path().join("uploads"));

    let parts = [Part {
        name: "note",
        file_name: None,
        content_type: None,
        content_length: None,
        data: b"no file here",
    }];
    let req = upload_request(&parts)
        .insert_header(("x-upload-token", TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No file uploaded");
}

#[actix_web::test]
async fn generates_and_stores_invoice_pdf() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("uploads");
    let app = app!(dir.clone());

    let req = test::TestRequest::post()
        .uri("/api/generate-invoice")
        .set_json(invoice_json())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let url = body["url"].as_str().unwrap();
    assert!(url.ends_with("invoice-INV-1.pdf"));
    assert_eq!(body["namespace"], dir.display().to_string());

    let key = body["objectKey"].as_str().unwrap();
    let pdf = std::fs::read(dir.join(key)).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[actix_web::test]
async fn long_invoice_spans_several_pages() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("uploads");
    let app = app!(dir.clone());

    let mut invoice = invoice_json();
    invoice["items"] = (0..120)
        .map(|n| json!({ "product": format!("Item {}", n), "quantity": 1, "price": 1.5, "total": 1.5 }))
        .collect();
    let req = test::TestRequest::post()
        .uri("/api/generate-invoice")
        .set_json(invoice)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let pdf = std::fs::read(dir.join(body["objectKey"].as_str().unwrap())).unwrap();
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert!(doc.get_pages().len() >= 3);
}

#[actix_web::test]
async fn invoice_without_items_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("uploads");
    let app = app!(dir.clone());

    let mut invoice = invoice_json();
    invoice.as_object_mut().unwrap().remove("items");
    let req = test::TestRequest::post()
        .uri("/api/generate-invoice")
        .set_json(invoice)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Missing required invoice data"));
    assert!(stored_files(&dir).is_empty());
}

#[actix_web::test]
async fn malformed_invoice_json_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(tmp.path().join("uploads"));

    let req = test::TestRequest::post()
        .uri("/api/generate-invoice")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn health_reports_healthy() {
    let tmp = tempfile::tempdir().unwrap();
    let app = app!(tmp.path().join("uploads"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

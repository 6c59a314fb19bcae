//! API integration tests for image retrieval and error handling.
//!
//! Tests verify:
//! - Original and resized image retrieval over `/v1` and `/v2`
//! - Error cases (bad path, size out of range, missing object, store failure)
//! - HTTP response codes and headers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use image_serve::resize::NamingConfig;
use image_serve::RouterConfig;

use super::test_utils::{
    create_test_jpeg, create_test_png, image_dimensions, is_valid_jpeg, test_router,
    test_router_with, CountingCodec, TrackingMockStore, OBJECT_TIME_HTTP,
};

async fn get(router: axum::Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.oneshot(request).await.unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

// =============================================================================
// Original Retrieval
// =============================================================================

#[tokio::test]
async fn test_original_retrieval() {
    let png = create_test_png(40, 20);
    let store = TrackingMockStore::new().with_object("photos", "cat.png", png.clone(), "image/png");
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router, "/v1/photos/cat.png").await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers.get("content-type").unwrap(), "image/png");
    assert_eq!(
        headers.get("content-length").unwrap(),
        png.len().to_string().as_str()
    );
    assert_eq!(headers.get("cache-control").unwrap(), "public, max-age=3600");
    assert_eq!(headers.get("last-modified").unwrap(), OBJECT_TIME_HTTP);
    assert_eq!(headers.get("x-image-cache").unwrap(), "source");

    // Streamed in chunks, reassembled byte for byte
    assert_eq!(body_bytes(response).await.as_ref(), png.as_slice());

    assert_eq!(codec.decodes(), 0);
    assert_eq!(store.write_calls(), 0);
}

#[tokio::test]
async fn test_explicit_zero_size_is_original() {
    let png = create_test_png(16, 16);
    let store = TrackingMockStore::new().with_object("photos", "cat.png", png.clone(), "image/png");
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router, "/v2/photos/cat.png/=s0").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-image-cache").unwrap(), "source");
    assert_eq!(body_bytes(response).await.as_ref(), png.as_slice());
    assert_eq!(store.write_calls(), 0);
}

#[tokio::test]
async fn test_v1_and_v2_are_equivalent() {
    let png = create_test_png(30, 10);
    let store = TrackingMockStore::new().with_object("photos", "cat.png", png, "image/png");
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let v1 = get(router.clone(), "/v1/photos/cat.png/=s15").await;
    assert_eq!(v1.status(), StatusCode::OK);
    let v1_body = body_bytes(v1).await;

    let v2 = get(router, "/v2/photos/cat.png/=s15").await;
    assert_eq!(v2.status(), StatusCode::OK);
    assert_eq!(v2.headers().get("x-image-cache").unwrap(), "hit");
    assert_eq!(body_bytes(v2).await, v1_body);
}

// =============================================================================
// Resized Retrieval
// =============================================================================

#[tokio::test]
async fn test_resized_jpeg() {
    let jpeg = create_test_jpeg(400, 200);
    let store = TrackingMockStore::new().with_object("photos", "cat.jpg", jpeg, "image/jpeg");
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router, "/v1/photos/cat.jpg/=s200").await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers.get("content-type").unwrap(), "image/jpeg");
    assert_eq!(headers.get("x-image-cache").unwrap(), "miss");
    assert_eq!(headers.get("last-modified").unwrap(), OBJECT_TIME_HTTP);
    assert!(
        !headers.contains_key("content-length"),
        "fresh renditions do not advertise a length"
    );

    let body = body_bytes(response).await;
    assert!(is_valid_jpeg(&body), "Response should be a valid JPEG");
    assert_eq!(image_dimensions(&body), (200, 100));
}

#[tokio::test]
async fn test_resized_portrait_png() {
    let png = create_test_png(120, 480);
    let store = TrackingMockStore::new().with_object("photos", "tall.png", png, "image/png");
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router, "/v2/photos/tall.png/=s240").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");

    let body = body_bytes(response).await;
    assert_eq!(image_dimensions(&body), (60, 240));
}

#[tokio::test]
async fn test_cache_max_age_zero_omits_header() {
    let png = create_test_png(8, 8);
    let store = TrackingMockStore::new().with_object("photos", "cat.png", png, "image/png");
    let codec = CountingCodec::new();
    let router = test_router_with(
        &store,
        &codec,
        NamingConfig::new(),
        RouterConfig::new().with_cache_max_age(0),
    );

    let response = get(router, "/v1/photos/cat.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("cache-control"));
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_missing_object_returns_404() {
    let store = TrackingMockStore::new();
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router.clone(), "/v1/photos/missing.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(response).await.as_ref(), b"not found");

    let response = get(router, "/v1/photos/missing.png/=s100").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(store.write_calls(), 0);
    assert_eq!(store.object_count(), 0);
    assert_eq!(codec.decodes(), 0);
}

#[tokio::test]
async fn test_size_out_of_range_returns_400() {
    let store = TrackingMockStore::new().with_object(
        "photos",
        "cat.png",
        create_test_png(8, 8),
        "image/png",
    );
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    for uri in ["/v1/photos/cat.png/=s5000", "/v2/photos/cat.png/=s2560"] {
        let response = get(router.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(
            body_bytes(response).await.as_ref(),
            b"Size ranges from 0 to 2560"
        );
    }

    // Rejected before the store is touched
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_largest_size_is_accepted() {
    let store = TrackingMockStore::new().with_object(
        "photos",
        "cat.png",
        create_test_png(40, 1),
        "image/png",
    );
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router, "/v1/photos/cat.png/=s2559").await;
    assert_eq!(response.status(), StatusCode::OK);
    let (width, _) = image_dimensions(&body_bytes(response).await);
    assert_eq!(width, 2559);
}

#[tokio::test]
async fn test_malformed_paths_return_400() {
    let store = TrackingMockStore::new();
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    for uri in [
        "/v1/",
        "/v1/onlybucket",
        "/v2/photos/",
        "/v1/photos/cat.png/thumbnail",
        "/v1/photos/cat.png/=s99999999999999999999999",
    ] {
        let response = get(router.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
    }

    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_unknown_version_is_not_routed() {
    let store = TrackingMockStore::new().with_object(
        "photos",
        "cat.png",
        create_test_png(8, 8),
        "image/png",
    );
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router, "/v3/photos/cat.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_store_failure_returns_empty_500() {
    let store = TrackingMockStore::new()
        .with_object("photos", "cat.png", create_test_png(8, 8), "image/png")
        .failing("photos", "cat.png");
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router, "/v1/photos/cat.png").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_undecodable_source_returns_500_and_stores_nothing() {
    let store = TrackingMockStore::new().with_object(
        "photos",
        "notes.txt",
        b"definitely not an image".to_vec(),
        "text/plain",
    );
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router.clone(), "/v1/photos/notes.txt/=s100").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(store.write_calls(), 0);

    // The original is still served as-is
    let response = get(router, "/v1/photos/notes.txt").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "text/plain");
}

// =============================================================================
// Health Check
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let store = TrackingMockStore::new();
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let response = get(router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
    assert_eq!(store.total_calls(), 0);
}

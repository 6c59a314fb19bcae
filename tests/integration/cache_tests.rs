//! Rendition cache integration tests.
//!
//! Tests verify:
//! - A miss renders once and stores the rendition under its derived name
//! - Later requests are served from the store without touching the codec
//! - Distinct sizes get distinct renditions
//! - The override bucket setting

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use image_serve::resize::NamingConfig;
use image_serve::RouterConfig;

use super::test_utils::{
    create_test_jpeg, create_test_png, image_dimensions, test_router, test_router_with,
    CountingCodec, TrackingMockStore,
};

async fn fetch(router: &axum::Router, uri: &str) -> (StatusCode, String, bytes::Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cache = response
        .headers()
        .get("x-image-cache")
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, cache, body)
}

// =============================================================================
// Miss Then Hit
// =============================================================================

#[tokio::test]
async fn test_miss_stores_rendition() {
    let store = TrackingMockStore::new().with_object(
        "photos",
        "cat.png",
        create_test_png(400, 200),
        "image/png",
    );
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let (status, cache, body) = fetch(&router, "/v1/photos/cat.png/=s200").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache, "miss");

    let stored = store
        .get("alter-photos", "cat.png_s200")
        .expect("rendition should be stored under alter-{bucket}/{key}_s{size}");
    assert_eq!(body, stored);
    assert_eq!(image_dimensions(&stored), (200, 100));

    assert_eq!(store.write_calls(), 1);
    assert_eq!(codec.decodes(), 1);
    assert_eq!(codec.encodes(), 1);
}

#[tokio::test]
async fn test_hit_skips_codec() {
    let store = TrackingMockStore::new().with_object(
        "photos",
        "cat.jpg",
        create_test_jpeg(300, 300),
        "image/jpeg",
    );
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let (_, first_cache, first_body) = fetch(&router, "/v1/photos/cat.jpg/=s64").await;
    assert_eq!(first_cache, "miss");
    let reads_after_miss = store.read_calls();

    for _ in 0..3 {
        let (status, cache, body) = fetch(&router, "/v1/photos/cat.jpg/=s64").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache, "hit");
        assert_eq!(body, first_body);
    }

    // Hits stream the rendition; the source is never read again
    assert_eq!(codec.decodes(), 1);
    assert_eq!(store.write_calls(), 1);
    assert_eq!(store.read_calls(), reads_after_miss);
}

#[tokio::test]
async fn test_pre_existing_rendition_is_served_verbatim() {
    let cached = b"rendition written by another replica".to_vec();
    let store = TrackingMockStore::new()
        .with_object("photos", "cat.png", create_test_png(64, 64), "image/png")
        .with_object("alter-photos", "cat.png_s32", cached.clone(), "image/png");
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let request = Request::builder()
        .uri("/v2/photos/cat.png/=s32")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-image-cache").unwrap(), "hit");
    assert_eq!(
        response.headers().get("content-length").unwrap(),
        cached.len().to_string().as_str()
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.as_ref(), cached.as_slice());
    assert_eq!(codec.decodes(), 0);
}

#[tokio::test]
async fn test_source_is_never_modified() {
    let png = create_test_png(50, 50);
    let store = TrackingMockStore::new().with_object("photos", "cat.png", png.clone(), "image/png");
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    for size in [10, 20, 30] {
        let (status, _, _) = fetch(&router, &format!("/v1/photos/cat.png/=s{}", size)).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(store.get("photos", "cat.png").unwrap().as_ref(), png.as_slice());
}

// =============================================================================
// Distinct Sizes
// =============================================================================

#[tokio::test]
async fn test_each_size_has_its_own_rendition() {
    let store = TrackingMockStore::new().with_object(
        "photos",
        "cat.png",
        create_test_png(256, 128),
        "image/png",
    );
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    for size in [16u32, 32, 64] {
        let (status, cache, _) = fetch(&router, &format!("/v1/photos/cat.png/=s{}", size)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache, "miss");

        let stored = store
            .get("alter-photos", &format!("cat.png_s{}", size))
            .unwrap();
        assert_eq!(image_dimensions(&stored), (size, size / 2));
    }

    // Source plus three renditions
    assert_eq!(store.object_count(), 4);
    assert_eq!(codec.decodes(), 3);
}

#[tokio::test]
async fn test_original_request_creates_no_rendition() {
    let store = TrackingMockStore::new().with_object(
        "photos",
        "cat.png",
        create_test_png(32, 32),
        "image/png",
    );
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    fetch(&router, "/v1/photos/cat.png").await;
    fetch(&router, "/v1/photos/cat.png/=s0").await;

    assert_eq!(store.object_count(), 1);
    assert_eq!(store.write_calls(), 0);
}

// =============================================================================
// Override Bucket
// =============================================================================

#[tokio::test]
async fn test_override_bucket() {
    let store = TrackingMockStore::new().with_object(
        "photos",
        "cat.png",
        create_test_png(40, 40),
        "image/png",
    );
    let codec = CountingCodec::new();
    let router = test_router_with(
        &store,
        &codec,
        NamingConfig::with_alter_bucket("renditions"),
        RouterConfig::new(),
    );

    let (status, _, body) = fetch(&router, "/v1/photos/cat.png/=s20").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(store.get("renditions", "cat.png_s20").unwrap(), body);
    assert!(store.get("alter-photos", "cat.png_s20").is_none());
}

#[tokio::test]
async fn test_failed_rendition_write_returns_500() {
    let store = TrackingMockStore::new()
        .with_object("photos", "cat.png", create_test_png(40, 40), "image/png")
        .read_only();
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let (status, _, body) = fetch(&router, "/v1/photos/cat.png/=s20").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert_eq!(codec.decodes(), 1);
    assert_eq!(store.write_calls(), 1);
    assert!(store.get("alter-photos", "cat.png_s20").is_none());

    // Originals are unaffected
    let (status, cache, _) = fetch(&router, "/v1/photos/cat.png").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache, "source");
}

#[tokio::test]
async fn test_failing_rendition_lookup_returns_500() {
    let store = TrackingMockStore::new()
        .with_object("photos", "cat.png", create_test_png(40, 40), "image/png")
        .failing("alter-photos", "cat.png_s20");
    let codec = CountingCodec::new();
    let router = test_router(&store, &codec);

    let (status, _, body) = fetch(&router, "/v1/photos/cat.png/=s20").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert_eq!(codec.decodes(), 0);
}

//! End-to-end tests for the WFS router.
//!
//! Requests go through the full axum stack with `oneshot`. The store wraps
//! the seeded in-memory SQLite database and records every call, so the
//! tests can also check which queries reached the data source.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use feature_store::{FeatureStore, SqliteFeatureStore};
use test_utils::{seeded_pool, SampleFeature, PARK_COUNT};
use wfs_api::{config::WfsConfig, router, state::AppState};
use wfs_common::{WfsError, WfsResult};
use wfs_protocol::{FeatureQuery, FeatureRow, SqlValue};

// ============================================================================
// Test stores
// ============================================================================

#[derive(Default)]
struct Calls {
    refreshes: Vec<bool>,
    fetches: Vec<FeatureQuery>,
    counts: Vec<FeatureQuery>,
}

struct RecordingStore {
    inner: SqliteFeatureStore,
    calls: Mutex<Calls>,
}

impl RecordingStore {
    async fn seeded() -> Self {
        Self {
            inner: SqliteFeatureStore::from_pool(seeded_pool().await),
            calls: Mutex::new(Calls::default()),
        }
    }
}

#[async_trait]
impl FeatureStore for RecordingStore {
    async fn refresh(&self, force_full: bool) -> WfsResult<()> {
        self.calls.lock().unwrap().refreshes.push(force_full);
        self.inner.refresh(force_full).await
    }

    async fn query_feature_package(&self, query: &FeatureQuery) -> WfsResult<Vec<FeatureRow>> {
        self.calls.lock().unwrap().fetches.push(query.clone());
        self.inner.query_feature_package(query).await
    }

    async fn count_features(&self, query: &FeatureQuery) -> WfsResult<u64> {
        self.calls.lock().unwrap().counts.push(query.clone());
        self.inner.count_features(query).await
    }

    async fn ping(&self) -> WfsResult<()> {
        self.inner.ping().await
    }
}

struct FailingStore;

#[async_trait]
impl FeatureStore for FailingStore {
    async fn refresh(&self, _force_full: bool) -> WfsResult<()> {
        Ok(())
    }

    async fn query_feature_package(&self, _query: &FeatureQuery) -> WfsResult<Vec<FeatureRow>> {
        Err(WfsError::DataSource("disk I/O error at /srv/data/features.gpkg".into()))
    }

    async fn count_features(&self, _query: &FeatureQuery) -> WfsResult<u64> {
        Err(WfsError::DataSource("disk I/O error".into()))
    }

    async fn ping(&self) -> WfsResult<()> {
        Err(WfsError::DataSource("database is locked".into()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn app(store: Arc<dyn FeatureStore>, config: WfsConfig) -> Router {
    let state = AppState::with_store(store, config, "127.0.0.1:8084".to_string()).unwrap();
    router(Arc::new(state))
}

async fn recording_app() -> (Arc<RecordingStore>, Router) {
    let store = Arc::new(RecordingStore::seeded().await);
    let app = app(store.clone(), WfsConfig::default());
    (store, app)
}

struct TestResponse {
    status: StatusCode,
    content_type: String,
    body: String,
}

async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

async fn get(app: Router, uri: &str) -> TestResponse {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

fn attr<'a>(xml: &'a str, name: &str) -> &'a str {
    let key = format!("{}=\"", name);
    let start = xml.find(&key).unwrap() + key.len();
    let len = xml[start..].find('"').unwrap();
    &xml[start..start + len]
}

// ============================================================================
// Count semantics
// ============================================================================

#[tokio::test]
async fn test_without_count_matched_equals_returned() {
    let (store, app) = recording_app().await;

    let res = get(app, "/wfs?service=WFS&request=GetFeature&typeNames=parks").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.content_type, "text/xml");
    assert_eq!(attr(&res.body, "numberReturned"), PARK_COUNT.to_string());
    assert_eq!(attr(&res.body, "numberMatched"), PARK_COUNT.to_string());

    let calls = store.calls.lock().unwrap();
    assert_eq!(calls.refreshes, vec![false]);
    assert_eq!(calls.fetches.len(), 1);
    assert!(calls.counts.is_empty(), "no total query without a count");
}

#[tokio::test]
async fn test_count_limits_returned_but_not_matched() {
    let (store, app) = recording_app().await;

    let res = get(app, "/wfs?typeNames=parks&count=5").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(attr(&res.body, "numberReturned"), "5");
    assert_eq!(attr(&res.body, "numberMatched"), PARK_COUNT.to_string());
    assert_eq!(res.body.matches("<wfs:member>").count(), 5);

    let calls = store.calls.lock().unwrap();
    assert_eq!(calls.fetches.len(), 1);
    assert_eq!(calls.counts.len(), 1);
}

#[tokio::test]
async fn test_total_query_never_sees_limit() {
    let (store, app) = recording_app().await;

    get(app, "/wfs?typeNames=parks,trails&bbox=0,0,100000,100000&count=3").await;

    let calls = store.calls.lock().unwrap();
    let fetch = &calls.fetches[0];
    let total = &calls.counts[0];

    assert!(fetch.sql.contains("LIMIT ?7"));
    assert_eq!(fetch.param("param6"), Some(&SqlValue::Integer(3)));

    assert!(!total.sql.contains("LIMIT"));
    assert_eq!(total.params.len(), 6);
    assert!(total.param("param6").is_none());
    assert_eq!(total.params[..], fetch.params[..6]);
}

#[tokio::test]
async fn test_max_count_caps_request() {
    let store = Arc::new(RecordingStore::seeded().await);
    let config = WfsConfig {
        max_count: Some(2),
        ..WfsConfig::default()
    };
    let app = app(store.clone(), config);

    let res = get(app, "/wfs?typeNames=parks&count=10").await;

    assert_eq!(attr(&res.body, "numberReturned"), "2");
    assert_eq!(attr(&res.body, "numberMatched"), PARK_COUNT.to_string());
}

// ============================================================================
// GML encoding
// ============================================================================

#[tokio::test]
async fn test_gml_epsg4326_scenario() {
    let (_store, app) = recording_app().await;

    let res = get(
        app,
        "/wfs?typeNames=parks&bbox=0,0,100000,100000&count=5&outputFormat=text/xml&srsName=EPSG:4326",
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(attr(&res.body, "numberReturned"), "5");
    assert_eq!(attr(&res.body, "numberMatched"), "12");
    assert_eq!(res.body.matches("<parks gml:id=\"Point.").count(), 5);
    assert_eq!(
        res.body
            .matches("srsName=\"urn:ogc:def:crs:EPSG::4326\"")
            .count(),
        5
    );

    let positions = (1..=12).map(|id| {
        let park = SampleFeature::park(id);
        format!("<gml:pos>{} {}</gml:pos>", park.latitude, park.longitude)
    });
    assert_eq!(positions.filter(|pos| res.body.contains(pos)).count(), 5);
}

#[tokio::test]
async fn test_gml_default_crs_and_exclusions() {
    let (_store, app) = recording_app().await;

    let res = get(app, "/wfs/?TYPENAMES=parks&COUNT=1").await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("srsName=\"urn:ogc:def:crs:EPSG::3857\""));
    assert!(!res.body.contains("<id>"));
    assert!(!res.body.contains("<featureset>"));
    assert!(res.body.contains("<viewerUrl>http://127.0.0.1:8084/viewer#camera="));
    assert!(res.body.contains("<name>Park "));
}

#[tokio::test]
async fn test_unsupported_crs_is_server_error_even_without_rows() {
    let (_store, app) = recording_app().await;

    let res = get(app, "/wfs?typeNames=nothing_here&srsName=EPSG:5070").await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.content_type, "text/xml");
    assert!(res.body.contains("exceptionCode=\"NoApplicableCode\""));
    assert!(!res.body.contains("<wfs:FeatureCollection"));
}

#[tokio::test]
async fn test_gml_rejects_column_that_is_not_an_element_name() {
    let pool = seeded_pool().await;
    sqlx::query("CREATE VIEW spaced AS SELECT *, elevation AS \"speed limit\" FROM features")
        .execute(&pool)
        .await
        .unwrap();
    let store = Arc::new(SqliteFeatureStore::from_pool(pool));
    let config = WfsConfig {
        feature_view: "spaced".to_string(),
        ..WfsConfig::default()
    };

    let res = get(app(store.clone(), config.clone()), "/wfs?typeNames=parks").await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body.contains("exceptionCode=\"NoApplicableCode\""));
    assert!(!res.body.contains("<speed"));

    let config = WfsConfig {
        excluded_columns: vec!["id".to_string(), "speed limit".to_string()],
        ..config
    };
    let res = get(app(store, config), "/wfs?typeNames=parks&count=2").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(attr(&res.body, "numberReturned"), "2");
}

// ============================================================================
// GeoJSON encoding
// ============================================================================

#[tokio::test]
async fn test_geojson_default_uses_projected_coordinates() {
    let (_store, app) = recording_app().await;

    let res = get(app, "/wfs?typeNames=trails&outputFormat=application/json").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.content_type, "application/json");

    let json: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(json["type"], "FeatureCollection");
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 3);

    for feature in features {
        let id: i64 = feature["properties"]["id"].as_str().unwrap().parse().unwrap();
        let trail = SampleFeature::trail(id);
        assert_eq!(feature["geometry"]["coordinates"][0], trail.x);
        assert_eq!(feature["geometry"]["coordinates"][1], trail.y);
        assert_eq!(feature["properties"]["GmlID"], format!("Point.{}", id));
        assert!(feature["properties"].get("geom").is_none());

        let properties = feature["properties"].as_object().unwrap();
        let keys: Vec<&str> = properties.keys().map(String::as_str).collect();
        assert_eq!(&keys[..3], &["GmlID", "viewerUrl", "id"]);
    }
}

#[tokio::test]
async fn test_geojson_epsg4326_uses_lon_lat() {
    let (_store, app) = recording_app().await;

    let res = get(app, "/wfs?typeNames=trails&outputFormat=json&srsName=EPSG:4326").await;
    let json: Value = serde_json::from_str(&res.body).unwrap();

    for feature in json["features"].as_array().unwrap() {
        let id: i64 = feature["properties"]["id"].as_str().unwrap().parse().unwrap();
        let trail = SampleFeature::trail(id);
        assert_eq!(feature["geometry"]["coordinates"][0], trail.longitude);
        assert_eq!(feature["geometry"]["coordinates"][1], trail.latitude);
    }
}

#[tokio::test]
async fn test_geojson_ignores_unencodable_crs() {
    let (_store, app) = recording_app().await;

    let res = get(app, "/wfs?typeNames=trails&outputFormat=geojson&srsName=EPSG:3413").await;

    assert_eq!(res.status, StatusCode::OK);
    let json: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(json["features"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_viewer_url_follows_forwarded_headers() {
    let (_store, app) = recording_app().await;

    let request = Request::builder()
        .uri("/wfs?typeNames=trails&outputFormat=json&count=1")
        .header("host", "wfs:8084")
        .header("x-forwarded-proto", "https")
        .header("x-forwarded-host", "maps.example.com")
        .body(Body::empty())
        .unwrap();
    let res = send(app, request).await;

    let json: Value = serde_json::from_str(&res.body).unwrap();
    let viewer_url = json["features"][0]["properties"]["viewerUrl"].as_str().unwrap();
    assert!(viewer_url.starts_with("https://maps.example.com/viewer#camera="));
    assert!(viewer_url.ends_with(",18.00z"));
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_validation_errors_are_400_and_skip_the_store() {
    let cases = [
        ("/wfs?service=WFS&request=GetFeature", "MissingParameterValue"),
        ("/wfs?typeNames=parks&count=0", "InvalidParameterValue"),
        ("/wfs?typeNames=parks&bbox=10,10,0,0", "InvalidParameterValue"),
        ("/wfs?typeNames=parks&srsName=EPSG:1", "InvalidParameterValue"),
        ("/wfs?typeNames=parks&outputFormat=image/png", "InvalidParameterValue"),
        ("/wfs?typeNames=%3Cscript%3E", "InvalidParameterValue"),
        ("/wfs?typeNames=parks&request=DescribeFeatureType", "OperationNotSupported"),
    ];

    for (uri, code) in cases {
        let (store, app) = recording_app().await;
        let res = get(app, uri).await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(res.content_type, "text/xml", "{}", uri);
        assert!(res.body.contains("<ows:ExceptionReport"), "{}", uri);
        assert!(
            res.body.contains(&format!("exceptionCode=\"{}\"", code)),
            "{}: {}",
            uri,
            res.body
        );

        let calls = store.calls.lock().unwrap();
        assert!(calls.refreshes.is_empty() && calls.fetches.is_empty(), "{}", uri);
    }
}

#[tokio::test]
async fn test_data_source_failure_is_500_without_details() {
    let app = app(Arc::new(FailingStore), WfsConfig::default());

    let res = get(app, "/wfs?typeNames=parks").await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.body.contains("exceptionCode=\"NoApplicableCode\""));
    assert!(!res.body.contains("/srv/data"));
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_ready_and_metrics() {
    let (_store, app) = recording_app().await;

    let res = get(app.clone(), "/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("\"status\":\"ok\""));

    let res = get(app.clone(), "/ready").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("\"ready\":true"));

    let res = get(app, "/metrics").await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_not_ready_when_store_fails() {
    let app = app(Arc::new(FailingStore), WfsConfig::default());

    let res = get(app, "/ready").await;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(res.body.contains("\"ready\":false"));
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cli::server::{router, AppState, CatalogResponse, PredictResponse};
use doctext_core::catalog::SymptomCatalog;
use doctext_core::classifier::LogisticRegression;
use doctext_core::config::ClassificationConfig;
use doctext_core::encoder::TextEncoder;
use doctext_core::{DiagnosisContext, DiagnosisError, Stage};
use providers::summary::Summarizer;
use providers::{ContentPart, GenerateResponse, GenerativeProvider, ProviderError};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Keyword encoder: one axis per keyword, counted in the text.
struct KeywordEncoder;

const AXES: [&str; 3] = ["fever", "cough", "rash"];

impl TextEncoder for KeywordEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, DiagnosisError> {
        if text.contains("explode") {
            return Err(DiagnosisError::prediction(Stage::Encoder, "encoder crashed"));
        }
        let lower = text.to_lowercase();
        Ok(AXES.iter().map(|k| lower.matches(k).count() as f32).collect())
    }
    fn dimension(&self) -> usize {
        AXES.len()
    }
    fn model_name(&self) -> &str {
        "keyword"
    }
}

struct SlowEncoder;

impl TextEncoder for SlowEncoder {
    fn encode(&self, _text: &str) -> Result<Vec<f32>, DiagnosisError> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(vec![1.0, 0.0, 0.0])
    }
    fn dimension(&self) -> usize {
        3
    }
    fn model_name(&self) -> &str {
        "slow"
    }
}

struct EchoProvider;

#[async_trait::async_trait]
impl GenerativeProvider for EchoProvider {
    async fn generate(&self, parts: &[ContentPart]) -> Result<GenerateResponse, ProviderError> {
        Ok(GenerateResponse {
            text: Some(format!("{} part(s)", parts.len())),
            raw: serde_json::json!({}),
        })
    }
}

fn state_with(encoder: Arc<dyn TextEncoder>, timeout: Duration) -> AppState {
    let catalog = SymptomCatalog::new(
        vec!["fever".into(), "cough".into(), "rash".into()],
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ],
    )
    .unwrap();
    let model = LogisticRegression::new(
        vec!["Allergy".into(), "Cold".into(), "Flu".into()],
        vec![vec![0.0, 0.0, 2.0], vec![0.0, 2.0, 0.0], vec![2.0, 1.0, 0.0]],
        vec![0.0, 0.0, 0.5],
    )
    .unwrap();
    let ctx = DiagnosisContext::new(
        catalog,
        encoder,
        Arc::new(model),
        ClassificationConfig::default(),
    )
    .unwrap();
    AppState {
        ctx: Arc::new(ctx),
        summarizer: Summarizer::new(Arc::new(EchoProvider)),
        request_timeout: timeout,
        cors: true,
    }
}

fn state() -> AppState {
    state_with(Arc::new(KeywordEncoder), Duration::from_secs(5))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn home_reports_running() {
    let resp = router(state())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await["message"].as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn predict_returns_label() {
    let resp = router(state())
        .oneshot(post_json(
            "/predict",
            serde_json::json!({"text": "high fever since yesterday"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: PredictResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.prediction, "Flu");
}

#[tokio::test]
async fn analyze_lists_matches() {
    let resp = router(state())
        .oneshot(post_json(
            "/analyze",
            serde_json::json!({"text": "itchy rash", "threshold": 0.5}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["label"], "Allergy");
    assert_eq!(body["vector"], serde_json::json!([0, 0, 1]));
    assert_eq!(body["matches"][0]["symptom"], "rash");
}

#[tokio::test]
async fn missing_text_is_bad_request() {
    let resp = router(state())
        .oneshot(post_json("/predict", serde_json::json!({"threshold": 0.3})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["kind"], "validation");
}

#[tokio::test]
async fn encoder_failure_is_prediction_error() {
    let resp = router(state())
        .oneshot(post_json("/predict", serde_json::json!({"text": "explode"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["kind"], "prediction");
    assert_eq!(body["stage"], "encoder");
}

#[tokio::test]
async fn slow_pipeline_times_out() {
    let app = router(state_with(Arc::new(SlowEncoder), Duration::from_millis(20)));
    let resp = app
        .oneshot(post_json("/predict", serde_json::json!({"text": "fever"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_json(resp).await["kind"], "timeout");
}

#[tokio::test]
async fn catalog_describes_context() {
    let resp = router(state())
        .oneshot(Request::builder().uri("/catalog").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: CatalogResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.symptoms, vec!["fever", "cough", "rash"]);
    assert_eq!(body.dimension, 3);
    assert_eq!(body.encoder, "keyword");
    assert_eq!(body.threshold, 0.45);
}

fn multipart(field: &str, files: &[(&str, &str, &str)]) -> Request<Body> {
    let boundary = "XBOUNDARYX";
    let mut body = String::new();
    for (name, content_type, content) in files {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    Request::builder()
        .method("POST")
        .uri(match field {
            "files" => "/summarize_all/",
            _ => "/summarize/",
        })
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn summarize_uses_collaborator() {
    let resp = router(state())
        .oneshot(multipart("file", &[("note.txt", "text/plain", "cough at night")]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["summary"], "1 part(s)");
    assert!(body.get("full_response").is_some());
    assert!(body.get("raw").is_none());
}

#[tokio::test]
async fn medicines_answer_carries_raw_payload() {
    let mut req = multipart("file", &[("rx.png", "image/png", "png-bytes")]);
    *req.uri_mut() = "/extract_medicines/".parse().unwrap();
    let resp = router(state()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["summary"], "2 part(s)");
    assert!(body.get("raw").is_some());
    assert!(body.get("full_response").is_none());
}

#[tokio::test]
async fn summarize_all_merges_files() {
    let resp = router(state())
        .oneshot(multipart(
            "files",
            &[
                ("a.txt", "text/plain", "fever"),
                ("b.png", "image/png", "png-bytes"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["all_summaries"], serde_json::json!(["1 part(s)", "2 part(s)"]));
    assert_eq!(body["summary"], "1 part(s)");
}

#[tokio::test]
async fn medicines_reject_non_images() {
    let mut req = multipart("file", &[("rx.txt", "text/plain", "amoxicillin")]);
    *req.uri_mut() = "/extract_medicines/".parse().unwrap();
    let resp = router(state()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body_json(resp).await["kind"], "summarization");
}

fn preflight() -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/summarize/")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let resp = router(state()).oneshot(preflight()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert!(resp.headers().contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn cors_can_be_switched_off() {
    let mut state = state();
    state.cors = false;
    let resp = router(state).oneshot(preflight()).await.unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

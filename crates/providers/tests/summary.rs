use bytes::Bytes;
use providers::summary::{SummaryError, Summarizer, Upload};
use providers::{ContentPart, GenerateResponse, GenerativeProvider, ProviderError, ProviderRegistry};
use std::sync::{Arc, Mutex};

/// Records prompts and answers with a canned reply; fails on prompts that
/// contain "BROKEN".
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Vec<ContentPart>>>,
}

#[async_trait::async_trait]
impl GenerativeProvider for Recorder {
    async fn generate(&self, parts: &[ContentPart]) -> Result<GenerateResponse, ProviderError> {
        self.calls.lock().unwrap().push(parts.to_vec());
        let prompt = match &parts[0] {
            ContentPart::Text(t) => t.clone(),
            _ => String::new(),
        };
        if prompt.contains("BROKEN") {
            return Err(ProviderError::RequestFailed("status 500".into()));
        }
        let n = self.calls.lock().unwrap().len();
        Ok(GenerateResponse {
            text: Some(format!(" summary {n} ")),
            raw: serde_json::json!({"call": n}),
        })
    }
}

fn upload(name: &str, content_type: &str, data: &'static [u8]) -> Upload {
    Upload {
        filename: name.to_string(),
        content_type: Some(content_type.to_string()),
        data: Bytes::from_static(data),
    }
}

#[tokio::test]
async fn text_file_is_sent_as_prompt() {
    let recorder = Arc::new(Recorder::default());
    let summarizer = Summarizer::new(recorder.clone());
    let out = summarizer
        .summarize(&upload("note.txt", "text/plain", b"BP 140/90, mild headache"))
        .await
        .unwrap();
    assert_eq!(out.summary, " summary 1 ");

    let calls = recorder.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    match &calls[0][..] {
        [ContentPart::Text(prompt)] => assert!(prompt.ends_with("BP 140/90, mild headache")),
        other => panic!("unexpected parts {other:?}"),
    }
}

#[tokio::test]
async fn image_file_is_sent_inline() {
    let recorder = Arc::new(Recorder::default());
    let summarizer = Summarizer::new(recorder.clone());
    summarizer
        .summarize(&upload("scan.png", "image/png", b"\x89PNG"))
        .await
        .unwrap();

    let calls = recorder.calls.lock().unwrap();
    match &calls[0][..] {
        [ContentPart::Text(_), ContentPart::InlineData { mime_type, data }] => {
            assert_eq!(mime_type, "image/png");
            assert_eq!(&data[..], b"\x89PNG");
        }
        other => panic!("unexpected parts {other:?}"),
    }
}

#[tokio::test]
async fn medicines_require_an_image() {
    let summarizer = Summarizer::new(Arc::new(Recorder::default()));
    let err = summarizer
        .extract_medicines(&upload("rx.pdf", "application/pdf", b"%PDF"))
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::UnsupportedMedia(_)));

    let out = summarizer
        .extract_medicines(&upload("rx.jpg", "image/jpeg", b"jpeg"))
        .await
        .unwrap();
    assert_eq!(out.raw["call"], 1);
}

#[tokio::test]
async fn batch_skips_empty_and_failed_files_then_merges() {
    let recorder = Arc::new(Recorder::default());
    let summarizer = Summarizer::new(recorder.clone());
    let files = vec![
        upload("a.txt", "text/plain", b"fever for three days"),
        upload("empty.txt", "text/plain", b""),
        upload("bad.txt", "text/plain", b"BROKEN"),
        upload("b.png", "image/png", b"img"),
    ];
    let out = summarizer.summarize_all(&files).await.unwrap();
    // a.txt -> call 1, bad.txt -> call 2 (failed), b.png -> call 3, merge -> call 4
    assert_eq!(out.all_summaries, vec!["summary 1", "summary 3"]);
    assert_eq!(out.summary, " summary 4 ");

    let calls = recorder.calls.lock().unwrap();
    match &calls[3][..] {
        [ContentPart::Text(prompt)] => assert!(prompt.ends_with("summary 1\nsummary 3")),
        other => panic!("unexpected parts {other:?}"),
    }
}

#[tokio::test]
async fn batch_with_nothing_usable_is_an_error() {
    let summarizer = Summarizer::new(Arc::new(Recorder::default()));
    let err = summarizer
        .summarize_all(&[upload("empty.txt", "text/plain", b"")])
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::NothingToSummarize));
}

#[tokio::test]
async fn noop_provider_reports_not_implemented() {
    let registry = ProviderRegistry::new()
        .with_generator("noop", Arc::new(providers::noop::NoopProvider))
        .set_preferred("noop");
    let summarizer = Summarizer::new(registry.generator(None).unwrap());
    let err = summarizer
        .summarize(&upload("note.txt", "text/plain", b"hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::Provider(ProviderError::NotImplemented)));
    assert!(registry.generator(Some("gemini")).is_err());
}

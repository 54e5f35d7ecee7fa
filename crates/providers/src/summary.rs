//! Medical document summarization on top of a generative provider.
//!
//! Independent of the diagnosis pipeline: nothing here touches the symptom
//! catalog or classifier.

use crate::{ContentPart, GenerateResponse, GenerativeProvider, ProviderError};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const NO_SUMMARY: &str = "No summary returned.";
const NO_MEDICINES: &str = "No medicine data found.";

const IMAGE_SUMMARY_PROMPT: &str = "You are a medical assistant. Analyze this medical image \
and summarize key patient details, prescriptions, or visible notes clearly for a doctor.";

const TEXT_SUMMARY_PROMPT: &str = "You are a medical assistant. Summarize the following \
patient information clearly and concisely for a doctor:\n";

const MEDICINE_PROMPT: &str = "You are an expert pharmacy assistant. Carefully read the uploaded \
prescription image and extract ONLY the prescribed medicines in a consistent JSON-like Markdown \
format.\n\n\
For each medicine, include the following fields exactly as shown:\n\
- Medicine Name: <name>\n\
- Dosage: <dosage or 'N/A'>\n\
- Frequency: <frequency or 'N/A'>\n\
- Route of Administration: <route or 'N/A'>\n\
- Duration: <duration or 'N/A'>\n\n\
Use one bullet point (*) per medicine. Example format:\n\
* Medicine Name: Paracetamol\n\
  Dosage: 500 mg\n\
  Frequency: Twice daily\n\
  Route of Administration: Oral\n\
  Duration: 5 days\n\n\
Ensure the format remains exactly the same for all entries, with no extra commentary, no \
summaries, no section titles, and no deviations from this key format.";

const BRIEF_IMAGE_PROMPT: &str = "Extract only key points (diagnosis, prescription, test \
results, or advice) from this medical image without detailed formatting.";

const BRIEF_TEXT_PROMPT: &str = "Summarize this medical document briefly, only mentioning \
important medical details in one paragraph:\n";

const MERGE_PROMPT: &str = "You are a concise medical assistant. Merge the following short \
summaries into a single coherent paragraph (no lists, no repetition, under 100 words):\n\n";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("unsupported media type {0:?}; upload an image file (jpg/png)")]
    UnsupportedMedia(String),
    #[error("no summaries could be generated from provided files")]
    NothingToSummarize,
}

/// An uploaded file as received by the serving layer.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Upload {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|c| c.starts_with("image/"))
            .unwrap_or(false)
    }

    fn image_part(&self) -> ContentPart {
        ContentPart::InlineData {
            mime_type: self.content_type.clone().unwrap_or_default(),
            data: self.data.clone(),
        }
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Answer for `summarize`; the provider payload goes out as `full_response`.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub summary: String,
    pub full_response: serde_json::Value,
}

/// Answer for `extract_medicines`; the provider payload goes out as `raw`.
#[derive(Debug, Clone, Serialize)]
pub struct MedicineList {
    pub summary: String,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedSummary {
    pub summary: String,
    pub all_summaries: Vec<String>,
}

#[derive(Clone)]
pub struct Summarizer {
    provider: Arc<dyn GenerativeProvider>,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Self {
        Self { provider }
    }

    /// Summarizes one file for a doctor: images are sent inline, anything
    /// else is read as text.
    pub async fn summarize(&self, upload: &Upload) -> Result<Summary, SummaryError> {
        info!(file = %upload.filename, size = upload.data.len(), "summarizing file");
        let parts = if upload.is_image() {
            vec![
                ContentPart::Text(IMAGE_SUMMARY_PROMPT.to_string()),
                upload.image_part(),
            ]
        } else {
            let text = upload.text();
            if text.trim().is_empty() {
                warn!(file = %upload.filename, "file has no readable text content");
            }
            vec![ContentPart::Text(format!("{TEXT_SUMMARY_PROMPT}{text}"))]
        };
        let resp = self.provider.generate(&parts).await?;
        Ok(Summary {
            summary: text_or(&resp, NO_SUMMARY),
            full_response: resp.raw,
        })
    }

    /// Pulls the prescribed medicines out of a prescription image.
    pub async fn extract_medicines(&self, upload: &Upload) -> Result<MedicineList, SummaryError> {
        if !upload.is_image() {
            return Err(SummaryError::UnsupportedMedia(
                upload.content_type.clone().unwrap_or_default(),
            ));
        }
        info!(file = %upload.filename, "extracting medicines from prescription");
        let parts = vec![ContentPart::Text(MEDICINE_PROMPT.to_string()), upload.image_part()];
        let resp = self.provider.generate(&parts).await?;
        Ok(MedicineList {
            summary: text_or(&resp, NO_MEDICINES),
            raw: resp.raw,
        })
    }

    /// Summarizes each file briefly, then merges the results into one
    /// paragraph. Empty files and per-file failures are skipped.
    pub async fn summarize_all(&self, uploads: &[Upload]) -> Result<CombinedSummary, SummaryError> {
        info!(files = uploads.len(), "summarizing batch");
        let mut summaries = Vec::new();
        for (idx, upload) in uploads.iter().enumerate() {
            if upload.data.is_empty() {
                warn!(file = %upload.filename, "file is empty, skipping");
                continue;
            }
            let parts = if upload.is_image() {
                vec![
                    ContentPart::Text(BRIEF_IMAGE_PROMPT.to_string()),
                    upload.image_part(),
                ]
            } else {
                let text = upload.text();
                if text.trim().is_empty() {
                    warn!(file = %upload.filename, "file has no readable text content");
                }
                vec![ContentPart::Text(format!("{BRIEF_TEXT_PROMPT}{text}"))]
            };
            match self.provider.generate(&parts).await {
                Ok(resp) => {
                    info!(file = %upload.filename, index = idx + 1, "file summarized");
                    summaries.push(text_or(&resp, NO_SUMMARY).trim().to_string());
                }
                Err(e) => warn!(file = %upload.filename, error = %e, "summary failed, skipping"),
            }
        }

        if summaries.is_empty() {
            return Err(SummaryError::NothingToSummarize);
        }

        let prompt = format!("{MERGE_PROMPT}{}", summaries.join("\n"));
        let resp = self.provider.generate(&[ContentPart::Text(prompt)]).await?;
        Ok(CombinedSummary {
            summary: text_or(&resp, NO_SUMMARY),
            all_summaries: summaries,
        })
    }
}

fn text_or(resp: &GenerateResponse, fallback: &str) -> String {
    resp.text
        .clone()
        .or_else(|| crate::gemini::candidate_text(&resp.raw))
        .unwrap_or_else(|| fallback.to_string())
}

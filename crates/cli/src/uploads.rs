use anyhow::Context;
use bytes::Bytes;
use providers::summary::Upload;
use std::path::Path;

/// Reads a local file as an upload, sniffing the MIME type from its bytes.
/// Files that are not recognized are treated as plain text.
pub fn upload_from_path(path: &Path) -> anyhow::Result<Upload> {
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let content_type = infer::get(&data)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "text/plain".to_string());
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Upload {
        filename,
        content_type: Some(content_type),
        data: Bytes::from(data),
    })
}

//! Image conversion for uploads

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use shared::models::UploadFile;
use std::path::Path;

use super::DraftError;
use crate::error::ClientResult;

const DEFAULT_MIME: &str = "application/octet-stream";

/// Decode a base64 `data:` URL into a file named `file_name`
///
/// The file's MIME type is the one embedded in the URL.
pub fn data_url_to_file(data_url: &str, file_name: &str) -> Result<UploadFile, DraftError> {
    let invalid = |reason: &str| DraftError::InvalidDataUrl(reason.to_string());

    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| invalid("missing data: prefix"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing ',' separator"))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| invalid("only base64 data URLs are supported"))?;
    // Drop parameters such as ";charset=..."
    let mime = mime.split(';').next().unwrap_or_default().trim();
    let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(&e.to_string()))?;

    Ok(UploadFile::new(file_name, mime, bytes))
}

/// Preferred file extension for a MIME type
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        _ => mime_guess::get_mime_extensions_str(mime)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("jpg"),
    }
}

/// Read a local file for upload, guessing its MIME type from the extension
pub fn file_from_path(path: impl AsRef<Path>) -> ClientResult<UploadFile> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(crate::storage::StorageError::from)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(UploadFile::new(file_name, mime.essence_str(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_mime_comes_from_url() {
        let file = data_url_to_file(PNG_DATA_URL, "image-0.jpg").unwrap();
        assert_eq!(file.file_name, "image-0.jpg");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(&file.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_rejects_malformed_urls() {
        for url in [
            "https://cdn.example.com/a.png",
            "data:image/png;base64",
            "data:text/plain,hello",
            "data:image/png;base64,@@@",
        ] {
            assert!(
                matches!(data_url_to_file(url, "x"), Err(DraftError::InvalidDataUrl(_))),
                "{url}"
            );
        }
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("application/x-unknown-thing"), "jpg");
    }

    #[test]
    fn test_file_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = file_from_path(&path).unwrap();
        assert_eq!(file.file_name, "cover.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.len(), 3);

        assert!(file_from_path(dir.path().join("missing.png")).is_err());
    }
}

//! Turning user-selected files into [`ImageFile`]s.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;

use crate::{
    error::{AvatarError, Result},
    models::ImageFile,
};

const READ_FAILED: &str = "Failed to read file as Base64";

/// Largest accepted upload (10 MiB).
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Only `image/*` content is accepted.
fn ensure_image_mime(mime_type: &str, name: &str) -> Result<()> {
    match mime_type.parse::<mime::Mime>() {
        Ok(m) if m.type_() == mime::IMAGE => Ok(()),
        _ => Err(AvatarError::ValidationError(format!(
            "{} is not an image ({})",
            name, mime_type
        ))),
    }
}

fn ensure_size(len: usize, name: &str) -> Result<()> {
    if len > MAX_FILE_BYTES {
        return Err(AvatarError::ValidationError(format!(
            "{} is larger than {} MB",
            name,
            MAX_FILE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Encodes raw file content.
pub fn from_bytes(bytes: &[u8], mime_type: &str, name: &str) -> Result<ImageFile> {
    if bytes.is_empty() {
        return Err(AvatarError::DecodeError(format!("{}: {}", name, READ_FAILED)));
    }
    ensure_image_mime(mime_type, name)?;
    ensure_size(bytes.len(), name)?;

    Ok(ImageFile {
        base64: STANDARD.encode(bytes),
        mime_type: mime_type.to_string(),
        name: name.to_string(),
    })
}

/// Keeps the payload of a `data:...;base64,<payload>` string, discarding the prefix.
/// The mime type is the one declared for the file, not the one in the prefix.
pub fn from_data_url(data_url: &str, mime_type: &str, name: &str) -> Result<ImageFile> {
    let payload = data_url
        .split_once(',')
        .map(|(_, payload)| payload.trim())
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| AvatarError::DecodeError(format!("{}: {}", name, READ_FAILED)))?;
    ensure_image_mime(mime_type, name)?;
    ensure_size(payload.len() / 4 * 3, name)?;

    Ok(ImageFile {
        base64: payload.to_string(),
        mime_type: mime_type.to_string(),
        name: name.to_string(),
    })
}

/// Mime type guessed from the file extension.
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => mime::IMAGE_PNG.to_string(),
        "jpg" | "jpeg" => mime::IMAGE_JPEG.to_string(),
        "gif" => mime::IMAGE_GIF.to_string(),
        "bmp" => mime::IMAGE_BMP.to_string(),
        "svg" => mime::IMAGE_SVG.to_string(),
        "webp" => "image/webp".to_string(),
        _ => mime::APPLICATION_OCTET_STREAM.to_string(),
    }
}

pub async fn from_path(path: impl AsRef<Path>) -> Result<ImageFile> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_for_path(path);
    ensure_image_mime(&mime_type, &name)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AvatarError::DecodeError(format!("{}: {} ({})", name, READ_FAILED, e)))?;

    log::debug!("Read {} ({} bytes)", name, bytes.len());
    from_bytes(&bytes, &mime_type, &name)
}

/// Reads all files concurrently; the result keeps the order of `paths`.
pub async fn from_paths(paths: &[PathBuf]) -> Result<Vec<ImageFile>> {
    try_join_all(paths.iter().map(|path| from_path(path))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89,
    ];

    #[test]
    fn test_bytes_round_trip() {
        let file = from_bytes(PNG_1X1, "image/png", "dot.png").unwrap();
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.name, "dot.png");
        assert!(!file.base64.starts_with("data:"));
        assert_eq!(file.decode().unwrap(), PNG_1X1);
    }

    #[test]
    fn test_empty_bytes_is_decode_error() {
        assert!(matches!(
            from_bytes(&[], "image/png", "empty.png"),
            Err(AvatarError::DecodeError(_))
        ));
    }

    #[test]
    fn test_data_url_prefix_is_stripped() {
        let file = from_data_url("data:image/png;base64,iVBORw0KGgo=", "image/png", "a.png").unwrap();
        assert_eq!(file.base64, "iVBORw0KGgo=");

        assert!(from_data_url("data:image/png;base64,", "image/png", "a.png").is_err());
        assert!(from_data_url("no comma here", "image/png", "a.png").is_err());
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("README")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_from_paths_keeps_selection_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (i, ext) in ["png", "jpg", "gif"].iter().enumerate() {
            let path = dir.path().join(format!("ref{}.{}", i, ext));
            let mut f = std::fs::File::create(&path).unwrap();
            // larger files first so reads are unlikely to finish in order
            f.write_all(&vec![i as u8 + 1; (3 - i) * 64 * 1024]).unwrap();
            paths.push(path);
        }

        let files = from_paths(&paths).await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ref0.png", "ref1.jpg", "ref2.gif"]);
        assert_eq!(files[1].mime_type, "image/jpeg");
        assert_eq!(files[2].decode().unwrap(), vec![3u8; 64 * 1024]);
    }

    #[test]
    fn test_upload_limits() {
        let err = from_bytes(b"hello", "text/plain", "notes.txt").unwrap_err();
        assert!(matches!(err, AvatarError::ValidationError(_)));
        assert!(from_bytes(b"hello", "not a mime", "x").is_err());
        assert!(from_data_url("data:text/plain;base64,aGVsbG8=", "text/plain", "a.txt").is_err());

        assert!(from_bytes(&vec![1u8; MAX_FILE_BYTES], "image/png", "max.png").is_ok());
        let err = from_bytes(&vec![1u8; MAX_FILE_BYTES + 1], "image/png", "big.png").unwrap_err();
        assert!(matches!(err, AvatarError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_non_image_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README");
        std::fs::write(&readme, b"not an image").unwrap();

        let err = from_path(&readme).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        assert!(matches!(err, AvatarError::ValidationError(_)));
        assert!(from_paths(&[readme]).await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_or_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.png");
        std::fs::File::create(&empty).unwrap();

        assert!(matches!(
            from_path(&empty).await,
            Err(AvatarError::DecodeError(_))
        ));
        assert!(matches!(
            from_path(dir.path().join("missing.png")).await,
            Err(AvatarError::DecodeError(_))
        ));
    }
}

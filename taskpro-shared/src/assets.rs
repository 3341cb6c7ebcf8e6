/// Image asset storage.
///
/// Avatars are uploaded to a Cloudinary-compatible endpoint. Requests are
/// signed with SHA-256 over the sorted upload parameters followed by the API
/// secret. When storage isn't configured, [`DisabledAssetStore`] rejects every
/// upload.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from asset storage.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Storage isn't configured.
    #[error("Asset storage is not configured")]
    Disabled,

    /// Transport failure.
    #[error("Asset upload failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The storage service answered with an error.
    #[error("Asset storage rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// File to upload.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    /// Original file name
    pub file_name: String,

    /// MIME type, if the client sent one
    pub content_type: Option<String>,

    /// File contents
    pub bytes: Bytes,
}

/// Somewhere to put uploaded images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Uploads `upload` into `folder` and returns its public URL.
    async fn upload(&self, folder: &str, upload: AssetUpload) -> Result<String, AssetError>;
}

/// Cloudinary credentials.
#[derive(Debug, Clone)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Signs upload parameters: `sha256("k1=v1&k2=v2" + secret)`, hex encoded.
///
/// Parameters are sorted by key before joining.
#[must_use]
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cloudinary image upload client.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    settings: CloudinarySettings,
    upload_url: String,
}

impl CloudinaryStore {
    pub fn new(settings: CloudinarySettings) -> Self {
        let upload_url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            settings.cloud_name
        );

        Self {
            client: reqwest::Client::new(),
            settings,
            upload_url,
        }
    }
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    async fn upload(&self, folder: &str, upload: AssetUpload) -> Result<String, AssetError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.settings.api_secret,
        );

        let mut part = reqwest::multipart::Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name.clone());
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.settings.api_key.clone())
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self.client.post(&self.upload_url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        tracing::info!(folder = %folder, file_name = %upload.file_name, "Asset uploaded");
        Ok(uploaded.secure_url)
    }
}

/// Rejects all uploads.
#[derive(Debug, Clone, Default)]
pub struct DisabledAssetStore;

#[async_trait]
impl AssetStore for DisabledAssetStore {
    async fn upload(&self, _folder: &str, _upload: AssetUpload) -> Result<String, AssetError> {
        Err(AssetError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_params_sorts_keys() {
        let a = sign_params(&[("timestamp", "1700000000"), ("folder", "avatars")], "secret");
        let b = sign_params(&[("folder", "avatars"), ("timestamp", "1700000000")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_sign_params_matches_manual_digest() {
        let expected = hex::encode(Sha256::digest(
            b"folder=avatars&timestamp=1700000000secret",
        ));
        assert_eq!(
            sign_params(&[("folder", "avatars"), ("timestamp", "1700000000")], "secret"),
            expected
        );
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let params = [("folder", "avatars"), ("timestamp", "1")];
        assert_ne!(sign_params(&params, "one"), sign_params(&params, "two"));
    }

    #[tokio::test]
    async fn test_disabled_store_rejects() {
        let upload = AssetUpload {
            file_name: "a.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: Bytes::from_static(b"png"),
        };

        let result = DisabledAssetStore.upload("avatars", upload).await;
        assert!(matches!(result, Err(AssetError::Disabled)));
    }
}

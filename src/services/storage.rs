use crate::config::Config;
use crate::error::{ConfigError, StorageError};
use crate::services::traits::ObjectStore;
use crate::services::types::{ImageFile, ProgressReporter};
use async_trait::async_trait;
use futures::stream;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Size of each streamed body chunk; one progress event per chunk
const CHUNK_SIZE: usize = 64 * 1024;

/// Object metadata returned by the storage REST API after an upload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredObject {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Storage REST error body
#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    error: StorageErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StorageErrorDetail {
    message: String,
}

/// Object store backed by the cloud storage REST endpoint
pub struct HttpObjectStore {
    client: Client,
    objects_url: Url,
}

impl HttpObjectStore {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "HOSTEL_HTTP_TIMEOUT_SECS",
                message: e.to_string(),
            })?;

        Self::with_client(client, &config.storage_url, &config.storage_bucket)
    }

    pub fn with_client(client: Client, storage_url: &Url, bucket: &str) -> Result<Self, ConfigError> {
        let objects_url = storage_url
            .join(&format!("b/{}/o", bucket))
            .map_err(|e| ConfigError::Invalid {
                key: "HOSTEL_STORAGE_BUCKET",
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            objects_url,
        })
    }

    fn upload_url(&self, key: &str) -> Url {
        let mut url = self.objects_url.clone();
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key);
        url
    }

    /// Public URL for a stored object; the object name is one encoded path segment
    fn download_url(&self, object: &StoredObject) -> Result<Url, StorageError> {
        let token = object
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| StorageError::InvalidResponse {
                key: object.name.clone(),
                message: "missing download token".to_string(),
            })?;

        let mut url = self.objects_url.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidResponse {
                key: object.name.clone(),
                message: "storage URL cannot hold path segments".to_string(),
            })?
            .push(&object.name);
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);

        Ok(url)
    }
}

/// Splits the file into owned chunks and reports progress as each one is pulled
fn progress_body(file: &ImageFile, progress: ProgressReporter) -> Body {
    let chunks: Vec<Vec<u8>> = file.bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let mut sent: u64 = 0;

    let body = stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        progress.report(sent);
        Ok::<_, std::io::Error>(chunk)
    }));

    Body::wrap_stream(body)
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        key: &str,
        file: &ImageFile,
        progress: ProgressReporter,
    ) -> Result<String, StorageError> {
        debug!("Uploading {} ({} bytes) as {}", file.name, file.len(), key);

        let response = self
            .client
            .post(self.upload_url(key))
            .header(CONTENT_TYPE, file.content_type.as_str())
            .header(CONTENT_LENGTH, file.len())
            .body(progress_body(file, progress))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StorageErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            warn!("Storage rejected {}: {} {}", key, status, message);
            return Err(StorageError::Rejected {
                key: key.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let object: StoredObject = response.json().await?;
        let url = self.download_url(&object)?;
        info!("Stored {} at {}", file.name, url);

        Ok(url.to_string())
    }

    fn store_name(&self) -> &'static str {
        "cloud-storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpObjectStore {
        let base = Url::parse("https://storage.example.com/v0/").unwrap();
        HttpObjectStore::with_client(Client::new(), &base, "hostels.appspot.com").unwrap()
    }

    #[test]
    fn test_upload_url_carries_key_as_query() {
        let url = store().upload_url("1700000000000my room.jpg");
        assert_eq!(url.path(), "/v0/b/hostels.appspot.com/o");
        let name = url
            .query_pairs()
            .find(|(k, _)| k == "name")
            .map(|(_, v)| v.into_owned());
        assert_eq!(name.as_deref(), Some("1700000000000my room.jpg"));
    }

    #[test]
    fn test_download_url_encodes_object_name() {
        let object = StoredObject {
            name: "uploads/1700000000000room.jpg".to_string(),
            download_tokens: Some("tok-1,tok-2".to_string()),
        };
        let url = store().download_url(&object).unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.example.com/v0/b/hostels.appspot.com/o/uploads%2F1700000000000room.jpg?alt=media&token=tok-1"
        );
    }

    #[test]
    fn test_download_url_requires_token() {
        let object = StoredObject {
            name: "1700000000000room.jpg".to_string(),
            download_tokens: None,
        };
        assert!(matches!(
            store().download_url(&object),
            Err(StorageError::InvalidResponse { .. })
        ));
    }
}

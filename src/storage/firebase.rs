//! Firebase Storage REST client.
//!
//! Objects are addressed as `/v0/b/<bucket>/o/<url-encoded name>`; object
//! metadata carries a download token that turns into a public `alt=media`
//! URL. A signed-in user's ID token is attached when available so bucket
//! rules that require auth keep working.

use async_trait::async_trait;
use serde::Deserialize;

use super::{ObjectStore, StorageError};

/// Object metadata subset returned by the Firebase Storage API.
#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    #[serde(rename = "downloadTokens")]
    download_tokens: Option<String>,
}

/// Talks to a single Firebase Storage bucket.
pub struct FirebaseStorage {
    client: reqwest::Client,
    bucket: String,
    /// ID token of the signed-in user, if any
    id_token: Option<String>,
}

impl FirebaseStorage {
    pub fn new(bucket: String, id_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            bucket,
            id_token,
        }
    }

    /// Base URL for object operations on this bucket.
    fn object_base(&self) -> String {
        format!("https://firebasestorage.googleapis.com/v0/b/{}/o", self.bucket)
    }

    /// Object names are URL-encoded into a single path segment, slashes included.
    fn encoded_name(key: &str) -> String {
        urlencoding::encode(key).into_owned()
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.id_token {
            Some(token) => request.header("Authorization", format!("Firebase {token}")),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for FirebaseStorage {
    async fn download_url(&self, key: &str) -> Result<String, StorageError> {
        let url = format!("{}/{}", self.object_base(), Self::encoded_name(key));

        let response = self.authorize(self.client.get(&url)).send().await?;

        match response.status().as_u16() {
            200 => {}
            404 => return Err(StorageError::NotFound(key.to_string())),
            401 | 403 => {
                let body = response.text().await.unwrap_or_default();
                return Err(StorageError::Denied(body));
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(StorageError::Api { status, body });
            }
        }

        let metadata: ObjectMetadata = response.json().await?;
        let token = metadata.download_tokens.unwrap_or_default();
        // A missing token still yields a fetchable URL on public buckets
        let media_url = format!("{url}?alt=media&token={token}");

        tracing::debug!("Cache hit for '{key}'");
        Ok(media_url)
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let upload_url = format!("{}?name={}", self.object_base(), Self::encoded_name(key));
        let size = bytes.len();

        let response = self
            .authorize(self.client.post(&upload_url))
            .header("Content-Type", content_type.to_string())
            .body(bytes)
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 201 => {}
            401 | 403 => {
                let body = response.text().await.unwrap_or_default();
                return Err(StorageError::Denied(body));
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(StorageError::Api { status, body });
            }
        }

        tracing::info!("Stored '{key}' ({size} bytes) in bucket {}", self.bucket);

        // The upload response carries the metadata of the new object, but
        // fetching the URL through the normal path keeps one code path.
        self.download_url(key).await
    }
}

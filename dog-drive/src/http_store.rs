//! Drive v2 REST transport.
//!
//! Authenticates every request with a bearer token obtained elsewhere (see
//! [`StaticTokenProvider`]). Uploads use a single `multipart/related` request.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    Content, CredentialProvider, DriveConfig, DriveError, DriveResult, DriveStore, FileId,
    FileMetadata, FilePage, FileQuery, RemoteFile, RemoteOperation,
};

pub const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v2";
pub const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v2";

/// Configuration for [`DriveV2Store`]
#[derive(Debug, Clone)]
pub struct DriveV2Config {
    pub access_token: String,
    pub api_url: String,
    pub upload_url: String,
    pub page_size: Option<u32>,
}

impl DriveV2Config {
    pub fn new<S: Into<String>>(access_token: S) -> Self {
        Self {
            access_token: access_token.into(),
            api_url: DRIVE_API_URL.to_string(),
            upload_url: DRIVE_UPLOAD_URL.to_string(),
            page_size: None,
        }
    }

    /// Point at another endpoint (e.g. a local emulator)
    pub fn with_urls<A: Into<String>, U: Into<String>>(mut self, api_url: A, upload_url: U) -> Self {
        self.api_url = api_url.into();
        self.upload_url = upload_url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }
}

/// [`DriveStore`] over the Drive v2 REST API
#[derive(Debug, Clone)]
pub struct DriveV2Store {
    client: Client,
    config: DriveV2Config,
}

impl DriveV2Store {
    pub fn new(config: DriveV2Config) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: DriveV2Config) -> Self {
        Self { client, config }
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.access_token)
    }

    fn file_url(&self, file_id: &FileId) -> String {
        format!("{}/files/{}", self.config.api_url, file_id)
    }

    async fn send(&self, operation: RemoteOperation, request: RequestBuilder) -> DriveResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| DriveError::remote(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DriveError::remote_message(
            operation,
            format!("HTTP {}: {}", status.as_u16(), body),
        ))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: RemoteOperation,
        request: RequestBuilder,
    ) -> DriveResult<T> {
        let response = self.send(operation, request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| DriveError::remote(operation, e))?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Metadata-only or multipart request, depending on `content`
    fn upload_request(
        &self,
        method: Method,
        metadata_url: String,
        upload_url: String,
        metadata: &FileMetadata,
        content: Option<&Content>,
    ) -> DriveResult<RequestBuilder> {
        match content {
            None => Ok(self.request(method, metadata_url).json(metadata)),
            Some(content) => {
                let boundary = format!("dog_drive_{}", Uuid::new_v4().simple());
                let body = multipart_related_body(&boundary, &serde_json::to_vec(metadata)?, content);
                Ok(self
                    .request(method, upload_url)
                    .query(&[("uploadType", "multipart")])
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        format!("multipart/related; boundary={}", boundary),
                    )
                    .body(body))
            }
        }
    }
}

/// Build a `multipart/related` body: JSON metadata part, then the content part
pub fn multipart_related_body(boundary: &str, metadata_json: &[u8], content: &Content) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata_json.len() + content.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata_json);
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content.mime_type).as_bytes());
    body.extend_from_slice(&content.bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[async_trait]
impl DriveStore for DriveV2Store {
    async fn list(&self, query: &FileQuery, page_token: Option<&str>) -> DriveResult<FilePage> {
        let mut params: Vec<(&str, String)> = Vec::new();
        let q = query.to_query_string();
        if !q.is_empty() {
            params.push(("q", q));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        if let Some(size) = self.config.page_size {
            params.push(("maxResults", size.to_string()));
        }

        let request = self
            .request(Method::GET, format!("{}/files", self.config.api_url))
            .query(&params);
        self.send_json(RemoteOperation::List, request).await
    }

    async fn get(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        let request = self.request(Method::GET, self.file_url(file_id));
        self.send_json(RemoteOperation::Get, request).await
    }

    async fn insert(
        &self,
        metadata: FileMetadata,
        content: Option<Content>,
    ) -> DriveResult<RemoteFile> {
        let request = self.upload_request(
            Method::POST,
            format!("{}/files", self.config.api_url),
            format!("{}/files", self.config.upload_url),
            &metadata,
            content.as_ref(),
        )?;
        self.send_json(RemoteOperation::Insert, request).await
    }

    async fn update(
        &self,
        file_id: &FileId,
        metadata: FileMetadata,
        content: Option<Content>,
        new_revision: bool,
    ) -> DriveResult<RemoteFile> {
        let request = self
            .upload_request(
                Method::PUT,
                self.file_url(file_id),
                format!("{}/files/{}", self.config.upload_url, file_id),
                &metadata,
                content.as_ref(),
            )?
            .query(&[("newRevision", new_revision)]);
        self.send_json(RemoteOperation::Update, request).await
    }

    async fn delete(&self, file_id: &FileId) -> DriveResult<()> {
        let request = self.request(Method::DELETE, self.file_url(file_id));
        self.send(RemoteOperation::Delete, request).await?;
        Ok(())
    }

    async fn trash(&self, file_id: &FileId) -> DriveResult<RemoteFile> {
        let request = self.request(Method::POST, format!("{}/trash", self.file_url(file_id)));
        self.send_json(RemoteOperation::Trash, request).await
    }
}

/// Credential provider handing out a token minted elsewhere.
///
/// Service-account signing and refresh are left to the host application.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    access_token: String,
}

impl StaticTokenProvider {
    pub fn new<S: Into<String>>(access_token: S) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn connect(&self, config: &DriveConfig) -> DriveResult<Arc<dyn DriveStore>> {
        if self.access_token.is_empty() {
            return Err(DriveError::invalid(format!(
                "No access token for {} acting as {}",
                config.service_account.email, config.user_email
            )));
        }
        let store_config =
            DriveV2Config::new(self.access_token.clone()).with_page_size(config.page_size);
        Ok(Arc::new(DriveV2Store::new(store_config)))
    }
}

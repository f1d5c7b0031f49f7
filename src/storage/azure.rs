use super::backend::{content_type_for, BlobStore};
use super::connection_string::ConnectionString;
use crate::error::{InitializationError, StorageError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Method, Url};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// REST API version sent with (and signed into) every request
const AZURE_API_VERSION: &str = "2021-08-06";

/// Everything except RFC 3986 unreserved characters
const BLOB_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Blob store backed by the Azure Blob Storage REST API
///
/// Requests are authorized with the storage account's Shared Key.
pub struct AzureBlobStore {
    client: reqwest::Client,
    account_name: String,
    account_key: Vec<u8>,
    endpoint: String,
}

impl AzureBlobStore {
    pub fn new(connection: ConnectionString) -> Result<Self, InitializationError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(InitializationError::HttpClient)?;

        let endpoint = connection.blob_endpoint();
        tracing::info!(
            "Azure blob store initialized: account={} endpoint={}",
            connection.account_name,
            endpoint
        );

        Ok(AzureBlobStore {
            client,
            account_name: connection.account_name,
            account_key: connection.account_key,
            endpoint,
        })
    }

    /// URL of a container, or of a blob inside it when `name` is given
    fn resource_url(&self, container: &str, name: Option<&str>) -> Result<Url, StorageError> {
        let raw = match name {
            Some(name) => format!(
                "{}/{}/{}",
                self.endpoint,
                container,
                utf8_percent_encode(name, BLOB_NAME_ENCODE_SET)
            ),
            None => format!("{}/{}", self.endpoint, container),
        };
        Url::parse(&raw).map_err(|e| StorageError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }

    /// `/{account}{path}` followed by the sorted query parameters
    fn canonicalized_resource(&self, url: &Url) -> String {
        let mut resource = format!("/{}{}", self.account_name, url.path());

        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_lowercase(), v.into_owned()))
            .collect();
        params.sort();

        let mut merged: Vec<(String, Vec<String>)> = Vec::new();
        for (key, value) in params {
            match merged.last_mut() {
                Some((last, values)) if *last == key => values.push(value),
                _ => merged.push((key, vec![value])),
            }
        }
        for (key, values) in merged {
            resource.push_str(&format!("\n{}:{}", key, values.join(",")));
        }

        resource
    }

    /// Build the Shared Key string-to-sign for a request
    ///
    /// Standard headers other than Content-Length and Content-Type are never
    /// sent, so their lines stay empty.
    fn string_to_sign(
        &self,
        method: &Method,
        url: &Url,
        content_length: usize,
        content_type: &str,
        ms_headers: &[(&str, String)],
    ) -> String {
        let content_length = if content_length == 0 {
            String::new()
        } else {
            content_length.to_string()
        };

        let mut headers: Vec<(String, &str)> = ms_headers
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.trim()))
            .collect();
        headers.sort();
        let canonicalized_headers: String = headers
            .iter()
            .map(|(k, v)| format!("{}:{}\n", k, v))
            .collect();

        format!(
            "{}\n\n\n{}\n\n{}\n\n\n\n\n\n\n{}{}",
            method.as_str(),
            content_length,
            content_type,
            canonicalized_headers,
            self.canonicalized_resource(url)
        )
    }

    fn sign(&self, string_to_sign: &str) -> Result<String, StorageError> {
        let mut mac = HmacSha256::new_from_slice(&self.account_key)
            .map_err(|e| StorageError::Signing(e.to_string()))?;
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());
        Ok(format!("SharedKey {}:{}", self.account_name, signature))
    }

    /// Sign and send a request, turning non-success statuses into errors
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<(Vec<u8>, &str)>,
        extra_headers: &[(&str, String)],
    ) -> Result<reqwest::Response, StorageError> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();

        let mut ms_headers: Vec<(&str, String)> = vec![
            ("x-ms-date", date),
            ("x-ms-version", AZURE_API_VERSION.to_string()),
        ];
        ms_headers.extend(extra_headers.iter().cloned());

        let (content_length, content_type) = match &body {
            Some((bytes, content_type)) => (bytes.len(), *content_type),
            None => (0, ""),
        };
        let authorization = self.sign(&self.string_to_sign(
            &method,
            &url,
            content_length,
            content_type,
            &ms_headers,
        ))?;

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header("Authorization", authorization);
        for (name, value) in &ms_headers {
            request = request.header(*name, value);
        }
        if let Some((bytes, content_type)) = body {
            request = request.header("Content-Type", content_type).body(bytes);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Azure {} {} returned {}", method, url, status);
            return Err(StorageError::Status { status, body });
        }

        Ok(response)
    }
}

/// Body of a List Blobs response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnumerationResults {
    #[serde(default)]
    blobs: BlobItems,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BlobItems {
    #[serde(rename = "Blob", default)]
    blob: Vec<BlobItem>,
}

#[derive(Debug, Deserialize)]
struct BlobItem {
    #[serde(rename = "Name")]
    name: BlobItemName,
}

/// `<Name>`, percent-encoded when it carries `Encoded="true"`
#[derive(Debug, Deserialize)]
struct BlobItemName {
    #[serde(rename = "@Encoded", default)]
    encoded: Option<String>,
    #[serde(rename = "$text", default)]
    value: String,
}

impl BlobItemName {
    fn into_name(self) -> String {
        if self.encoded.as_deref() == Some("true") {
            percent_decode_str(&self.value)
                .decode_utf8_lossy()
                .into_owned()
        } else {
            self.value
        }
    }
}

/// Extract blob names and the continuation marker from a List Blobs response
fn parse_list_response(body: &str) -> Result<(Vec<String>, Option<String>), StorageError> {
    let results: EnumerationResults = quick_xml::de::from_str(body)
        .map_err(|e| StorageError::MalformedResponse(e.to_string()))?;

    let names = results
        .blobs
        .blob
        .into_iter()
        .map(|item| item.name.into_name())
        .collect();
    let next_marker = results.next_marker.filter(|m| !m.is_empty());

    Ok((names, next_marker))
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    fn account_name(&self) -> &str {
        &self.account_name
    }

    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        let url = self.resource_url(container, Some(name))?;
        let size = bytes.len();

        self.send(
            Method::PUT,
            url,
            Some((bytes, content_type_for(name))),
            &[("x-ms-blob-type", "BlockBlob".to_string())],
        )
        .await?;

        tracing::debug!("Put blob {}/{} ({} bytes)", container, name, size);
        Ok(())
    }

    async fn list_blobs(&self, container: &str) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut url = self.resource_url(container, None)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("restype", "container");
                query.append_pair("comp", "list");
                if let Some(marker) = &marker {
                    query.append_pair("marker", marker);
                }
            }

            let response = self.send(Method::GET, url, None, &[]).await?;
            let body = response.text().await?;

            let (page, next_marker) = parse_list_response(&body)?;
            names.extend(page);

            match next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        tracing::debug!("Listed {} blobs in {}", names.len(), container);
        Ok(names)
    }

    async fn delete_blob(&self, container: &str, name: &str) -> Result<(), StorageError> {
        let url = self.resource_url(container, Some(name))?;
        self.send(Method::DELETE, url, None, &[]).await?;

        tracing::debug!("Deleted blob {}/{}", container, name);
        Ok(())
    }
}

use crate::error::InitializationError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Parsed Azure storage connection string
///
/// Accepts the `Key=Value;Key=Value` form issued by the Azure portal. Only the
/// keys needed for Shared Key access to the blob service are kept.
#[derive(Clone)]
pub struct ConnectionString {
    pub account_name: String,
    pub account_key: Vec<u8>,
    pub protocol: String,
    pub endpoint_suffix: String,
    pub blob_endpoint: Option<String>,
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("protocol", &self.protocol)
            .field("endpoint_suffix", &self.endpoint_suffix)
            .field("blob_endpoint", &self.blob_endpoint)
            .finish()
    }
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self, InitializationError> {
        let mut account_name = None;
        let mut account_key = None;
        let mut protocol = None;
        let mut endpoint_suffix = None;
        let mut blob_endpoint = None;

        for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            // AccountKey values end in base64 padding, so split on the first '=' only
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| InitializationError::MalformedSegment(segment.to_string()))?;

            match key.trim() {
                "AccountName" => account_name = Some(value.trim().to_string()),
                "AccountKey" => account_key = Some(BASE64.decode(value.trim())?),
                "DefaultEndpointsProtocol" => protocol = Some(value.trim().to_string()),
                "EndpointSuffix" => endpoint_suffix = Some(value.trim().to_string()),
                "BlobEndpoint" => {
                    blob_endpoint = Some(value.trim().trim_end_matches('/').to_string())
                }
                other => tracing::debug!("Ignoring connection string key {}", other),
            }
        }

        Ok(ConnectionString {
            account_name: account_name
                .filter(|name| !name.is_empty())
                .ok_or(InitializationError::MissingKey("AccountName"))?,
            account_key: account_key.ok_or(InitializationError::MissingKey("AccountKey"))?,
            protocol: protocol.unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            endpoint_suffix: endpoint_suffix.unwrap_or_else(|| DEFAULT_ENDPOINT_SUFFIX.to_string()),
            blob_endpoint,
        })
    }

    /// Base URL that blob service requests are sent to
    pub fn blob_endpoint(&self) -> String {
        self.blob_endpoint.clone().unwrap_or_else(|| {
            format!(
                "{}://{}.blob.{}",
                self.protocol, self.account_name, self.endpoint_suffix
            )
        })
    }
}

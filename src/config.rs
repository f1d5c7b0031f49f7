use serde::Deserialize;
use std::env;

/// Default request body limit for uploads (25 MB)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 26_214_400;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub connection_string: String,
    pub container_name: String,
    pub storage_type: StorageType,
    pub server_port: u16,
    pub max_upload_bytes: usize,
    pub latency_targets: Option<Vec<(String, String)>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub enum StorageType {
    Azure,
    Memory,
}

impl std::str::FromStr for StorageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(StorageType::Azure),
            "memory" => Ok(StorageType::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage type: {}", s)),
        }
    }
}

/// Parse `region=url,region=url` into an ordered list of probe targets
fn parse_latency_targets(raw: &str) -> Result<Vec<(String, String)>, anyhow::Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (region, url) = entry
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Invalid LATENCY_TARGETS entry: {}", entry))?;
            let (region, url) = (region.trim(), url.trim());
            if region.is_empty() || url.is_empty() {
                return Err(anyhow::anyhow!("Invalid LATENCY_TARGETS entry: {}", entry));
            }
            Ok((region.to_string(), url.to_string()))
        })
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let latency_targets = lookup("LATENCY_TARGETS")
            .map(|raw| parse_latency_targets(&raw))
            .transpose()?;

        Ok(Config {
            connection_string: lookup("BLOB_CONNECTION_STRING")
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("BLOB_CONNECTION_STRING must be set"))?,
            container_name: lookup("BLOB_CONTAINER_NAME")
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("BLOB_CONTAINER_NAME must be set"))?,
            storage_type: lookup("STORAGE_TYPE")
                .unwrap_or_else(|| "azure".to_string())
                .parse()?,
            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SERVER_PORT: {}", e))?,
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid MAX_UPLOAD_BYTES: {}", e))?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            latency_targets,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.container_name.contains('/') {
            return Err(anyhow::anyhow!(
                "BLOB_CONTAINER_NAME must not contain '/': {}",
                self.container_name
            ));
        }
        if let Some(targets) = &self.latency_targets {
            if targets.is_empty() {
                return Err(anyhow::anyhow!("LATENCY_TARGETS is set but empty"));
            }
        }
        Ok(())
    }
}

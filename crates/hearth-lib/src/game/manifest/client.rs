use super::descriptor::VersionDescriptor;
use super::index::VersionIndex;
use crate::config::HearthConfig;
use crate::error::{Error, Result};
use reqwest::Client;

/// Build the HTTP client shared by the manifest client and the artifact store
pub fn build_http_client(config: &HearthConfig) -> Result<Client> {
    if config.accept_invalid_certs {
        log::warn!(
            "TLS certificate validation is DISABLED for all requests (accept_invalid_certs = true)"
        );
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(|e| Error::transport("http client", e))
}

/// Fetches the remote version index and per-version descriptors.
///
/// Every call is a single GET. Nothing is retried and nothing is cached here.
#[derive(Clone)]
pub struct ManifestClient {
    client: Client,
    index_url: String,
}

impl ManifestClient {
    pub fn new(client: Client, index_url: impl Into<String>) -> Self {
        Self {
            client,
            index_url: index_url.into(),
        }
    }

    pub fn from_config(config: &HearthConfig) -> Result<Self> {
        Ok(Self::new(build_http_client(config)?, config.index_url.clone()))
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    pub async fn fetch_index(&self) -> Result<VersionIndex> {
        let text = self.get_text(&self.index_url).await?;
        let index = VersionIndex::from_json(&text, &self.index_url)?;

        log::info!(
            "Fetched version index: {} versions (latest release {}, latest snapshot {})",
            index.versions().len(),
            index.latest_release(),
            index.latest_snapshot()
        );
        Ok(index)
    }

    pub async fn fetch_descriptor(&self, url: &str) -> Result<VersionDescriptor> {
        let text = self.fetch_descriptor_text(url).await?;
        VersionDescriptor::from_json(&text, url)
    }

    /// Raw descriptor body, for callers that persist it verbatim
    pub async fn fetch_descriptor_text(&self, url: &str) -> Result<String> {
        self.get_text(url).await
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::NetworkFailure {
                target: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response.text().await.map_err(|e| Error::transport(url, e))
    }
}

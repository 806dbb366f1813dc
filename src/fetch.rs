//! HTTP retrieval and the configuration load boundary

use crate::{
    constants::CONFIG_QUERY_PARAM, core::config::ConfigModel, traits::Fetcher, MapError, Result,
};
use async_trait::async_trait;
use log::{debug, error};
use once_cell::sync::Lazy;
use reqwest::{Client, Url};

/// Shared HTTP client with a custom User-Agent. Building the client once
/// avoids the cost of TLS and connection pool setup for every request.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("mapframe/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// [`Fetcher`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Fetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("fetch {url}");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Where the embed's configuration document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigReference {
    url: Url,
}

impl ConfigReference {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// A direct URL of the configuration document
    pub fn from_url(url: &str) -> Result<Self> {
        Url::parse(url)
            .map(Self::new)
            .map_err(|e| MapError::ConfigurationFetchFailed(format!("{url}: {e}")))
    }

    /// Reads the `config` query parameter of the embedding page.
    ///
    /// Relative references resolve against the page URL. A page without
    /// the parameter is a fatal [`MapError::ConfigurationMissing`].
    pub fn from_page_url(page_url: &str) -> Result<Self> {
        let page = Url::parse(page_url).map_err(|e| MapError::ParseError(e.to_string()))?;
        let reference = page
            .query_pairs()
            .find(|(key, _)| key == CONFIG_QUERY_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.trim().is_empty())
            .ok_or(MapError::ConfigurationMissing)?;

        let url = page
            .join(&reference)
            .map_err(|e| MapError::ConfigurationFetchFailed(e.to_string()))?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Fetches and parses the configuration document; any failure is fatal
pub async fn load_config<F: Fetcher + ?Sized>(
    fetcher: &F,
    reference: &ConfigReference,
) -> Result<ConfigModel> {
    let bytes = fetcher
        .fetch_bytes(reference.url().as_str())
        .await
        .map_err(|e| fetch_failed(reference, e))?;
    ConfigModel::from_slice(&bytes).map_err(|e| fetch_failed(reference, e))
}

fn fetch_failed(reference: &ConfigReference, cause: MapError) -> MapError {
    error!("configuration {} unavailable: {cause}", reference.url());
    MapError::ConfigurationFetchFailed(cause.to_string())
}

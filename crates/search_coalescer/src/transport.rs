//! HTTP implementation of [`Fetcher`] against the find-tags endpoint.

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{FIND_TAGS_PARAM, FIND_TAGS_PATH};
use url::Url;

use crate::{error::FetchError, Fetcher};

pub struct HttpFetcher {
    http: Client,
    endpoint: Url,
    param: String,
}

impl HttpFetcher {
    /// Targets `<server_url>/edit/find_tags?name=<query>`.
    pub fn new(server_url: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(server_url)?.join(FIND_TAGS_PATH)?;
        Ok(Self::with_client(Client::new(), endpoint, FIND_TAGS_PARAM))
    }

    pub fn with_client(http: Client, endpoint: Url, param: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            param: param.into(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full request URL with the query percent-encoded into the search parameter.
    pub fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(&self.param, query);
        url
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, query: &str) -> Result<String, FetchError> {
        let response = self
            .http
            .get(self.request_url(query))
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(FetchError::transport)
    }
}

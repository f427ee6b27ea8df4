//! Search-service collaborator
//!
//! The handler only sees [`ClientFactory`] and [`SearchService`]. The
//! production implementation talks to an Elasticsearch cluster over HTTP
//! with reqwest; tests substitute their own.

use crate::config::{default_addresses, ELASTICSEARCH_URL_ENV};
use crate::error::ProxyError;
use crate::request::ClientConfig;
use crate::Result;
use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use url::Url;

/// Parameters of one `_search` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub indices: Vec<String>,
    /// Encoded query body
    pub body: Bytes,
    pub sort: Vec<String>,
    pub track_total_hits: bool,
    pub pretty: bool,
    /// Passed through literally, zero included
    pub size: i64,
}

/// Status and fully drained body of a cluster response.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RemoteResponse {
    /// Anything above 299 counts as an error reported by the cluster.
    pub fn is_error(&self) -> bool {
        self.status.as_u16() > 299
    }
}

/// A client scoped to a single request.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run a search. Only transport failures are errors; an error status
    /// from the cluster comes back as a [`RemoteResponse`].
    async fn search(&self, params: SearchParams) -> Result<RemoteResponse>;
}

/// Builds a [`SearchService`] for each request.
pub trait ClientFactory: Send + Sync {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn SearchService>>;
}

/// reqwest-backed Elasticsearch client
pub struct ElasticClient {
    http: reqwest::Client,
    addresses: Vec<Url>,
    username: String,
    password: String,
}

impl ElasticClient {
    pub fn new(addresses: &[String], username: &str, password: &str) -> Result<Self> {
        let addresses = addresses
            .iter()
            .map(|a| parse_address(a))
            .collect::<Result<Vec<_>>>()?;
        if addresses.is_empty() {
            return Err(ProxyError::ClientBuild("no cluster addresses given".into()));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProxyError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            addresses,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// `{address}/{indices}/_search?...` against the first address.
    pub fn search_url(&self, params: &SearchParams) -> Result<Url> {
        let mut url = self.addresses[0].clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ProxyError::ClientBuild(format!("cannot append path to {}", self.addresses[0]))
            })?;
            segments.pop_if_empty();
            if !params.indices.is_empty() {
                segments.push(&params.indices.join(","));
            }
            segments.push("_search");
        }
        {
            let mut query = url.query_pairs_mut();
            if !params.sort.is_empty() {
                query.append_pair("sort", &params.sort.join(","));
            }
            if params.track_total_hits {
                query.append_pair("track_total_hits", "true");
            }
            if params.pretty {
                query.append_pair("pretty", "true");
            }
            query.append_pair("size", &params.size.to_string());
        }
        Ok(url)
    }
}

fn parse_address(address: &str) -> Result<Url> {
    let url = Url::parse(address)
        .map_err(|e| ProxyError::ClientBuild(format!("cannot parse url {address:?}: {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyError::ClientBuild(format!(
            "unsupported cluster address {address:?}"
        )));
    }
    Ok(url)
}

#[async_trait]
impl SearchService for ElasticClient {
    async fn search(&self, params: SearchParams) -> Result<RemoteResponse> {
        let url = self.search_url(&params)?;
        tracing::debug!(%url, "Forwarding search request");

        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(params.body);
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(RemoteResponse { status, body })
    }
}

/// Factory for [`ElasticClient`]
///
/// `ELASTICSEARCH_URL` is read on every call that needs discovery: the
/// `Default` config, and an `Explicit` one whose addresses are all empty
/// (credentials without addresses keep their credentials).
#[derive(Debug, Clone, Default)]
pub struct ElasticClientFactory;

fn discovered_addresses() -> Vec<String> {
    let env_value = std::env::var(ELASTICSEARCH_URL_ENV).ok();
    default_addresses(env_value.as_deref())
}

impl ClientFactory for ElasticClientFactory {
    fn connect(&self, config: &ClientConfig) -> Result<Box<dyn SearchService>> {
        let client = match config {
            ClientConfig::Default => ElasticClient::new(&discovered_addresses(), "", "")?,
            ClientConfig::Explicit {
                addresses,
                username,
                password,
            } if addresses.iter().all(|a| a.is_empty()) => {
                ElasticClient::new(&discovered_addresses(), username, password)?
            }
            ClientConfig::Explicit {
                addresses,
                username,
                password,
            } => ElasticClient::new(addresses, username, password)?,
        };
        Ok(Box::new(client))
    }
}

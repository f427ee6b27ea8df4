//! Elasticsearch search proxy
//!
//! Exposes a single `POST /elastic` endpoint. The caller posts connection
//! parameters together with a query; the proxy builds a client for that
//! request only, runs the search and relays the cluster's JSON response.
//!
//! # Request body
//!
//! ```json
//! {
//!   "addresses": "http://es1:9200,http://es2:9200",
//!   "username": "elastic",
//!   "password": "changeme",
//!   "index": "logs-a,logs-b",
//!   "sort": "timestamp:desc",
//!   "size": 10,
//!   "elasticquery": { "query": { "match_all": {} } }
//! }
//! ```
//!
//! When `username`, `password` and `addresses` are all empty the cluster is
//! discovered from `ELASTICSEARCH_URL` (default `http://localhost:9200`).

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod recovery;
pub mod request;
pub mod router;

pub use client::{
    ClientFactory, ElasticClient, ElasticClientFactory, RemoteResponse, SearchParams, SearchService,
};
pub use config::ServerConfig;
pub use error::ProxyError;
pub use request::{split_list, ClientConfig, SearchRequest};
pub use router::{proxy_router, ProxyServer};

/// Result type for proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

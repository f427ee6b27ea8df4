//! `POST /elastic` handler

use crate::client::{ClientFactory, RemoteResponse, SearchParams};
use crate::error::ProxyError;
use crate::request::{ClientConfig, SearchRequest};
use crate::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;

/// State for the proxy handler
#[derive(Clone)]
pub struct ProxyState {
    pub clients: Arc<dyn ClientFactory>,
}

/// POST /elastic - decode, connect, search, relay
pub async fn elastic_search_handler(State(state): State<ProxyState>, body: Bytes) -> Response {
    match proxy_search(state.clients.as_ref(), &body).await {
        Ok(encoded) => ([(header::CONTENT_TYPE, "application/json")], encoded).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn proxy_search(clients: &dyn ClientFactory, body: &[u8]) -> Result<Vec<u8>> {
    let request = SearchRequest::from_slice(body).inspect_err(|e| {
        tracing::error!("Unable to decode request body: {}", e);
    })?;

    let config = ClientConfig::from_request(&request);
    let client = clients.connect(&config).inspect_err(|e| {
        tracing::error!("Unable to create search client: {}", e);
    })?;

    let query = serde_json::to_vec(&request.elasticquery).map_err(|e| {
        tracing::error!("Error encoding search query: {}", e);
        ProxyError::QueryEncode(e)
    })?;

    let params = SearchParams {
        indices: request.indices(),
        body: query.into(),
        sort: request.sort_fields(),
        track_total_hits: true,
        pretty: true,
        size: request.size,
    };

    let response = client.search(params).await.inspect_err(|e| {
        tracing::error!("Error getting response from search cluster: {}", e);
    })?;

    if response.is_error() {
        log_remote_error(&response);
        return Err(ProxyError::Remote {
            status: response.status,
            body: response.body,
        });
    }

    let decoded: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&response.body).map_err(|e| {
            tracing::error!("Error parsing search response body: {}", e);
            ProxyError::ResponseDecode(e)
        })?;

    serde_json::to_vec(&decoded).map_err(|e| {
        tracing::error!("Error encoding search response: {}", e);
        ProxyError::ResponseEncode(e)
    })
}

#[derive(Deserialize)]
struct RemoteErrorBody {
    error: RemoteErrorDetail,
}

#[derive(Deserialize)]
struct RemoteErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    reason: String,
}

fn log_remote_error(response: &RemoteResponse) {
    match serde_json::from_slice::<RemoteErrorBody>(&response.body) {
        Ok(parsed) => tracing::error!(
            "[{}] {}: {}",
            response.status,
            parsed.error.error_type,
            parsed.error.reason
        ),
        Err(e) => tracing::warn!(
            status = %response.status,
            "Error parsing the search error body: {}",
            e
        ),
    }
}

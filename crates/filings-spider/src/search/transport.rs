use super::{RawResponse, SearchRequest};
use crate::error::SearchError;
use crate::http::*;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::trace;

/// Sends one documents-search request and hands back the uninterpreted response.
///
/// Only failures to obtain a response at all are errors here; status codes are interpreted by
/// [`parse_response`](super::parse_response).
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn post(&self, request: &SearchRequest, token: &str) -> Result<RawResponse, SearchError>;
}

/// [`SearchTransport`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: HttpClient,
    url: String,
}

impl HttpTransport {
    /// `client` should carry the request timeout, see [`std_client_build`](crate::std_client_build).
    pub fn new(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn post(&self, request: &SearchRequest, token: &str) -> Result<RawResponse, SearchError> {
        trace!("POST {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "*/*")
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or("<binary>").to_string(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

//! A thin wrapper over the HTTP transport. Connection pooling and timeouts
//! are the transport's own; nothing is configured here.

use reqwest::{StatusCode, header};
use serde_json::Value;
use std::collections::HashMap;

pub use reqwest::Method;

pub type Headers = HashMap<String, String>;
pub type Query<'a> = HashMap<&'a str, &'a str>;
pub type Form<'a> = HashMap<&'a str, &'a str>;

#[derive(Clone, Debug, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

/// A response stripped down to what the request pipeline looks at.
#[derive(Debug)]
pub(crate) struct HttpResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the response declares a JSON payload.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|mime| mime == "application/json")
    }
}

impl HttpClient {
    pub(crate) async fn request(
        &self,
        method: Method,
        url: &str,
        headers: Option<&Headers>,
        query: &Query<'_>,
        json: Option<&Value>,
        data: Option<Vec<u8>>,
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut request = self.client.request(method, url);
        if let Some(headers) = headers {
            for (key, val) in headers {
                request = request.header(key, val);
            }
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(json) = json {
            request = request.json(json);
        }
        if let Some(data) = data {
            request = request.body(data);
        }

        let response = request.send().await?;
        Self::read(response).await
    }

    pub(crate) async fn post_form(
        &self,
        url: &str,
        headers: Option<&Headers>,
        payload: &Form<'_>,
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut request = self.client.post(url);
        if let Some(headers) = headers {
            for (key, val) in headers {
                request = request.header(key, val);
            }
        }
        let response = request.form(payload).send().await?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, reqwest::Error> {
        let status = response.status();
        // Only the mime type matters downstream; drop any charset suffix.
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_owned()
            });
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

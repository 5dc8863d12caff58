use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use tracing::debug;

use crate::args::HttpMethod;
use crate::dispatch::Trigger;
use crate::domain::WorkItem;
use crate::error::TriggerError;

use super::template::{render_template, work_item_vars};

/// Longest response body quoted in an error.
const MAX_ERROR_BODY: usize = 512;

/// Templated request fired once per dispatched work item.
#[derive(Debug, Clone)]
pub struct TriggerSpec {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    /// Accept invalid TLS certificates.
    pub insecure: bool,
}

pub struct HttpTrigger {
    client: Client,
    spec: TriggerSpec,
}

impl HttpTrigger {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(spec: TriggerSpec) -> Result<Self, TriggerError> {
        let client = Client::builder()
            .timeout(spec.timeout)
            .danger_accept_invalid_certs(spec.insecure)
            .build()
            .map_err(|err| TriggerError::BuildClient { source: err })?;
        Ok(Self { client, spec })
    }

    /// Renders the request for `item` without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error when the rendered URL or a rendered header is invalid.
    pub fn render(&self, item: &WorkItem) -> Result<RenderedRequest, TriggerError> {
        let vars = work_item_vars(item);
        let rendered_url = render_template(&self.spec.url, &vars);
        let url = Url::parse(&rendered_url).map_err(|err| TriggerError::InvalidUrl {
            url: rendered_url.clone(),
            source: err,
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.spec.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                TriggerError::InvalidHeader {
                    name: name.clone(),
                    message: err.to_string(),
                }
            })?;
            let header_value = HeaderValue::from_str(&render_template(value, &vars)).map_err(
                |err| TriggerError::InvalidHeader {
                    name: name.clone(),
                    message: err.to_string(),
                },
            )?;
            headers.append(header_name, header_value);
        }

        Ok(RenderedRequest {
            method: to_reqwest_method(self.spec.method),
            url,
            headers,
            body: self
                .spec
                .body
                .as_deref()
                .map(|body| render_template(body, &vars)),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RenderedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

#[async_trait]
impl Trigger for HttpTrigger {
    async fn trigger(&self, item: &WorkItem) -> Result<(), TriggerError> {
        let request = self.render(item)?;
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|err| TriggerError::Request { source: err })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(TriggerError::UnexpectedStatus {
            status: status.as_u16(),
            body: truncate(body, MAX_ERROR_BODY),
        })
    }
}

const fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut = cut.saturating_sub(1);
        }
        text.truncate(cut);
    }
    text
}

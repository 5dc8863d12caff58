use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use tracing::{debug, info, warn};

use crate::domain::StreamDescriptor;
use crate::error::StreamError;
use crate::streams::{ReceivedMessage, StreamSource, Subscription};

use super::connection::ConnectionString;
use super::sas::SasTokenCache;

const API_VERSION: &str = "2017-04";
const ATOM_CONTENT_TYPE: &str = "application/atom+xml;type=entry;charset=utf-8";
/// Subscriptions left behind by a crashed run are removed by the broker
/// after an hour without receivers.
const SUBSCRIPTION_ENTRY: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<entry xmlns="http://www.w3.org/2005/Atom">"#,
    r#"<content type="application/xml">"#,
    r#"<SubscriptionDescription xmlns:i="http://www.w3.org/2001/XMLSchema-instance" "#,
    r#"xmlns="http://schemas.microsoft.com/netservices/2010/10/servicebus/connect">"#,
    "<LockDuration>PT1M</LockDuration>",
    "<AutoDeleteOnIdle>PT1H</AutoDeleteOnIdle>",
    "</SubscriptionDescription>",
    "</content>",
    "</entry>"
);
/// Headroom on top of the broker-side long poll before the HTTP call times out.
const RECEIVE_GRACE: Duration = Duration::from_secs(15);
const MAX_SUBSCRIPTION_SUFFIX: u32 = 100_000;

#[derive(Debug, Clone, Copy)]
pub struct ServiceBusConfig {
    /// How long one receive call waits on the broker for a message.
    pub receive_timeout: Duration,
    pub token_lifetime: Duration,
}

impl Default for ServiceBusConfig {
    fn default() -> Self {
        Self {
            receive_timeout: Duration::from_secs(30),
            token_lifetime: Duration::from_secs(3600),
        }
    }
}

pub struct ServiceBusSource {
    http: reqwest::Client,
    config: ServiceBusConfig,
}

impl ServiceBusSource {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: ServiceBusConfig) -> Result<Self, StreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.receive_timeout.saturating_add(RECEIVE_GRACE))
            .build()
            .map_err(|err| StreamError::BuildClient { source: err })?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl StreamSource for ServiceBusSource {
    async fn open(
        &self,
        descriptor: &StreamDescriptor,
    ) -> Result<Box<dyn Subscription>, StreamError> {
        let connection = ConnectionString::parse(&descriptor.connection)?;
        let topic = descriptor.stream_id.clone();
        let name = subscription_name();
        let subscription_url = connection
            .endpoint
            .join(&format!("{}/subscriptions/{}", topic, name))
            .map_err(|err| StreamError::InvalidEndpoint {
                endpoint: connection.endpoint.to_string(),
                source: err,
            })?
            .to_string();
        let tokens = SasTokenCache::new(
            connection.endpoint.to_string(),
            connection.key_name,
            connection.key,
            self.config.token_lifetime,
        );

        let create_failed = |detail: String| StreamError::CreateSubscription {
            topic: topic.clone(),
            subscription: name.clone(),
            detail,
        };
        let response = self
            .http
            .put(format!("{}?api-version={}", subscription_url, API_VERSION))
            .header(AUTHORIZATION, tokens.token()?)
            .header(CONTENT_TYPE, ATOM_CONTENT_TYPE)
            .body(SUBSCRIPTION_ENTRY)
            .send()
            .await
            .map_err(|err| create_failed(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(create_failed(format!("status {}: {}", status.as_u16(), body)));
        }
        info!("Created subscription {} on topic {}.", name, topic);

        Ok(Box::new(ServiceBusSubscription {
            http: self.http.clone(),
            tokens,
            topic,
            name,
            subscription_url,
            receive_timeout_secs: self.config.receive_timeout.as_secs().max(1),
            closed: false,
        }))
    }
}

fn subscription_name() -> String {
    let suffix = rand::thread_rng().gen_range(0..MAX_SUBSCRIPTION_SUFFIX);
    format!("sub-{}", suffix)
}

/// A private peek-lock subscription on one topic.
pub struct ServiceBusSubscription {
    http: reqwest::Client,
    tokens: SasTokenCache,
    topic: String,
    name: String,
    subscription_url: String,
    receive_timeout_secs: u64,
    closed: bool,
}

impl ServiceBusSubscription {
    #[must_use]
    pub fn subscription_name(&self) -> &str {
        &self.name
    }

    fn receive_error(&self, detail: String) -> StreamError {
        StreamError::Receive {
            stream: self.topic.clone(),
            detail,
        }
    }
}

#[async_trait]
impl Subscription for ServiceBusSubscription {
    fn stream_id(&self) -> &str {
        &self.topic
    }

    async fn receive_next(&mut self) -> Result<Option<ReceivedMessage>, StreamError> {
        let head_url = format!(
            "{}/messages/head?timeout={}",
            self.subscription_url, self.receive_timeout_secs
        );
        loop {
            let response = self
                .http
                .post(&head_url)
                .header(AUTHORIZATION, self.tokens.token()?)
                .header(CONTENT_LENGTH, 0)
                .send()
                .await
                .map_err(|err| self.receive_error(err.to_string()))?;

            match response.status() {
                StatusCode::NO_CONTENT => {
                    debug!("No message on {} yet.", self.topic);
                }
                StatusCode::OK | StatusCode::CREATED => {
                    let receipt = response
                        .headers()
                        .get(LOCATION)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_owned);
                    let payload = response
                        .bytes()
                        .await
                        .map_err(|err| self.receive_error(err.to_string()))?;
                    return Ok(Some(ReceivedMessage::new(payload, receipt)));
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(self.receive_error(format!("status {}: {}", status.as_u16(), body)));
                }
            }
        }
    }

    async fn complete(&mut self, message: &ReceivedMessage) -> Result<(), StreamError> {
        let Some(receipt) = message.receipt.as_deref() else {
            return Ok(());
        };
        let complete_failed = |detail: String| StreamError::Complete {
            stream: self.topic.clone(),
            detail,
        };
        let response = self
            .http
            .delete(receipt)
            .header(AUTHORIZATION, self.tokens.token()?)
            .send()
            .await
            .map_err(|err| complete_failed(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(complete_failed(format!("status {}", status.as_u16())))
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let token = match self.tokens.token() {
            Ok(token) => token,
            Err(err) => {
                warn!("Could not delete subscription {}: {}", self.name, err);
                return;
            }
        };
        let result = self
            .http
            .delete(format!("{}?api-version={}", self.subscription_url, API_VERSION))
            .header(AUTHORIZATION, token)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                info!("Deleted subscription {} on topic {}.", self.name, self.topic);
            }
            Ok(response) => {
                warn!(
                    "Deleting subscription {} on topic {} returned status {}.",
                    self.name,
                    self.topic,
                    response.status().as_u16()
                );
            }
            Err(err) => {
                warn!("Could not delete subscription {}: {}", self.name, err);
            }
        }
    }
}

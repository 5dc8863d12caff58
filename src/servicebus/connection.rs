use url::Url;

use crate::error::StreamError;

/// Parsed `Endpoint=..;SharedAccessKeyName=..;SharedAccessKey=..` string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// REST base URL of the namespace, always ending in `/`.
    pub endpoint: Url,
    pub key_name: String,
    pub key: String,
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint.as_str())
            .field("key_name", &self.key_name)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl ConnectionString {
    /// Parses a namespace connection string. `sb://` endpoints are reached
    /// over `https`; other schemes are kept as given.
    ///
    /// # Errors
    ///
    /// Returns an error when a required part is missing or the endpoint is
    /// not a valid URL.
    pub fn parse(raw: &str) -> Result<Self, StreamError> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;

        for part in raw.split(';').map(str::trim).filter(|part| !part.is_empty()) {
            let Some((name, value)) = part.split_once('=') else {
                return Err(StreamError::InvalidConnectionString {
                    reason: "every part must be Name=Value",
                });
            };
            match name.trim() {
                "Endpoint" => endpoint = Some(value.trim()),
                "SharedAccessKeyName" => key_name = Some(value.trim()),
                "SharedAccessKey" => key = Some(value.trim()),
                _ => {}
            }
        }

        let endpoint = endpoint.filter(|value| !value.is_empty()).ok_or(
            StreamError::InvalidConnectionString {
                reason: "missing Endpoint",
            },
        )?;
        let key_name = key_name.filter(|value| !value.is_empty()).ok_or(
            StreamError::InvalidConnectionString {
                reason: "missing SharedAccessKeyName",
            },
        )?;
        let key = key.filter(|value| !value.is_empty()).ok_or(
            StreamError::InvalidConnectionString {
                reason: "missing SharedAccessKey",
            },
        )?;

        Ok(Self {
            endpoint: rest_endpoint(endpoint)?,
            key_name: key_name.to_owned(),
            key: key.to_owned(),
        })
    }
}

fn rest_endpoint(raw: &str) -> Result<Url, StreamError> {
    let normalized = raw
        .strip_prefix("sb://")
        .map_or_else(|| raw.to_owned(), |rest| format!("https://{}", rest));
    let mut url = Url::parse(&normalized).map_err(|err| StreamError::InvalidEndpoint {
        endpoint: raw.to_owned(),
        source: err,
    })?;
    if url.host_str().is_none() {
        return Err(StreamError::InvalidConnectionString {
            reason: "Endpoint has no host",
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    Ok(url)
}

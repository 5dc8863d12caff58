use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::StreamError;

type HmacSha256 = Hmac<Sha256>;

/// Tokens are renewed once less than this much lifetime is left.
const RENEW_MARGIN_SECS: i64 = 300;

/// Builds a `SharedAccessSignature` authorization value for `resource_uri`,
/// valid until `expires_at` (unix seconds).
///
/// # Errors
///
/// Returns [`StreamError::Signature`] when the key cannot seed the HMAC.
pub fn sign_sas_token(
    resource_uri: &str,
    key_name: &str,
    key: &str,
    expires_at: i64,
) -> Result<String, StreamError> {
    let encoded_uri = encode(resource_uri);
    let string_to_sign = format!("{}\n{}", encoded_uri, expires_at);
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|err| {
        StreamError::Signature {
            reason: err.to_string(),
        }
    })?;
    mac.update(string_to_sign.as_bytes());
    let signature = B64.encode(mac.finalize().into_bytes());
    Ok(format!(
        "SharedAccessSignature sr={}&sig={}&se={}&skn={}",
        encoded_uri,
        encode(&signature),
        expires_at,
        encode(key_name)
    ))
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Namespace-wide token, re-signed shortly before it expires.
#[derive(Debug)]
pub struct SasTokenCache {
    resource_uri: String,
    key_name: String,
    key: String,
    lifetime: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl SasTokenCache {
    #[must_use]
    pub const fn new(resource_uri: String, key_name: String, key: String, lifetime: Duration) -> Self {
        Self {
            resource_uri,
            key_name,
            key,
            lifetime,
            cached: Mutex::new(None),
        }
    }

    /// # Errors
    ///
    /// Returns an error when a fresh token cannot be signed.
    pub fn token(&self) -> Result<String, StreamError> {
        self.token_at(chrono::Utc::now().timestamp())
    }

    /// Token valid at `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns an error when a fresh token cannot be signed.
    pub fn token_at(&self, now: i64) -> Result<String, StreamError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = cached.as_ref()
            && token.expires_at.saturating_sub(now) > RENEW_MARGIN_SECS
        {
            return Ok(token.value.clone());
        }
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(lifetime);
        let value = sign_sas_token(&self.resource_uri, &self.key_name, &self.key, expires_at)?;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at,
        });
        Ok(value)
    }
}

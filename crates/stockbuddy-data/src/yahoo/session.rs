//! Cookie and crumb session for Yahoo's JSON endpoints.
//!
//! `quoteSummary` rejects requests that lack a session cookie and a matching
//! crumb token. The cookie is obtained by hitting `fc.yahoo.com` with a cookie
//! jar enabled; the crumb is then read from `getcrumb` and reused until an
//! endpoint answers 401.

use crate::error::{DataError, Result};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

/// Default browser user agent. Yahoo answers 429 to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";

/// Authenticated HTTP session against Yahoo Finance.
#[derive(Debug)]
pub struct YahooSession {
    client: reqwest::Client,
    crumb: Mutex<Option<String>>,
}

impl YahooSession {
    /// Create a session with the given user agent.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            crumb: Mutex::new(None),
        })
    }

    /// The crumb for this session, fetching it on first use.
    pub async fn crumb(&self) -> Result<String> {
        let mut guard = self.crumb.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie endpoint answers 404 but still sets the session cookie.
        let _ = self.client.get(COOKIE_URL).send().await?;

        let response = self.client.get(CRUMB_URL).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Http {
                status: status.as_u16(),
                endpoint: "getcrumb".to_string(),
            });
        }
        let crumb = response.text().await?.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(DataError::YahooApi("Yahoo returned an invalid crumb".to_string()));
        }

        tracing::debug!("obtained Yahoo crumb");
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    /// Forget the cached crumb so the next request re-authenticates.
    pub async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }

    /// GET `url` with the crumb appended and decode the JSON body.
    ///
    /// A 401 clears the crumb and retries once with a fresh one.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, url: &str) -> Result<T> {
        let body = match self.get_with_crumb(endpoint, url).await {
            Err(DataError::Http { status: 401, .. }) => {
                self.invalidate().await;
                self.get_with_crumb(endpoint, url).await?
            }
            other => other?,
        };
        Ok(serde_json::from_str(&body)?)
    }

    /// GET `url` without a crumb and decode the JSON body.
    pub async fn get_public_json<T: DeserializeOwned>(&self, endpoint: &str, url: &str) -> Result<T> {
        let body = self.send(endpoint, url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_with_crumb(&self, endpoint: &str, url: &str) -> Result<String> {
        let crumb = self.crumb().await?;
        let separator = if url.contains('?') { '&' } else { '?' };
        let url = format!("{url}{separator}crumb={}", urlencoding::encode(&crumb));
        self.send(endpoint, &url).await
    }

    async fn send(&self, endpoint: &str, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(DataError::RateLimit {
                retry_after_ms: 1_000,
            });
        }
        if !status.is_success() {
            return Err(DataError::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}
